use crate::error::{Result, UnarchiveError};
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub selection: SelectionConfig,
    pub output: OutputConfig,
}

/// Which extractor variant runs for the whole batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Write entries one by one under the extraction root
    #[default]
    Streaming,
    /// Unpack each archive into a directory named after it
    Bulk,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Streaming => write!(f, "streaming"),
            Strategy::Bulk => write!(f, "bulk"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub strategy: Strategy,
    pub overwrite_existing: bool,
    pub preserve_permissions: bool,
    pub fail_on_error: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub extract_all: bool,
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub progress: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Streaming,
            overwrite_existing: false,
            preserve_permissions: true,
            fail_on_error: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { progress: true }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(UnarchiveError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| UnarchiveError::Config {
                message: format!("Failed to read config file {}: {}", path.display(), e),
            })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| UnarchiveError::Config {
                message: format!("Failed to parse config file {}: {}", path.display(), e),
            })?;

        Ok(config)
    }

    /// Loads `config_path` if given, else the first default file found in `dir`.
    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>, dir: &Path) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["unarchive.toml", ".unarchive.toml"];

                for default_path in &default_paths {
                    let candidate = dir.join(default_path);
                    if candidate.is_file() {
                        tracing::debug!(path = %candidate.display(), "loading default config");
                        return Self::load_from_file(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(strategy) = cli_args.strategy {
            self.extraction.strategy = strategy;
        }

        if cli_args.extract_all {
            self.selection.extract_all = true;
        }

        if cli_args.overwrite {
            self.extraction.overwrite_existing = true;
        }

        if cli_args.strict {
            self.extraction.fail_on_error = true;
        }

        if cli_args.no_progress {
            self.output.progress = false;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| UnarchiveError::Config {
                message: format!("Failed to serialize config: {}", e),
            })?;

        std::fs::write(path, content)
            .map_err(|e| UnarchiveError::Config {
                message: format!("Failed to write config file {}: {}", path.display(), e),
            })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for pattern in &self.selection.exclude_patterns {
            Regex::new(pattern)?;
        }

        Ok(())
    }

    pub fn exclude_regexes(&self) -> Result<Vec<Regex>> {
        self.selection
            .exclude_patterns
            .iter()
            .map(|p| Regex::new(p).map_err(UnarchiveError::from))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub strategy: Option<Strategy>,
    pub extract_all: bool,
    pub overwrite: bool,
    pub strict: bool,
    pub no_progress: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: Option<Strategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_extract_all(mut self, all: bool) -> Self {
        self.extract_all = all;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_no_progress(mut self, no_progress: bool) -> Self {
        self.no_progress = no_progress;
        self
    }
}
