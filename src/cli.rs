use crate::config::{CliOverrides, Config, Strategy};
use crate::error::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "unarchive")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(disable_version_flag = true)]
#[command(about = "Extract the archives found in the current directory")]
#[command(
    long_about = "Unarchive scans the current directory for .7z, .zip, .rar, .tar, .gz, .bz2 \
                  and .xz files, asks which ones to extract, and unpacks them with a progress bar."
)]
#[command(after_help = "EXAMPLES:\n  \
    unarchive\n  \
    unarchive --all\n  \
    unarchive --all --strategy bulk\n  \
    unarchive --dry-run --config my-config.toml")]
pub struct Cli {
    /// Print version information and exit
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,

    /// Extract every archive without asking
    #[arg(short, long)]
    pub all: bool,

    /// Extraction strategy
    #[arg(short, long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Reuse existing output directories (bulk strategy)
    #[arg(long)]
    pub overwrite: bool,

    /// Exit with status 2 when any archive fails
    #[arg(long)]
    pub strict: bool,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (--verbose, --verbose --verbose)
    #[arg(long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are printed)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Show what would be extracted without doing it
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self, dir: &Path) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref(), dir)?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_strategy(self.strategy)
            .with_extract_all(self.all)
            .with_overwrite(self.overwrite)
            .with_strict(self.strict)
            .with_no_progress(self.no_progress || self.quiet)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
