pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod scanner;
pub mod selection;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExtractionConfig, OutputConfig, SelectionConfig, Strategy};
pub use error::{Result, UnarchiveError, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    ArchiveExtractor, ArchiveOutcome, BatchReport, BatchRunner, BulkExtractor, ExtractionOutcome,
    Extractor, StreamingExtractor,
};
pub use scanner::{is_extractable, ArchiveFile, ArchiveKind, ArchiveScanner};
pub use selection::{select, Confirm};
pub use ui::{OutputFormatter, OutputMode, ProgressManager, TerminalPrompt};

use std::path::{Path, PathBuf};

/// Main library interface: scan, select and extract the archives of one
/// directory.
pub struct Unarchive {
    config: Config,
    root: PathBuf,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl Unarchive {
    /// Create a new Unarchive instance working in `root`
    pub fn new<P: Into<PathBuf>>(
        config: Config,
        root: P,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
    ) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(config.output.progress && !quiet);

        Self {
            config,
            root: root.into(),
            output_formatter,
            progress_manager,
        }
    }

    /// Create an Unarchive instance from CLI arguments
    pub fn from_cli(cli_args: &Cli, root: &Path) -> Result<Self> {
        let config = cli_args.load_config(root)?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(
            config,
            root,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Lists the extractable archives directly inside the root, sorted by name
    pub fn scan(&self) -> Result<Vec<ArchiveFile>> {
        self.output_formatter.start_operation("Scanning for archives");

        let scanner = ArchiveScanner::new(self.config.exclude_regexes()?);
        let archives = scanner.scan_directory(&self.root)?;

        tracing::info!(count = archives.len(), root = %self.root.display(), "scan finished");
        self.output_formatter
            .info(&format!("Found {} archive(s)", archives.len()));

        Ok(archives)
    }

    /// Applies bulk mode from the configuration or asks `confirm` per archive
    pub fn select(
        &self,
        candidates: Vec<ArchiveFile>,
        confirm: &mut dyn Confirm,
    ) -> Result<Vec<ArchiveFile>> {
        select(candidates, self.config.selection.extract_all, confirm)
    }

    pub fn extractor(&self) -> Extractor {
        Extractor::from_config(&self.config.extraction, &self.root)
    }

    /// Extracts the selection in order with progress and a final summary
    pub fn extract(&self, selection: &[ArchiveFile]) -> BatchReport {
        if selection.is_empty() {
            self.output_formatter.info("No archives selected");
            return BatchReport::empty();
        }

        let extractor = self.extractor();
        self.output_formatter.start_operation(&format!(
            "Extracting {} archive(s) ({} strategy)",
            selection.len(),
            extractor.strategy()
        ));

        BatchRunner::new(&self.output_formatter, &self.progress_manager).run(&extractor, selection)
    }

    /// Full workflow: scan, select, extract
    pub fn run(&self, confirm: &mut dyn Confirm) -> Result<BatchReport> {
        let candidates = self.scan()?;
        let selection = self.select(candidates, confirm)?;
        Ok(self.extract(&selection))
    }

    /// Process exit status for a finished batch
    pub fn exit_code(&self, report: &BatchReport) -> i32 {
        if report.has_failures() && self.config.extraction.fail_on_error {
            2
        } else {
            0
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::default().save_to_file(output_path)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &UnarchiveError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entry: &str, body: &[u8]) {
        let file = fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file(entry, SimpleFileOptions::default()).unwrap();
        zip.write_all(body).unwrap();
        zip.finish().unwrap();
    }

    fn quiet_instance(config: Config, root: &Path) -> Unarchive {
        Unarchive::new(config, root, OutputMode::Plain, 0, true)
    }

    #[test]
    fn test_unarchive_creation() {
        let temp_dir = TempDir::new().unwrap();
        let unarchive = quiet_instance(Config::default(), temp_dir.path());

        assert_eq!(unarchive.root(), temp_dir.path());
        assert_eq!(unarchive.config().extraction.strategy, Strategy::Streaming);
        assert!(!unarchive.progress_manager().is_enabled());
    }

    #[test]
    fn test_run_with_declined_prompts_extracts_nothing() {
        let temp_dir = TempDir::new().unwrap();
        write_zip(&temp_dir.path().join("a.zip"), "a.txt", b"a");

        let unarchive = quiet_instance(Config::default(), temp_dir.path());
        let mut asked = Vec::new();
        let mut decline = |archive: &ArchiveFile| -> Result<bool> {
            asked.push(archive.name.clone());
            Ok(false)
        };

        let report = unarchive.run(&mut decline).unwrap();

        assert!(report.is_empty());
        assert_eq!(asked, vec!["a.zip"]);
        assert!(!temp_dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_run_extract_all() {
        let temp_dir = TempDir::new().unwrap();
        write_zip(&temp_dir.path().join("a.zip"), "a.txt", b"first");
        write_zip(&temp_dir.path().join("b.zip"), "b.txt", b"second");
        fs::write(temp_dir.path().join("readme.md"), b"not an archive").unwrap();

        let mut config = Config::default();
        config.selection.extract_all = true;
        let unarchive = quiet_instance(config, temp_dir.path());

        let mut never = |_: &ArchiveFile| -> Result<bool> { panic!("prompted in bulk mode") };
        let report = unarchive.run(&mut never).unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(fs::read(temp_dir.path().join("a.txt")).unwrap(), b"first");
        assert_eq!(fs::read(temp_dir.path().join("b.txt")).unwrap(), b"second");
        assert_eq!(unarchive.exit_code(&report), 0);
    }

    #[test]
    fn test_exit_code_with_failures() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.zip"), b"not a zip").unwrap();
        write_zip(&temp_dir.path().join("good.zip"), "good.txt", b"ok");

        let mut config = Config::default();
        config.selection.extract_all = true;
        let lenient = quiet_instance(config.clone(), temp_dir.path());
        let mut never = |_: &ArchiveFile| -> Result<bool> { Ok(false) };
        let report = lenient.run(&mut never).unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(lenient.exit_code(&report), 0);

        config.extraction.fail_on_error = true;
        let strict = quiet_instance(config, temp_dir.path());
        assert_eq!(strict.exit_code(&report), 2);
    }

    #[test]
    fn test_prompt_failure_aborts_run() {
        let temp_dir = TempDir::new().unwrap();
        write_zip(&temp_dir.path().join("a.zip"), "a.txt", b"a");

        let unarchive = quiet_instance(Config::default(), temp_dir.path());
        let mut broken = |_: &ArchiveFile| -> Result<bool> {
            Err(UnarchiveError::Prompt {
                message: "stdin closed".to_string(),
            })
        };

        let result = unarchive.run(&mut broken);
        assert!(matches!(result, Err(UnarchiveError::Prompt { .. })));
        assert!(!temp_dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_bulk_strategy_from_config() {
        let temp_dir = TempDir::new().unwrap();
        write_zip(&temp_dir.path().join("foo.zip"), "inner.txt", b"bulk");

        let mut config = Config::default();
        config.selection.extract_all = true;
        config.extraction.strategy = Strategy::Bulk;
        let unarchive = quiet_instance(config, temp_dir.path());

        let mut never = |_: &ArchiveFile| -> Result<bool> { Ok(false) };
        unarchive.run(&mut never).unwrap();

        assert_eq!(
            fs::read(temp_dir.path().join("foo").join("inner.txt")).unwrap(),
            b"bulk"
        );
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        Unarchive::generate_sample_config(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[extraction]"));
        assert!(content.contains("[selection]"));
        assert!(content.contains("[output]"));
    }
}
