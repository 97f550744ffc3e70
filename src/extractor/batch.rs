use crate::extractor::ArchiveExtractor;
use crate::scanner::ArchiveFile;
use crate::ui::output::ProgressAwareOutput;
use crate::ui::progress::finish_progress_with_summary;
use crate::ui::{OutputFormatter, ProgressManager};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExtractionOutcome {
    Success,
    Failure { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveOutcome {
    pub archive: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: ExtractionOutcome,
}

impl ArchiveOutcome {
    pub fn success(archive: &ArchiveFile) -> Self {
        Self {
            archive: archive.name.clone(),
            path: archive.path.clone(),
            outcome: ExtractionOutcome::Success,
        }
    }

    pub fn failure(archive: &ArchiveFile, reason: impl Into<String>) -> Self {
        Self {
            archive: archive.name.clone(),
            path: archive.path.clone(),
            outcome: ExtractionOutcome::Failure {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == ExtractionOutcome::Success
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<ArchiveOutcome>,
    pub duration_ms: u64,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn empty() -> Self {
        Self {
            outcomes: Vec::new(),
            duration_ms: 0,
            finished_at: Utc::now(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Drives one extractor over the selection in order. A failing archive is
/// reported and skipped; it never stops the batch.
pub struct BatchRunner<'a> {
    formatter: &'a OutputFormatter,
    progress: &'a ProgressManager,
}

impl<'a> BatchRunner<'a> {
    pub fn new(formatter: &'a OutputFormatter, progress: &'a ProgressManager) -> Self {
        Self {
            formatter,
            progress,
        }
    }

    pub fn run(&self, extractor: &dyn ArchiveExtractor, selection: &[ArchiveFile]) -> BatchReport {
        if selection.is_empty() {
            tracing::debug!("nothing selected, skipping extraction");
            return BatchReport::empty();
        }

        let start = Instant::now();
        let output = ProgressAwareOutput::new(self.formatter, Some(self.progress));
        let pb = self.progress.create_archive_progress(selection.len() as u64);
        let mut outcomes = Vec::with_capacity(selection.len());

        for archive in selection {
            pb.set_message(archive.name.clone());
            tracing::info!(archive = %archive.name, kind = %archive.kind, "extracting");

            match extractor.extract(archive) {
                Ok(()) => {
                    output.debug(&format!("Extracted {}", archive.name));
                    outcomes.push(ArchiveOutcome::success(archive));
                }
                Err(e) => {
                    tracing::debug!(archive = %archive.name, error = %e, "extraction failed");
                    output.error(&format!("Failed to extract {}: {}", archive.name, e));
                    outcomes.push(ArchiveOutcome::failure(archive, e.to_string()));
                }
            }

            pb.inc(1);
        }

        let duration = start.elapsed();
        finish_progress_with_summary(&pb, "Done", duration);
        self.progress.clear();

        let report = BatchReport {
            outcomes,
            duration_ms: duration.as_millis() as u64,
            finished_at: Utc::now(),
        };

        self.formatter.success("Extraction finished");
        self.formatter.print_batch_summary(&report);

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, UnarchiveError};
    use crate::ui::OutputMode;
    use std::cell::RefCell;

    struct RecordingExtractor {
        fail_on: &'static str,
        seen: RefCell<Vec<String>>,
    }

    impl ArchiveExtractor for RecordingExtractor {
        fn extract(&self, archive: &ArchiveFile) -> Result<()> {
            self.seen.borrow_mut().push(archive.name.clone());
            if archive.name == self.fail_on {
                return Err(UnarchiveError::Open {
                    path: archive.name.clone(),
                    message: "corrupt".to_string(),
                });
            }
            Ok(())
        }
    }

    fn archives(names: &[&str]) -> Vec<ArchiveFile> {
        names
            .iter()
            .filter_map(|n| ArchiveFile::from_path(PathBuf::from(n), 0))
            .collect()
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 0, true);
        let progress = ProgressManager::new(false);
        let extractor = RecordingExtractor {
            fail_on: "b.zip",
            seen: RefCell::new(Vec::new()),
        };

        let selection = archives(&["a.zip", "b.zip", "c.tar"]);
        let report = BatchRunner::new(&formatter, &progress).run(&extractor, &selection);

        assert_eq!(*extractor.seen.borrow(), vec!["a.zip", "b.zip", "c.tar"]);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.has_failures());
        assert_eq!(
            report.outcomes[1].outcome,
            ExtractionOutcome::Failure {
                reason: "Failed to open archive b.zip: corrupt".to_string()
            }
        );
    }

    #[test]
    fn test_empty_selection() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 0, true);
        let progress = ProgressManager::new(false);
        let extractor = RecordingExtractor {
            fail_on: "",
            seen: RefCell::new(Vec::new()),
        };

        let report = BatchRunner::new(&formatter, &progress).run(&extractor, &[]);

        assert!(report.is_empty());
        assert!(!report.has_failures());
        assert!(extractor.seen.borrow().is_empty());
    }

    #[test]
    fn test_report_serializes_status() {
        let selection = archives(&["ok.zip", "bad.7z"]);
        let report = BatchReport {
            outcomes: vec![
                ArchiveOutcome::success(&selection[0]),
                ArchiveOutcome::failure(&selection[1], "boom"),
            ],
            duration_ms: 12,
            finished_at: Utc::now(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["status"], "success");
        assert_eq!(json["outcomes"][1]["status"], "failure");
        assert_eq!(json["outcomes"][1]["reason"], "boom");
        assert_eq!(json["outcomes"][1]["archive"], "bad.7z");
    }
}
