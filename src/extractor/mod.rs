pub mod batch;
pub mod bulk;
pub mod entries;
pub mod streaming;

pub use batch::{ArchiveOutcome, BatchReport, BatchRunner, ExtractionOutcome};
pub use bulk::BulkExtractor;
pub use entries::{open_archive, EntryHeader, EntryKind, OpenedArchive};
pub use streaming::{sanitize_entry_path, StreamingExtractor};

use crate::config::{ExtractionConfig, Strategy};
use crate::error::Result;
use crate::scanner::ArchiveFile;
use std::path::Path;

/// Extracts one archive to disk.
pub trait ArchiveExtractor {
    fn extract(&self, archive: &ArchiveFile) -> Result<()>;
}

/// The configured extraction strategy; exactly one is active per run.
pub enum Extractor {
    Streaming(StreamingExtractor),
    Bulk(BulkExtractor),
}

impl Extractor {
    pub fn from_config(config: &ExtractionConfig, root: &Path) -> Self {
        match config.strategy {
            Strategy::Streaming => Extractor::Streaming(
                StreamingExtractor::new(root)
                    .with_preserve_permissions(config.preserve_permissions),
            ),
            Strategy::Bulk => Extractor::Bulk(
                BulkExtractor::new(root).with_overwrite_existing(config.overwrite_existing),
            ),
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Extractor::Streaming(_) => Strategy::Streaming,
            Extractor::Bulk(_) => Strategy::Bulk,
        }
    }
}

impl ArchiveExtractor for Extractor {
    fn extract(&self, archive: &ArchiveFile) -> Result<()> {
        match self {
            Extractor::Streaming(extractor) => extractor.extract(archive).map(|_| ()),
            Extractor::Bulk(extractor) => extractor.extract(archive).map(|_| ()),
        }
    }
}
