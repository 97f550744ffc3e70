pub mod archive_scanner;
pub mod extension_filter;

pub use archive_scanner::{ArchiveFile, ArchiveScanner};
pub use extension_filter::{is_extractable, ArchiveKind};
