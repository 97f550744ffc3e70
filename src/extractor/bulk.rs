use crate::error::{Result, UnarchiveError};
use crate::extractor::entries::open_archive;
use crate::scanner::ArchiveFile;
use std::fs;
use std::path::{Path, PathBuf};

/// Unpacks each archive whole into `<root>/<archive stem>/`.
pub struct BulkExtractor {
    root: PathBuf,
    overwrite_existing: bool,
}

impl BulkExtractor {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            overwrite_existing: false,
        }
    }

    pub fn with_overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output_dir_for(&self, archive: &ArchiveFile) -> PathBuf {
        self.root.join(archive.stem())
    }

    /// Opens the archive before touching the filesystem, so a corrupt
    /// archive leaves no empty output directory behind.
    pub fn extract(&self, archive: &ArchiveFile) -> Result<PathBuf> {
        let opened = open_archive(archive)?;

        let output_dir = self.output_dir_for(archive);
        self.create_output_dir(&output_dir)?;

        tracing::debug!(
            archive = %archive.name,
            output = %output_dir.display(),
            "bulk extraction"
        );
        opened.unpack_into(&archive.path, &output_dir)?;

        Ok(output_dir)
    }

    fn create_output_dir(&self, dir: &Path) -> Result<()> {
        let created = if self.overwrite_existing {
            fs::create_dir_all(dir)
        } else {
            fs::create_dir(dir)
        };

        created.map_err(|e| UnarchiveError::DirCreate {
            path: dir.display().to_string(),
            source: e,
        })
    }
}
