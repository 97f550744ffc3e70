use crate::error::{Result, UnarchiveError};
use crate::extractor::entries::{open_archive, EntryHeader, EntryKind};
use crate::scanner::ArchiveFile;
use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};

/// Writes entries one at a time at their stored paths under `root`.
pub struct StreamingExtractor {
    root: PathBuf,
    preserve_permissions: bool,
    buffer_size: usize,
}

impl StreamingExtractor {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            preserve_permissions: true,
            buffer_size: 64 * 1024, // 64KB buffer
        }
    }

    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extracts every entry of `archive`. The first failing entry aborts the
    /// archive; entries already written are left in place.
    pub fn extract(&self, archive: &ArchiveFile) -> Result<usize> {
        let opened = open_archive(archive)?;
        let mut written = 0usize;

        opened.for_each_entry(&archive.path, &mut |header: &EntryHeader, data: &mut dyn Read| {
            self.write_entry(header, data)?;
            written += 1;
            Ok(())
        })?;

        tracing::debug!(
            archive = %archive.name,
            entries = written,
            "streaming extraction finished"
        );
        Ok(written)
    }

    fn write_entry(&self, header: &EntryHeader, data: &mut dyn Read) -> Result<()> {
        let relative = sanitize_entry_path(&header.path)?;
        if relative.as_os_str().is_empty() {
            return Ok(());
        }

        let dest = self.root.join(&relative);
        let mode = self.effective_mode(header.mode);
        tracing::trace!(entry = %relative.display(), ?mode, "writing entry");

        match header.kind {
            EntryKind::Directory => create_dir_with_mode(&dest, mode),
            EntryKind::File => {
                if let Some(parent) = dest.parent() {
                    if !parent.is_dir() {
                        fs::create_dir_all(parent).map_err(|e| UnarchiveError::DirCreate {
                            path: parent.display().to_string(),
                            source: e,
                        })?;
                    }
                }
                self.write_file(&dest, mode, data)
            }
        }
    }

    fn write_file(&self, dest: &Path, mode: Option<u32>, data: &mut dyn Read) -> Result<()> {
        let to_write_error = |e: io::Error| UnarchiveError::FileWrite {
            path: dest.display().to_string(),
            source: e,
        };

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            if let Some(mode) = mode {
                options.mode(mode);
            }
        }
        #[cfg(not(unix))]
        let _ = mode;

        let file = options.open(dest).map_err(to_write_error)?;
        let mut writer = BufWriter::with_capacity(self.buffer_size, file);

        io::copy(data, &mut writer).map_err(to_write_error)?;
        writer.flush().map_err(to_write_error)?;

        Ok(())
    }

    fn effective_mode(&self, stored: Option<u32>) -> Option<u32> {
        if !self.preserve_permissions {
            return None;
        }

        stored.map(|m| m & 0o7777).filter(|m| *m != 0)
    }
}

fn create_dir_with_mode(dest: &Path, mode: Option<u32>) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        if let Some(mode) = mode {
            builder.mode(mode);
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(dest).map_err(|e| UnarchiveError::DirCreate {
        path: dest.display().to_string(),
        source: e,
    })
}

/// Turns a stored entry path into a relative path that stays under the
/// extraction root. `.` components are dropped; absolute paths and `..`
/// are rejected.
pub fn sanitize_entry_path(stored: &Path) -> Result<PathBuf> {
    let mut clean = PathBuf::new();

    for component in stored.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(UnarchiveError::UnsafeEntryPath {
                    entry: stored.display().to_string(),
                });
            }
        }
    }

    Ok(clean)
}
