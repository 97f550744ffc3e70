use crate::error::{Result, UnarchiveError};
use crate::scanner::extension_filter::ArchiveKind;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveFile {
    pub path: PathBuf,
    pub name: String,
    pub kind: ArchiveKind,
    pub size: u64,
}

impl ArchiveFile {
    /// Returns `None` when the path does not carry a recognized archive suffix.
    pub fn from_path<P: Into<PathBuf>>(path: P, size: u64) -> Option<Self> {
        let path = path.into();
        let kind = ArchiveKind::from_path(&path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Some(Self {
            path,
            name,
            kind,
            size,
        })
    }

    /// File name with the final suffix removed, e.g. `foo` for `foo.zip`.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// Lists the archives directly inside one directory.
pub struct ArchiveScanner {
    exclude_patterns: Vec<Regex>,
}

impl ArchiveScanner {
    pub fn new(exclude_patterns: Vec<Regex>) -> Self {
        Self { exclude_patterns }
    }

    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<ArchiveFile>> {
        let root_path = root.as_ref();

        if !root_path.is_dir() {
            return Err(UnarchiveError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let mut archives = Vec::new();

        let walker = WalkDir::new(root_path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                // The root itself could not be listed.
                Err(err) if err.depth() == 0 => {
                    return Err(UnarchiveError::Io(err.into()));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if ArchiveKind::from_name(&name).is_none() {
                continue;
            }

            if self.is_excluded(&name) {
                tracing::debug!(archive = %name, "excluded by pattern");
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if let Some(archive) = ArchiveFile::from_path(entry.path(), size) {
                archives.push(archive);
            }
        }

        Ok(archives)
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(name))
    }
}

impl Default for ArchiveScanner {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
