use serde::Serialize;
use std::path::Path;

/// Archive formats recognized by suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    SevenZip,
    Zip,
    Rar,
    Tar,
    Gzip,
    Bzip2,
    Xz,
}

const EXTRACTABLE_EXTENSIONS: &[(&str, ArchiveKind)] = &[
    ("7z", ArchiveKind::SevenZip),
    ("zip", ArchiveKind::Zip),
    ("rar", ArchiveKind::Rar),
    ("tar", ArchiveKind::Tar),
    ("gz", ArchiveKind::Gzip),
    ("bz2", ArchiveKind::Bzip2),
    ("xz", ArchiveKind::Xz),
];

impl ArchiveKind {
    /// Classifies a file name by the suffix after its last dot, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, suffix) = name.rsplit_once('.')?;
        let suffix = suffix.to_lowercase();

        EXTRACTABLE_EXTENSIONS
            .iter()
            .find(|(ext, _)| *ext == suffix)
            .map(|(_, kind)| *kind)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(Self::from_name)
    }

    pub fn extension(&self) -> &'static str {
        EXTRACTABLE_EXTENSIONS
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(ext, _)| *ext)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ".{}", self.extension())
    }
}

pub fn is_extractable(name: &str) -> bool {
    let file_name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name);

    ArchiveKind::from_name(file_name).is_some()
}
