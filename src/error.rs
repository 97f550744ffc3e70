use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnarchiveError {
    #[error("Failed to open archive {path}: {message}")]
    Open { path: String, message: String },

    #[error("Failed to create directory {path}: {source}")]
    DirCreate {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read entry {entry}: {message}")]
    StreamOpen { entry: String, message: String },

    #[error("Failed to extract {path}: {message}")]
    Extract { path: String, message: String },

    #[error("Entry escapes the extraction root: {entry}")]
    UnsafeEntryPath { entry: String },

    #[error("Confirmation prompt failed: {message}")]
    Prompt { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),
}

impl UnarchiveError {
    pub(crate) fn open<P: AsRef<Path>, E: Display>(path: P, error: E) -> Self {
        UnarchiveError::Open {
            path: path.as_ref().display().to_string(),
            message: error.to_string(),
        }
    }

    pub(crate) fn extract<P: AsRef<Path>, E: Display>(path: P, error: E) -> Self {
        UnarchiveError::Extract {
            path: path.as_ref().display().to_string(),
            message: error.to_string(),
        }
    }

    pub(crate) fn stream_open<D: Display, E: Display>(entry: D, error: E) -> Self {
        UnarchiveError::StreamOpen {
            entry: entry.to_string(),
            message: error.to_string(),
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for UnarchiveError {
    fn user_message(&self) -> String {
        match self {
            UnarchiveError::Open { path, message } => {
                format!("Could not open {}: {}", path, message)
            }
            UnarchiveError::DirCreate { path, source } => {
                format!("Could not create directory {}: {}", path, source)
            }
            UnarchiveError::UnsafeEntryPath { entry } => {
                format!("Refusing to write outside the extraction root: {}", entry)
            }
            UnarchiveError::Prompt { message } => {
                format!("Could not read your answer: {}", message)
            }
            UnarchiveError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            UnarchiveError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            UnarchiveError::Open { .. } => Some(
                "The archive may be corrupt, incomplete, or password protected.".to_string()
            ),
            UnarchiveError::DirCreate { source, .. }
                if source.kind() == std::io::ErrorKind::AlreadyExists => Some(
                "Remove the existing directory, or use --overwrite to extract into it.".to_string()
            ),
            UnarchiveError::Prompt { .. } => Some(
                "Run with --all to extract every archive without prompting.".to_string()
            ),
            UnarchiveError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with --generate-config.".to_string()
            ),
            UnarchiveError::InvalidPath { .. } => Some(
                "Ensure the directory exists and you have permission to read it.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for UnarchiveError {
    fn from(error: toml::de::Error) -> Self {
        UnarchiveError::Config {
            message: error.to_string(),
        }
    }
}

impl From<regex::Error> for UnarchiveError {
    fn from(error: regex::Error) -> Self {
        UnarchiveError::Config {
            message: format!("Invalid exclude pattern: {}", error),
        }
    }
}

pub type Result<T> = std::result::Result<T, UnarchiveError>;
