//! Error types for scanning and snapshot persistence.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that end a snapshot pass.
///
/// Per-file problems never show up here; they are collected as
/// [`ScanWarning`]s and the pass keeps going.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for the root path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Root path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The pass was cancelled before it finished.
    #[error("Operation cancelled")]
    Cancelled,

    /// An include or exclude pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether this error is the cancellation outcome rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Kind of per-file fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// File vanished between discovery and reading.
    NotFound,
    /// Error reading file contents or a directory listing.
    ReadError,
    /// Error reading metadata.
    MetadataError,
}

/// Non-fatal fault for a single path; the path is left out of the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Classify an I/O error raised while reading a file's contents.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::classify(path.into(), error, WarningKind::ReadError)
    }

    /// Classify an I/O error raised while reading a file's metadata.
    pub fn metadata_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::classify(path.into(), error, WarningKind::MetadataError)
    }

    fn classify(path: PathBuf, error: &std::io::Error, fallback: WarningKind) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self {
                message: format!("Access denied: {}", path.display()),
                path,
                kind: WarningKind::PermissionDenied,
            },
            std::io::ErrorKind::NotFound => Self {
                message: format!("Vanished during scan: {}", path.display()),
                path,
                kind: WarningKind::NotFound,
            },
            _ => Self {
                message: format!("Failed to process {}: {error}", path.display()),
                path,
                kind: fallback,
            },
        }
    }
}

/// Errors reading a persisted snapshot.
#[derive(Debug, Error)]
pub enum SnapshotLoadError {
    /// The snapshot file could not be read.
    #[error("Cannot read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file is not a valid snapshot document.
    #[error("Invalid snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
