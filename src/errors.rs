//! Goldsnap Error Handling
//!
//! Every failure the engine can produce is a [`SnapshotError`]. Only
//! [`SnapshotError::NotFound`] is ever handled inside the engine (it turns
//! into the record-on-first-run path); everything else travels back to the
//! caller unchanged in kind.

use miette::Diagnostic;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause attached to transform and serialize failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Type-safe classification of a [`SnapshotError`], for callers and tests
/// that only care about which class of failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transform,
    Serialize,
    NotFound,
    CorruptGoldenFile,
    StorageIo,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transform => "Transform",
            ErrorKind::Serialize => "Serialize",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::CorruptGoldenFile => "CorruptGoldenFile",
            ErrorKind::StorageIo => "StorageIo",
            ErrorKind::Configuration => "Configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

#[derive(Debug, Error, Diagnostic)]
pub enum SnapshotError {
    #[error("transform failed: {message}")]
    #[diagnostic(code(goldsnap::transform))]
    Transform {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("{format} serialization failed: {message}")]
    #[diagnostic(code(goldsnap::serialize))]
    Serialize {
        format: &'static str,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("snapshot {name:?} not found in {}", .path.display())]
    #[diagnostic(code(goldsnap::not_found))]
    NotFound { path: PathBuf, name: String },

    #[error("corrupt golden file {}: {reason}", .path.display())]
    #[diagnostic(
        code(goldsnap::corrupt_golden_file),
        help("golden files are never repaired automatically; fix the file by hand or delete it and re-record")
    )]
    CorruptGoldenFile { path: PathBuf, reason: String },

    #[error("storage I/O failed on {}: {source}", .path.display())]
    #[diagnostic(code(goldsnap::storage_io))]
    StorageIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid matcher configuration: {message}")]
    #[diagnostic(code(goldsnap::configuration))]
    Configuration {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl SnapshotError {
    pub fn transform(message: impl Into<String>) -> Self {
        SnapshotError::Transform {
            message: message.into(),
            source: None,
        }
    }

    pub fn transform_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        SnapshotError::Transform {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Wraps a format encoder failure, keeping the encoder error as the source.
    pub fn serialize<E>(format: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SnapshotError::Serialize {
            format,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn serialize_msg(format: &'static str, message: impl Into<String>) -> Self {
        SnapshotError::Serialize {
            format,
            message: message.into(),
            source: None,
        }
    }

    pub fn not_found(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        SnapshotError::NotFound {
            path: path.into(),
            name: name.into(),
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SnapshotError::CorruptGoldenFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SnapshotError::StorageIo {
            path: path.into(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>, help: Option<&str>) -> Self {
        SnapshotError::Configuration {
            message: message.into(),
            help: help.map(str::to_string),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SnapshotError::Transform { .. } => ErrorKind::Transform,
            SnapshotError::Serialize { .. } => ErrorKind::Serialize,
            SnapshotError::NotFound { .. } => ErrorKind::NotFound,
            SnapshotError::CorruptGoldenFile { .. } => ErrorKind::CorruptGoldenFile,
            SnapshotError::StorageIo { .. } => ErrorKind::StorageIo,
            SnapshotError::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// True for the one condition the matcher converts into a recording.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SnapshotError::NotFound { .. })
    }
}
