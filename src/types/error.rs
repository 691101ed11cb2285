//! Error types for dirbackup

use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Stage of a single-file copy at which a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStage {
    CreateParent,
    OpenSource,
    CreateTarget,
    CopyBytes,
    ReadMetadata,
    SetModTime,
}

impl fmt::Display for CopyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CopyStage::CreateParent => "creating destination directory",
            CopyStage::OpenSource => "opening source file",
            CopyStage::CreateTarget => "creating destination file",
            CopyStage::CopyBytes => "copying file",
            CopyStage::ReadMetadata => "getting source file info",
            CopyStage::SetModTime => "setting modification time",
        };
        f.write_str(label)
    }
}

/// Error types for dirbackup operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The source root itself cannot be enumerated
    #[error("Cannot read source directory {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The target root cannot be enumerated during pruning
    #[error("Cannot read target directory {path}: {source}")]
    TargetUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Stat failed for a reason other than the path being absent
    #[error("Error getting file info for {path}: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },

    /// One step of a file copy failed
    #[error("Error {stage} for {path}: {source}")]
    Copy {
        stage: CopyStage,
        path: PathBuf,
        source: std::io::Error,
    },

    /// Source resolved to something other than a regular file
    #[error("Error copying {path}: not a regular file")]
    NotAFile { path: PathBuf },

    /// A single path could not be visited during a walk
    #[error("Error accessing path {path}: {message}")]
    Traversal { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Error creating directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Deleting an extraneous target entry failed
    #[error("Error deleting {path}: {source}")]
    Delete {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A pool task panicked or was cancelled
    #[error("Worker failed: {0}")]
    Worker(String),

    /// Scheduler loop failure
    #[error("Service error: {0}")]
    Service(String),
}

impl SyncError {
    /// Errors that abort a run instead of being logged and skipped
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            SyncError::SourceUnreadable { .. }
                | SyncError::TargetUnreadable { .. }
                | SyncError::Worker(_)
        )
    }

    /// Check if this error is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, SyncError::Config(_))
    }

    /// Check if this error is related to permissions
    pub fn is_permission_error(&self) -> bool {
        self.io_kind() == Some(ErrorKind::PermissionDenied)
    }

    fn io_kind(&self) -> Option<ErrorKind> {
        match self {
            SyncError::Io(source)
            | SyncError::SourceUnreadable { source, .. }
            | SyncError::TargetUnreadable { source, .. }
            | SyncError::Stat { source, .. }
            | SyncError::Copy { source, .. }
            | SyncError::CreateDir { source, .. }
            | SyncError::Delete { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
