//! Error types for backup-fs

use std::path::PathBuf;

/// Result type for backup-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in backup-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to create log bundle directory {path}: {source}")]
    CreateBundleDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create log file {path}: {source}")]
    CreateArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
