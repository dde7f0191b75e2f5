//! Error types for backup-core

use std::path::PathBuf;

/// Result type for backup-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in backup-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Backup config file could not be read
    #[error("Failed to read backup config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backup config file is not valid JSON of the expected shape
    #[error("Failed to parse backup config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Backup config content violates a validation rule
    #[error("Invalid backup config: {message}")]
    ConfigInvalid { message: String },

    /// A required external file (rclone binary, rclone config) is absent
    #[error("Required file does not exist: {path}")]
    MissingFile { path: PathBuf },

    /// An artifact file created at bundle time could not be reopened
    #[error("Failed to open artifact {path} for writing: {source}")]
    ArtifactOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sync report could not be read through to the end
    #[error("Failed to read sync report {path}: {source}")]
    ReportRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination vanished between a successful sync and its
    /// post-sync listing
    #[error("Destination directory missing after sync: {dir}")]
    DestMissingAfterSync { dir: String },

    /// A backup item's pipeline failed; wraps the underlying cause
    #[error("Backup item '{name}' failed: {source}")]
    Item {
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// Filesystem error from backup-fs
    #[error(transparent)]
    Fs(#[from] backup_fs::Error),

    /// rclone invocation error from backup-rclone
    #[error(transparent)]
    Rclone(#[from] backup_rclone::Error),
}
