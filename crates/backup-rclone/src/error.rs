//! Error types for backup-rclone

use std::path::PathBuf;

/// Result type for backup-rclone operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in backup-rclone operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The subprocess could not be started at all
    #[error("Failed to start command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The subprocess exited with a status classified as a genuine failure
    #[error("Command `{command}` failed with exit code {code:?}: {output}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        output: String,
    },

    /// The output sink handle could not be duplicated for stdout+stderr
    #[error("Failed to redirect command output to {path}: {source}")]
    Redirect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The combined report file could not be opened for summarizing
    #[error("Failed to open report file {path}: {source}")]
    ReportOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
