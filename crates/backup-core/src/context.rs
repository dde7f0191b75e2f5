//! Per-run immutable state.

use std::path::PathBuf;

use backup_rclone::RcloneCli;

use crate::error::{Error, Result};

/// State resolved once at process start and shared read-only by every
/// item pipeline in the run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Path to the rclone binary
    pub rclone_binary: PathBuf,
    /// Path to the rclone config file
    pub rclone_config: PathBuf,
    /// Second-resolution timestamp prefix for the run's artifacts
    pub timestamp: String,
    /// Pass `--dry-run` to every sync
    pub dry_run: bool,
    /// Pass `--checksum` to every sync
    pub checksum: bool,
}

impl RunContext {
    /// Create a context stamped with the current time.
    pub fn new(
        rclone_binary: impl Into<PathBuf>,
        rclone_config: impl Into<PathBuf>,
        dry_run: bool,
        checksum: bool,
    ) -> Self {
        Self {
            rclone_binary: rclone_binary.into(),
            rclone_config: rclone_config.into(),
            timestamp: backup_fs::run_timestamp(),
            dry_run,
            checksum,
        }
    }

    /// Check that the external files the run depends on exist.
    ///
    /// Missing paths are configuration errors; the run never begins.
    pub fn validate(&self) -> Result<()> {
        for path in [&self.rclone_binary, &self.rclone_config] {
            if !path.exists() {
                return Err(Error::MissingFile { path: path.clone() });
            }
        }
        Ok(())
    }

    /// The rclone handle for this run.
    pub fn rclone(&self) -> RcloneCli {
        RcloneCli::new(&self.rclone_binary, &self.rclone_config)
    }

    /// Caller-supplied sync arguments, in deterministic order: checksum
    /// before dry-run, so logged commands are diffable across runs.
    pub fn extra_sync_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.checksum {
            args.push("--checksum".to_string());
        }
        if self.dry_run {
            args.push("--dry-run".to_string());
        }
        args
    }
}
