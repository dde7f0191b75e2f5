//! Per-run log bundle directory and per-item artifact creation.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::artifact::ArtifactKind;
use crate::error::{Error, Result};

/// Directory name suffix for the per-run bundle
const BUNDLE_DIR_SUFFIX: &str = "log-bundle";

/// Timestamp prefix for a run, at second resolution.
pub fn run_timestamp() -> String {
    Local::now().format("%Y%m%d-%H%M%S").to_string()
}

/// The per-run log bundle: a directory holding every item's artifacts.
#[derive(Debug, Clone)]
pub struct LogBundle {
    dir: PathBuf,
    timestamp: String,
}

impl LogBundle {
    /// Create the bundle directory `<timestamp>-log-bundle` under `base_dir`.
    ///
    /// Creation failure means no auditable trail is possible, so it is
    /// fatal to the whole run.
    pub fn create(base_dir: &Path, timestamp: &str) -> Result<Self> {
        let dir = base_dir.join(format!("{}-{}", timestamp, BUNDLE_DIR_SUFFIX));

        if !dir.exists() {
            info!(path = %dir.display(), "creating log bundle directory");
            fs::create_dir_all(&dir).map_err(|source| Error::CreateBundleDir {
                path: dir.clone(),
                source,
            })?;
        }

        Ok(Self {
            dir,
            timestamp: timestamp.to_string(),
        })
    }

    /// The bundle directory on disk.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The run's timestamp prefix.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The deterministic path of one artifact for an item.
    pub fn artifact_path(&self, item: &str, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name(&self.timestamp, item))
    }

    /// Create the five artifact files for an item, before any writer
    /// touches them.
    ///
    /// If any single file cannot be created the item cannot be bundled at
    /// all; a partial bundle with missing slots is not acceptable.
    pub fn create_item_artifacts(&self, item: &str) -> Result<ItemArtifacts> {
        let artifacts = ItemArtifacts {
            source_files: self.artifact_path(item, ArtifactKind::SourceFiles),
            dest_files_before_sync: self.artifact_path(item, ArtifactKind::DestFilesBeforeSync),
            dest_files_after_sync: self.artifact_path(item, ArtifactKind::DestFilesAfterSync),
            sync_logs: self.artifact_path(item, ArtifactKind::SyncLogs),
            sync_report: self.artifact_path(item, ArtifactKind::SyncReport),
        };

        for path in artifacts.all() {
            info!(path = %path.display(), "creating log file");
            // Handle dropped immediately; each pipeline step reopens the
            // file it writes and releases it when the step completes.
            File::create(path).map_err(|source| Error::CreateArtifact {
                path: path.to_path_buf(),
                source,
            })?;
        }

        Ok(artifacts)
    }
}

/// Resolved paths of one item's five artifact files.
#[derive(Debug, Clone)]
pub struct ItemArtifacts {
    /// Recursive listing of the source directory
    pub source_files: PathBuf,
    /// Recursive listing of the destination directory, pre-sync
    pub dest_files_before_sync: PathBuf,
    /// Recursive listing of the destination directory, post-sync
    pub dest_files_after_sync: PathBuf,
    /// rclone's structured JSON sync log
    pub sync_logs: PathBuf,
    /// rclone's combined report
    pub sync_report: PathBuf,
}

impl ItemArtifacts {
    /// All five artifact paths, in creation order.
    pub fn all(&self) -> [&Path; 5] {
        [
            &self.source_files,
            &self.dest_files_before_sync,
            &self.dest_files_after_sync,
            &self.sync_logs,
            &self.sync_report,
        ]
    }
}
