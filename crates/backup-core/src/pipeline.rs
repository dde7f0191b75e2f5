//! The per-item backup pipeline and the run loop over all items.
//!
//! Per item the sequence is: create the five-artifact bundle, capture the
//! source listing, capture the destination listing, sync, summarize the
//! combined report, capture the destination listing again. The two
//! pre-sync captures only warn on failure; everything after the sync
//! starts is fatal to the item.

use std::fs::OpenOptions;
use std::path::Path;

use tracing::{info, warn};

use backup_fs::LogBundle;
use backup_rclone::{RcloneCli, ReportSummary, RunStatus};

use crate::config::BackupItem;
use crate::context::RunContext;
use crate::error::{Error, Result};

/// Outcome of one completed backup item.
#[derive(Debug, Clone)]
pub struct ItemReport {
    /// The item's configured name
    pub item: String,
    /// Steps that completed
    pub actions: Vec<String>,
    /// Recoverable problems that did not stop the pipeline
    pub warnings: Vec<String>,
    /// Non-equal lines surfaced from the combined report, in report order
    pub differences: Vec<String>,
}

impl ItemReport {
    fn new(item: &str) -> Self {
        Self {
            item: item.to_string(),
            actions: Vec::new(),
            warnings: Vec::new(),
            differences: Vec::new(),
        }
    }
}

/// A failed item recorded in keep-going mode.
#[derive(Debug, Clone)]
pub struct ItemFailure {
    /// The item's configured name
    pub item: String,
    /// Rendered cause chain
    pub error: String,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Items that completed their pipeline
    pub items: Vec<ItemReport>,
    /// Items that failed (only populated in keep-going mode)
    pub failed: Vec<ItemFailure>,
}

impl RunReport {
    /// True when every item completed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Engine for one backup run.
///
/// Owns the run context, the rclone handle, and the run's log bundle.
/// Items are processed strictly sequentially, in configuration order.
pub struct BackupEngine {
    ctx: RunContext,
    rclone: RcloneCli,
    bundle: LogBundle,
}

impl BackupEngine {
    /// Create the engine and the run's bundle directory.
    ///
    /// A bundle directory that cannot be created means no auditable trail
    /// is possible, so this is fatal to the whole run.
    pub fn new(base_dir: &Path, ctx: RunContext) -> Result<Self> {
        let bundle = LogBundle::create(base_dir, &ctx.timestamp)?;
        let rclone = ctx.rclone();
        Ok(Self {
            ctx,
            rclone,
            bundle,
        })
    }

    /// The run's log bundle.
    pub fn bundle(&self) -> &LogBundle {
        &self.bundle
    }

    /// The run's context.
    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Run `rclone version` as a startup health check.
    pub fn check_tool(&self) -> Result<()> {
        info!("checking rclone version");
        self.rclone.version()?;
        Ok(())
    }

    /// Process all items in configuration order.
    ///
    /// By default the run halts at the first failed item and the wrapped
    /// error propagates. With `keep_going` the remaining items still run
    /// and failures are recorded in the returned report instead.
    pub fn run_all(&self, items: &[BackupItem], keep_going: bool) -> Result<RunReport> {
        let mut run_report = RunReport::default();

        for item in items {
            info!(
                item = %item.name,
                source = %item.source_dir,
                dest = %item.dest_dir,
                "processing backup item"
            );

            match self.run_item(item) {
                Ok(report) => {
                    info!(item = %item.name, "finished processing backup item");
                    run_report.items.push(report);
                }
                Err(cause) => {
                    let error = Error::Item {
                        name: item.name.clone(),
                        source: Box::new(cause),
                    };
                    if !keep_going {
                        return Err(error);
                    }
                    warn!(item = %item.name, error = %error, "backup item failed, continuing");
                    run_report.failed.push(ItemFailure {
                        item: item.name.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }

        Ok(run_report)
    }

    /// Run the pipeline for one item.
    pub fn run_item(&self, item: &BackupItem) -> Result<ItemReport> {
        let mut report = ItemReport::new(&item.name);

        let artifacts = self.bundle.create_item_artifacts(&item.name)?;

        // Pre-sync captures: the directory may legitimately not exist yet
        // (first-ever backup of a new destination), and a listing that
        // fails for any other reason is still only a record-keeping gap.
        info!(path = %item.source_dir, "getting listing for source directory");
        self.capture_with_warning(&item.source_dir, &artifacts.source_files, &mut report);

        info!(path = %item.dest_dir, "getting listing for destination directory before sync");
        self.capture_with_warning(&item.dest_dir, &artifacts.dest_files_before_sync, &mut report);

        info!(
            source = %item.source_dir,
            dest = %item.dest_dir,
            sync_logs = %artifacts.sync_logs.display(),
            sync_report = %artifacts.sync_report.display(),
            "syncing source and destination"
        );
        self.rclone.sync(
            &item.source_dir,
            &item.dest_dir,
            &self.ctx.extra_sync_args(),
            &artifacts.sync_logs,
            &artifacts.sync_report,
        )?;
        report
            .actions
            .push(format!("synced {} to {}", item.source_dir, item.dest_dir));

        info!(path = %artifacts.sync_report.display(), "summarizing sync report");
        for line in ReportSummary::open(&artifacts.sync_report)? {
            let line = line.map_err(|source| Error::ReportRead {
                path: artifacts.sync_report.clone(),
                source,
            })?;
            info!(line = %line, "non-equal file from report");
            report.differences.push(line);
        }

        // The one capture whose failure always aborts: a destination that
        // cannot be listed after a successful sync is itself suspicious.
        info!(path = %item.dest_dir, "getting listing for destination directory after sync");
        match self.capture_listing(&item.dest_dir, &artifacts.dest_files_after_sync)? {
            RunStatus::Success => {
                report
                    .actions
                    .push(format!("captured post-sync listing of {}", item.dest_dir));
            }
            RunStatus::TargetMissing { .. } => {
                return Err(Error::DestMissingAfterSync {
                    dir: item.dest_dir.clone(),
                });
            }
        }

        Ok(report)
    }

    /// Capture a listing, downgrading every failure to a warning.
    fn capture_with_warning(&self, dir: &str, artifact: &Path, report: &mut ItemReport) {
        match self.capture_listing(dir, artifact) {
            Ok(RunStatus::Success) => {
                report.actions.push(format!("captured listing of {}", dir));
            }
            Ok(RunStatus::TargetMissing { code }) => {
                warn!(path = %dir, code, "directory does not exist, skipped listing");
                report
                    .warnings
                    .push(format!("directory does not exist, skipped listing: {}", dir));
            }
            Err(error) => {
                warn!(path = %dir, error = %error, "failed to capture listing, continuing");
                report
                    .warnings
                    .push(format!("failed to capture listing of {}: {}", dir, error));
            }
        }
    }

    /// Stream a recursive listing of `dir` into an artifact file.
    ///
    /// The artifact handle lives only for this step; it is released when
    /// the step returns, on success and failure paths alike.
    fn capture_listing(&self, dir: &str, artifact: &Path) -> Result<RunStatus> {
        let sink = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(artifact)
            .map_err(|source| Error::ArtifactOpen {
                path: artifact.to_path_buf(),
                source,
            })?;

        Ok(self.rclone.list_recursive(dir, sink, artifact)?)
    }
}
