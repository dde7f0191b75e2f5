//! Backup run orchestration for rclone-backup
//!
//! This crate coordinates the per-item backup pipeline on top of the
//! lower layers:
//!
//! - **Config**: the backup item document, loaded from JSON and validated
//! - **RunContext**: immutable per-run state shared by every item pipeline
//! - **BackupEngine**: capture-before, sync, summarize, capture-after per
//!   item, with the warn-vs-abort policy each step requires
//!
//! # Architecture
//!
//! `backup-core` sits above the leaf crates and below the CLI:
//!
//! ```text
//!        CLI
//!         |
//!    backup-core
//!         |
//!    +----+------+
//!    |           |
//! backup-fs backup-rclone
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;

pub use config::{BackupConfig, BackupItem};
pub use context::RunContext;
pub use error::{Error, Result};
pub use pipeline::{BackupEngine, ItemFailure, ItemReport, RunReport};
