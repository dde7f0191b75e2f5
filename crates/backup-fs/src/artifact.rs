//! The fixed set of per-item log artifacts.

use std::fmt;

/// The five artifact slots recorded for every backup item.
///
/// Downstream consumers expect this exact five-file shape per item, so a
/// bundle with a missing slot is never acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Recursive listing of the source directory
    SourceFiles,
    /// Recursive listing of the destination directory before the sync
    DestFilesBeforeSync,
    /// Recursive listing of the destination directory after the sync
    DestFilesAfterSync,
    /// rclone's structured JSON sync log
    SyncLogs,
    /// rclone's human-readable combined report
    SyncReport,
}

impl ArtifactKind {
    /// All artifact kinds, in bundle-creation order.
    pub const ALL: [ArtifactKind; 5] = [
        Self::SourceFiles,
        Self::DestFilesBeforeSync,
        Self::DestFilesAfterSync,
        Self::SyncLogs,
        Self::SyncReport,
    ];

    /// File name suffix, including the extension.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::SourceFiles => "source-files.json",
            Self::DestFilesBeforeSync => "dest-files-before-sync.json",
            Self::DestFilesAfterSync => "dest-files-after-sync.json",
            Self::SyncLogs => "sync-logs.json",
            Self::SyncReport => "sync-report.txt",
        }
    }

    /// Full file name for an item within a run.
    ///
    /// Deterministic for a given `(timestamp, item, kind)`, so paths never
    /// collide across items or runs as long as item names are unique.
    pub fn file_name(&self, timestamp: &str, item: &str) -> String {
        format!("{}-{}-{}", timestamp, item, self.suffix())
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}
