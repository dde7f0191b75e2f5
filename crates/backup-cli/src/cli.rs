//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;

/// rclone-backup - Drive rclone through per-item backup runs with an
/// auditable log bundle
///
/// Each configured backup item is processed in order: listings of the
/// source and destination are captured before the sync, the sync runs,
/// the combined report is summarized, and the destination is listed
/// again. All logs for a run land in one timestamped bundle directory.
#[derive(Parser, Debug)]
#[command(name = "rclone-backup")]
#[command(author, version, about)]
pub struct Cli {
    /// Base directory for the log bundle generated during the run
    /// [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub log_bundle_base_dir: Option<PathBuf>,

    /// Location of the rclone binary [default: ./rclone]
    #[arg(long, value_name = "PATH")]
    pub rclone_binary: Option<PathBuf>,

    /// Location of the rclone config file [default: ./configs/rclone.conf]
    ///
    /// When backing up to a remote you are expected to have set it up
    /// already using `rclone config`; the remote's name is what goes in
    /// the backup config's destDir (e.g. "google-drive:").
    #[arg(long, value_name = "PATH")]
    pub rclone_config: Option<PathBuf>,

    /// Location of the backup config file [default: ./configs/config.json]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Perform a dry-run of the sync operations
    #[arg(long)]
    pub dry_run: bool,

    /// Verify checksums of source and destination files
    #[arg(long)]
    pub checksum: bool,

    /// Continue with the remaining items when an item fails
    #[arg(long)]
    pub keep_going: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Platform-specific default name of the rclone binary.
pub fn default_rclone_binary() -> &'static str {
    if cfg!(windows) { "rclone.exe" } else { "rclone" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["rclone-backup"]).unwrap();
        assert!(cli.log_bundle_base_dir.is_none());
        assert!(cli.rclone_binary.is_none());
        assert!(!cli.dry_run);
        assert!(!cli.checksum);
        assert!(!cli.keep_going);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "rclone-backup",
            "--log-bundle-base-dir",
            "/var/log/backups",
            "--rclone-binary",
            "/usr/bin/rclone",
            "--rclone-config",
            "/etc/rclone.conf",
            "--config",
            "/etc/backup.json",
            "--dry-run",
            "--checksum",
            "--keep-going",
            "--verbose",
        ])
        .unwrap();

        assert_eq!(
            cli.log_bundle_base_dir,
            Some(PathBuf::from("/var/log/backups"))
        );
        assert_eq!(cli.rclone_binary, Some(PathBuf::from("/usr/bin/rclone")));
        assert_eq!(cli.rclone_config, Some(PathBuf::from("/etc/rclone.conf")));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/backup.json")));
        assert!(cli.dry_run);
        assert!(cli.checksum);
        assert!(cli.keep_going);
        assert!(cli.verbose);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["rclone-backup", "--bogus"]).is_err());
    }
}
