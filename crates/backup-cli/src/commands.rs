//! The backup run command.

use std::path::PathBuf;

use colored::Colorize;
use tracing::info;

use backup_core::{BackupConfig, BackupEngine, RunContext};

use crate::cli::{Cli, default_rclone_binary};
use crate::error::{CliError, Result};

/// Flag values with defaults resolved against the working directory,
/// mirroring the layout `rclone-backup` is conventionally run from.
#[derive(Debug)]
struct ResolvedArgs {
    log_bundle_base_dir: PathBuf,
    rclone_binary: PathBuf,
    rclone_config: PathBuf,
    config: PathBuf,
}

impl ResolvedArgs {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self {
            log_bundle_base_dir: cli
                .log_bundle_base_dir
                .clone()
                .unwrap_or_else(|| cwd.clone()),
            rclone_binary: cli
                .rclone_binary
                .clone()
                .unwrap_or_else(|| cwd.join(default_rclone_binary())),
            rclone_config: cli
                .rclone_config
                .clone()
                .unwrap_or_else(|| cwd.join("configs").join("rclone.conf")),
            config: cli
                .config
                .clone()
                .unwrap_or_else(|| cwd.join("configs").join("config.json")),
        })
    }
}

/// Run a full backup pass over every configured item.
pub fn run_backup(cli: &Cli) -> Result<()> {
    let args = ResolvedArgs::from_cli(cli)?;
    info!(?args, "resolved arguments");

    if cli.checksum {
        info!("checksums will be verified");
    }
    if cli.dry_run {
        info!("dry-run mode is set");
    }

    let ctx = RunContext::new(
        &args.rclone_binary,
        &args.rclone_config,
        cli.dry_run,
        cli.checksum,
    );
    ctx.validate()?;

    let config = BackupConfig::load(&args.config)?;

    let engine = BackupEngine::new(&args.log_bundle_base_dir, ctx)?;
    engine.check_tool()?;

    println!(
        "{} Backing up {} item(s), logs in {}",
        "=>".blue().bold(),
        config.items.len(),
        engine.bundle().dir().display()
    );

    let report = engine.run_all(&config.items, cli.keep_going)?;

    for item in &report.items {
        if item.differences.is_empty() {
            println!(
                "{} {}: no differences",
                "OK".green().bold(),
                item.item.cyan()
            );
        } else {
            println!(
                "{} {}: {} difference(s)",
                "OK".green().bold(),
                item.item.cyan(),
                item.differences.len()
            );
            for line in &item.differences {
                println!("   {} {}", "*".yellow(), line);
            }
        }
        for warning in &item.warnings {
            println!("   {} {}", "!".yellow(), warning);
        }
    }

    if !report.is_success() {
        for failure in &report.failed {
            println!(
                "{} {}: {}",
                "FAILED".red().bold(),
                failure.item.cyan(),
                failure.error
            );
        }
        return Err(CliError::user(format!(
            "{} of {} backup item(s) failed",
            report.failed.len(),
            config.items.len()
        )));
    }

    Ok(())
}
