//! rclone command construction and synchronous execution.
//!
//! One concrete handle, [`RcloneCli`], implements the full capability set:
//! version health check, recursive listing, and sync. Every invocation is
//! blocking; the child's combined stdout+stderr is fully captured in memory
//! or fully streamed to the caller's sink before the call returns.

use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::info;

use crate::error::{Error, Result};

/// rclone exit codes meaning the requested path does not exist:
/// 3 = directory not found, 4 = file not found.
const TARGET_MISSING_CODES: [i32; 2] = [3, 4];

/// Classified outcome of an invocation that is not a genuine failure.
///
/// Genuine failures (any other non-zero exit, or failure to start the
/// process) are returned as [`Error::CommandFailed`] / [`Error::Spawn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Zero exit status
    Success,
    /// The requested directory/file does not exist (exit code 3 or 4)
    TargetMissing { code: i32 },
}

/// Handle on a concrete rclone installation: binary plus config file.
#[derive(Debug, Clone)]
pub struct RcloneCli {
    binary: PathBuf,
    config: PathBuf,
}

impl RcloneCli {
    /// Create a handle for the given rclone binary and config file.
    pub fn new(binary: impl Into<PathBuf>, config: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            config: config.into(),
        }
    }

    /// Path to the rclone binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Path to the rclone config file.
    pub fn config(&self) -> &Path {
        &self.config
    }

    /// Run `rclone version` as a health check.
    ///
    /// Returns the combined output on success; any non-zero exit is a
    /// failure, there is no target to be missing.
    pub fn version(&self) -> Result<String> {
        let args: Vec<OsString> = vec![
            "version".into(),
            "--config".into(),
            self.config.clone().into(),
        ];
        let rendered = render_command(&self.binary, &args);
        info!(cmd = %rendered, "running command");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                command: rendered.clone(),
                source,
            })?;

        let combined = combine_output(&output.stdout, &output.stderr);
        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: rendered,
                code: output.status.code(),
                output: combined,
            });
        }

        info!(cmd = %rendered, output = %combined.trim(), "finished running command");
        Ok(combined)
    }

    /// Run `rclone lsjson -R <dir>`, streaming combined stdout+stderr into
    /// `sink`.
    ///
    /// The caller owns the sink handle; `sink_path` is only used to read
    /// the streamed output back for diagnostics on failure.
    pub fn list_recursive(&self, dir: &str, sink: File, sink_path: &Path) -> Result<RunStatus> {
        let args: Vec<OsString> = vec![
            "lsjson".into(),
            "--config".into(),
            self.config.clone().into(),
            "-R".into(),
            dir.into(),
        ];
        let rendered = render_command(&self.binary, &args);
        info!(cmd = %rendered, "running command");

        let stderr_sink = sink.try_clone().map_err(|source| Error::Redirect {
            path: sink_path.to_path_buf(),
            source,
        })?;

        let status = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(sink))
            .stderr(Stdio::from(stderr_sink))
            .status()
            .map_err(|source| Error::Spawn {
                command: rendered.clone(),
                source,
            })?;

        if status.success() {
            info!(cmd = %rendered, "finished running command");
            return Ok(RunStatus::Success);
        }

        match status.code() {
            Some(code) if TARGET_MISSING_CODES.contains(&code) => {
                Ok(RunStatus::TargetMissing { code })
            }
            code => {
                // The streamed output is the best diagnostics we have.
                let output = fs::read_to_string(sink_path).unwrap_or_default();
                Err(Error::CommandFailed {
                    command: rendered,
                    code,
                    output,
                })
            }
        }
    }

    /// Run `rclone sync <source> <dest>` with the fixed argument template.
    ///
    /// Unlike listing, a sync that cannot proceed is always a failure:
    /// target-missing exit codes are not given special treatment here.
    pub fn sync(
        &self,
        source: &str,
        dest: &str,
        extra_args: &[String],
        sync_log: &Path,
        report: &Path,
    ) -> Result<()> {
        let args = self.sync_args(source, dest, extra_args, sync_log, report);
        let rendered = render_command(&self.binary, &args);
        info!(cmd = %rendered, "running command");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                command: rendered.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: rendered,
                code: output.status.code(),
                output: combine_output(&output.stdout, &output.stderr),
            });
        }

        info!(cmd = %rendered, "finished running command");
        Ok(())
    }

    /// Argument list for `sync`: source and destination, then caller
    /// extras, then the fixed, non-overridable template. The template
    /// comes last so extras cannot override it.
    fn sync_args(
        &self,
        source: &str,
        dest: &str,
        extra_args: &[String],
        sync_log: &Path,
        report: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["sync".into(), source.into(), dest.into()];
        args.extend(extra_args.iter().map(OsString::from));
        args.extend([
            "--config".into(),
            self.config.clone().into(),
            "--use-json-log".into(),
            "--log-level".into(),
            "DEBUG".into(),
            "--log-file".into(),
            sync_log.into(),
            "--combined".into(),
            report.into(),
            "--check-first".into(),
            "--metadata".into(),
        ]);
        args
    }
}

/// Render a command line for log messages and error context.
fn render_command(binary: &Path, args: &[OsString]) -> String {
    let mut rendered = binary.display().to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}

/// Combine captured stdout and stderr into one diagnostic string.
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(stderr));
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    /// Write an executable shell script standing in for rclone.
    #[cfg(unix)]
    fn fake_rclone(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-rclone");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn cli(binary: &Path, temp: &TempDir) -> RcloneCli {
        RcloneCli::new(binary, temp.path().join("rclone.conf"))
    }

    #[test]
    fn test_sync_args_extras_precede_fixed_template() {
        let rclone = RcloneCli::new("rclone", "rclone.conf");
        let extras = vec!["--checksum".to_string(), "--dry-run".to_string()];
        let args = rclone.sync_args(
            "/src",
            "/dst",
            &extras,
            Path::new("sync.json"),
            Path::new("report.txt"),
        );

        let pos = |needle: &str| {
            args.iter()
                .position(|a| a == needle)
                .unwrap_or_else(|| panic!("missing arg {}", needle))
        };

        assert_eq!(pos("sync"), 0);
        assert_eq!(pos("/src"), 1);
        assert_eq!(pos("/dst"), 2);
        assert!(pos("--checksum") < pos("--dry-run"));
        assert!(pos("--dry-run") < pos("--config"));
        assert!(pos("--config") < pos("--use-json-log"));
        assert!(pos("--combined") < pos("--check-first"));
        assert_eq!(pos("--metadata"), args.len() - 1);
    }

    #[test]
    fn test_sync_args_without_extras() {
        let rclone = RcloneCli::new("rclone", "rclone.conf");
        let args = rclone.sync_args(
            "/src",
            "/dst",
            &[],
            Path::new("sync.json"),
            Path::new("report.txt"),
        );

        assert_eq!(args[0], "sync");
        assert_eq!(args[3], "--config");
        assert!(!args.iter().any(|a| a == "--checksum" || a == "--dry-run"));
    }

    #[test]
    fn test_render_command() {
        let rendered = render_command(
            Path::new("/usr/bin/rclone"),
            &["version".into(), "--config".into(), "a.conf".into()],
        );
        assert_eq!(rendered, "/usr/bin/rclone version --config a.conf");
    }

    #[cfg(unix)]
    #[test]
    fn test_version_captures_output() {
        let temp = TempDir::new().unwrap();
        let binary = fake_rclone(temp.path(), r#"echo "rclone v1.68.0 (fake)""#);

        let output = cli(&binary, &temp).version().unwrap();
        assert!(output.contains("rclone v1.68.0"));
    }

    #[cfg(unix)]
    #[test]
    fn test_version_failure_is_command_failed() {
        let temp = TempDir::new().unwrap();
        let binary = fake_rclone(temp.path(), "echo 'config broken' >&2; exit 1");

        let err = cli(&binary, &temp).version().unwrap_err();
        match err {
            Error::CommandFailed { code, output, .. } => {
                assert_eq!(code, Some(1));
                assert!(output.contains("config broken"));
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let temp = TempDir::new().unwrap();
        let rclone = RcloneCli::new(temp.path().join("does-not-exist"), "rclone.conf");

        assert!(matches!(rclone.version(), Err(Error::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_list_recursive_streams_stdout_and_stderr() {
        let temp = TempDir::new().unwrap();
        let binary = fake_rclone(temp.path(), "echo listed; echo warned >&2");

        let sink_path = temp.path().join("listing.json");
        let sink = File::create(&sink_path).unwrap();
        let status = cli(&binary, &temp)
            .list_recursive("/some/dir", sink, &sink_path)
            .unwrap();

        assert_eq!(status, RunStatus::Success);
        let content = fs::read_to_string(&sink_path).unwrap();
        assert!(content.contains("listed"));
        assert!(content.contains("warned"));
    }

    #[cfg(unix)]
    #[rstest]
    #[case(3)]
    #[case(4)]
    fn test_list_recursive_target_missing(#[case] code: i32) {
        let temp = TempDir::new().unwrap();
        let binary = fake_rclone(temp.path(), &format!("exit {}", code));

        let sink_path = temp.path().join("listing.json");
        let sink = File::create(&sink_path).unwrap();
        let status = cli(&binary, &temp)
            .list_recursive("/missing", sink, &sink_path)
            .unwrap();

        assert_eq!(status, RunStatus::TargetMissing { code });
    }

    #[cfg(unix)]
    #[test]
    fn test_list_recursive_generic_failure_reads_sink_back() {
        let temp = TempDir::new().unwrap();
        let binary = fake_rclone(temp.path(), "echo 'permission denied' >&2; exit 2");

        let sink_path = temp.path().join("listing.json");
        let sink = File::create(&sink_path).unwrap();
        let err = cli(&binary, &temp)
            .list_recursive("/dir", sink, &sink_path)
            .unwrap_err();

        match err {
            Error::CommandFailed { code, output, .. } => {
                assert_eq!(code, Some(2));
                assert!(output.contains("permission denied"));
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_success() {
        let temp = TempDir::new().unwrap();
        let binary = fake_rclone(temp.path(), "exit 0");

        let result = cli(&binary, &temp).sync(
            "/src",
            "/dst",
            &[],
            &temp.path().join("sync.json"),
            &temp.path().join("report.txt"),
        );
        assert!(result.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_escalates_target_missing() {
        let temp = TempDir::new().unwrap();
        let binary = fake_rclone(temp.path(), "echo 'source not found' >&2; exit 3");

        let err = cli(&binary, &temp)
            .sync(
                "/missing",
                "/dst",
                &[],
                &temp.path().join("sync.json"),
                &temp.path().join("report.txt"),
            )
            .unwrap_err();

        // Exit code 3 is TargetMissing for listings, but a sync that cannot
        // proceed is always a failure.
        match err {
            Error::CommandFailed { code, output, .. } => {
                assert_eq!(code, Some(3));
                assert!(output.contains("source not found"));
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }
}
