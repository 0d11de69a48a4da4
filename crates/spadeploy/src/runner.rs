//! Child process execution (Imperative Shell).

use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use spadeploy_core::deploy::CommandSpec;
use thiserror::Error;
use tokio::process::Command;

/// Result type alias for the runner module.
pub type Result<T> = std::result::Result<T, RunnerError>;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("'{command}' exited with {}{}", describe_code(.code), describe_stderr(.stderr))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("'{command}' interrupted")]
    Interrupted { command: String },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    let stderr = stderr.trim_end();
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{stderr}")
    }
}

/// Seam between the orchestrator and the programs it drives.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs a command with output streamed to the terminal.
    async fn run(&self, command: &CommandSpec) -> Result<()>;

    /// Runs a command and returns its standard output.
    async fn capture(&self, command: &CommandSpec) -> Result<String>;
}

/// Spawns real processes with Tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    /// Capture instead of streaming; output is only shown when a command fails.
    pub quiet: bool,
}

impl ProcessRunner {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    fn command(spec: &CommandSpec) -> Command {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args).kill_on_drop(true);
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }
        command
    }

    async fn wait_or_interrupt(
        spec: &CommandSpec,
        mut child: tokio::process::Child,
    ) -> Result<ExitStatus> {
        tokio::select! {
            status = child.wait() => status.map_err(|source| RunnerError::Spawn {
                command: spec.to_string(),
                source,
            }),
            _ = tokio::signal::ctrl_c() => {
                let _ = child.kill().await;
                Err(RunnerError::Interrupted { command: spec.to_string() })
            }
        }
    }

    async fn output(spec: &CommandSpec) -> Result<String> {
        let child = Self::command(spec)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                command: spec.to_string(),
                source,
            })?;

        let output = tokio::select! {
            output = child.wait_with_output() => output.map_err(|source| RunnerError::Spawn {
                command: spec.to_string(),
                source,
            })?,
            // Dropping the pending future drops the child, which kills it.
            _ = tokio::signal::ctrl_c() => {
                return Err(RunnerError::Interrupted { command: spec.to_string() });
            }
        };

        if !output.status.success() {
            return Err(RunnerError::NonZeroExit {
                command: spec.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<()> {
        tracing::debug!(command = %spec, cwd = ?spec.cwd, "running");

        if self.quiet {
            return Self::output(spec).await.map(|_| ());
        }

        let child = Self::command(spec)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                command: spec.to_string(),
                source,
            })?;

        let status = Self::wait_or_interrupt(spec, child).await?;
        if !status.success() {
            return Err(RunnerError::NonZeroExit {
                command: spec.to_string(),
                code: status.code(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    async fn capture(&self, spec: &CommandSpec) -> Result<String> {
        tracing::debug!(command = %spec, cwd = ?spec.cwd, "capturing");
        Self::output(spec).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_zero_exit_message_includes_stderr() {
        let err = RunnerError::NonZeroExit {
            command: "npm run build".to_string(),
            code: Some(2),
            stderr: "Module not found: src/App\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'npm run build' exited with code 2\nModule not found: src/App"
        );
    }

    #[test]
    fn test_signal_exit_message() {
        let err = RunnerError::NonZeroExit {
            command: "aws s3 sync".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "'aws s3 sync' exited with a signal");
    }

    #[tokio::test]
    async fn test_capture_returns_stdout() {
        let runner = ProcessRunner::new(true);
        let stdout = runner
            .capture(&CommandSpec::new("echo").arg("spadeploy"))
            .await
            .unwrap();
        assert_eq!(stdout.trim(), "spadeploy");
    }

    #[tokio::test]
    async fn test_capture_reports_failure_with_stderr() {
        let runner = ProcessRunner::new(true);
        let result = runner
            .capture(&CommandSpec::new("sh").args(["-c", "echo broken >&2; exit 3"]))
            .await;
        match result {
            Err(RunnerError::NonZeroExit { code, stderr, .. }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "broken");
            }
            other => panic!("expected non-zero exit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let runner = ProcessRunner::new(true);
        let result = runner
            .run(&CommandSpec::new("spadeploy-definitely-missing-program"))
            .await;
        assert!(matches!(result, Err(RunnerError::Spawn { .. })));
    }
}
