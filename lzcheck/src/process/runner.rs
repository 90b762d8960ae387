//! Production command runner on top of `tokio::process`.

use super::{CommandOutcome, CommandRunner, CommandSpec, RunOptions};
use crate::errors::HarnessError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use tracing::{debug, warn};

const SEPARATOR_WIDTH: usize = 60;

/// Executes commands synchronously on the host system, capturing both
/// output streams.
///
/// One process is active at a time; the caller awaits completion before
/// issuing the next command. No timeout is enforced: a hung external
/// process hangs the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Creates a new system runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        options: RunOptions,
    ) -> Result<CommandOutcome, HarnessError> {
        let separator = "-".repeat(SEPARATOR_WIDTH);
        if options.echo {
            println!("{separator}");
            println!("Running: {spec}");
        }
        debug!(command = %spec, enforce = options.enforce_status, "spawning external process");

        let output = tokio::process::Command::new(spec.program())
            .args(spec.arg_list())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|err| {
                if err.kind() == ErrorKind::NotFound {
                    HarnessError::tool_not_found(spec.program(), spec.to_string())
                } else {
                    HarnessError::io(format!("failed to spawn `{spec}`"), err)
                }
            })?;

        let outcome = CommandOutcome::new(
            spec.to_string(),
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
            options.enforce_status,
        );

        // A failed command always surfaces its diagnostics, echo flag or not.
        let show = options.echo || !outcome.succeeded();
        if show && !outcome.stdout.trim().is_empty() {
            println!("--- STDOUT ---");
            println!("{}", outcome.stdout.trim_end());
            println!("--------------");
        }
        if !outcome.stderr.trim().is_empty() {
            eprintln!("--- STDERR ---");
            eprintln!("{}", outcome.stderr.trim_end());
            eprintln!("--------------");
        }
        if options.echo {
            println!("{separator}");
        }

        if !outcome.succeeded() {
            warn!(
                command = %spec,
                exit_code = ?outcome.exit_code,
                "external process exited unsuccessfully"
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clean_exit_succeeds() {
        let runner = SystemRunner::new();
        let spec = CommandSpec::new("sh").args(["-c", "exit 0"]);
        let outcome = runner
            .run(&spec, RunOptions::new().with_echo(false))
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, Some(0));
        assert!(outcome.succeeded());
    }

    #[tokio::test]
    async fn test_nonzero_exit_fails_under_enforcement() {
        let runner = SystemRunner::new();
        let spec = CommandSpec::new("sh").args(["-c", "exit 3"]);
        let outcome = runner
            .run(&spec, RunOptions::new().with_echo(false))
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, Some(3));
        assert!(!outcome.succeeded());
    }

    #[tokio::test]
    async fn test_nonzero_exit_tolerated_without_enforcement() {
        let runner = SystemRunner::new();
        let spec = CommandSpec::new("sh").args(["-c", "exit 1"]);
        let outcome = runner
            .run(
                &spec,
                RunOptions::new().with_echo(false).with_enforce_status(false),
            )
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, Some(1));
        assert!(outcome.succeeded());
    }

    #[tokio::test]
    async fn test_captures_both_streams() {
        let runner = SystemRunner::new();
        let spec = CommandSpec::new("sh").args(["-c", "echo out; echo warn >&2"]);
        let outcome = runner
            .run(&spec, RunOptions::new().with_echo(false))
            .await
            .unwrap();
        assert!(outcome.stdout.contains("out"));
        assert!(outcome.stderr.contains("warn"));
    }

    #[tokio::test]
    async fn test_missing_tool_is_run_fatal() {
        let runner = SystemRunner::new();
        let spec = CommandSpec::new("definitely-not-a-real-tool-4a1b").arg("-x");
        let err = runner
            .run(&spec, RunOptions::new().with_echo(false))
            .await
            .unwrap_err();
        assert!(err.is_tool_not_found());
        assert!(err.to_string().contains("definitely-not-a-real-tool-4a1b"));
    }

    #[tokio::test]
    async fn test_arguments_pass_verbatim() {
        let runner = SystemRunner::new();
        // A glob pattern must reach the child unexpanded.
        let spec = CommandSpec::new("sh").args(["-c", r#"printf '%s' "$0""#, "*.raw"]);
        let outcome = runner
            .run(&spec, RunOptions::new().with_echo(false))
            .await
            .unwrap();
        assert_eq!(outcome.stdout, "*.raw");
    }
}
