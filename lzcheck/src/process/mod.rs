//! External-process invocation and outcome capture.
//!
//! Everything above this module talks to external tools through the
//! [`CommandRunner`] trait: a command goes in, a structured
//! [`CommandOutcome`] comes out. Neither the stage pipeline nor the batch
//! orchestrator ever deal with process spawning directly, so tests can
//! substitute a scripted runner for the real one.

mod runner;

pub use runner::SystemRunner;

use crate::errors::HarnessError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An external command: program plus ordered argument list.
///
/// Arguments are passed to the OS verbatim, with no shell interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Creates a command for the given program.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The program being invoked.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument list, program excluded.
    #[must_use]
    pub fn arg_list(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Options controlling one command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Treat a non-zero exit status as failure.
    pub enforce_status: bool,
    /// Echo the command line and captured stdout to the console.
    ///
    /// Captured stderr is shown whenever non-empty regardless of this
    /// flag, since tools print warnings there on success paths too.
    pub echo: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            enforce_status: true,
            echo: true,
        }
    }
}

impl RunOptions {
    /// Enforced status, echoed output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether a non-zero exit counts as failure.
    #[must_use]
    pub fn with_enforce_status(mut self, enforce: bool) -> Self {
        self.enforce_status = enforce;
        self
    }

    /// Sets whether captured output is echoed.
    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }
}

/// The result of one external-process invocation.
///
/// Created fresh per invocation and immutable once returned. A process
/// that could not be started at all never produces an outcome; that is a
/// [`HarnessError::ToolNotFound`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// The rendered command line, for diagnostics.
    pub command: String,
    /// Exit code, or `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output (may be empty).
    pub stdout: String,
    /// Captured standard error (may be empty).
    pub stderr: String,
    /// Whether a non-zero exit status was requested to count as failure.
    pub enforced: bool,
}

impl CommandOutcome {
    /// Creates an outcome from raw capture results.
    #[must_use]
    pub fn new(
        command: impl Into<String>,
        exit_code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        enforced: bool,
    ) -> Self {
        Self {
            command: command.into(),
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            enforced,
        }
    }

    /// True iff the exit code is zero when enforcement was requested, or
    /// the invocation completed at all when it was not.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        if self.enforced {
            self.exit_code == Some(0)
        } else {
            true
        }
    }
}

/// Narrow interface for executing external commands.
///
/// The production implementation is [`SystemRunner`]; tests use
/// [`ScriptedRunner`](crate::testing::ScriptedRunner) to simulate missing
/// tools, non-zero exits, and captured output deterministically.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command to completion and returns its captured outcome.
    ///
    /// A non-zero exit under enforcement is an unsuccessful
    /// [`CommandOutcome`], not an `Err`; `Err` is reserved for a process
    /// that could not be started (missing tool, spawn failure), which is
    /// fatal to the whole run.
    async fn run(
        &self,
        spec: &CommandSpec,
        options: RunOptions,
    ) -> Result<CommandOutcome, HarnessError>;
}
