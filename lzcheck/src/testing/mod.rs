//! Test doubles for external-process execution.

use crate::errors::HarnessError;
use crate::process::{CommandOutcome, CommandRunner, CommandSpec, RunOptions};
use async_trait::async_trait;
use parking_lot::Mutex;

type Handler = dyn Fn(&CommandSpec) -> Result<CommandOutcome, HarnessError> + Send + Sync;

/// A command runner that answers from a programmable handler and records
/// every command it receives.
///
/// Lets tests simulate missing tools, non-zero exits, and captured-output
/// scenarios deterministically, without spawning processes.
pub struct ScriptedRunner {
    handler: Box<Handler>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    /// Creates a runner backed by `handler`.
    #[must_use]
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&CommandSpec) -> Result<CommandOutcome, HarnessError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a runner where every command exits cleanly.
    #[must_use]
    pub fn succeeding() -> Self {
        Self::new(|spec| Ok(exit_with(spec, 0)))
    }

    /// Every command received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().clone()
    }

    /// The number of commands received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// True iff some recorded command invoked `program`.
    #[must_use]
    pub fn invoked(&self, program: &str) -> bool {
        self.calls.lock().iter().any(|c| c.program() == program)
    }
}

impl std::fmt::Debug for ScriptedRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedRunner")
            .field("calls", &self.call_count())
            .finish()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        _options: RunOptions,
    ) -> Result<CommandOutcome, HarnessError> {
        self.calls.lock().push(spec.clone());
        (self.handler)(spec)
    }
}

/// Builds an enforced outcome for `spec` with the given exit code.
#[must_use]
pub fn exit_with(spec: &CommandSpec, exit_code: i32) -> CommandOutcome {
    CommandOutcome::new(spec.to_string(), Some(exit_code), "", "", true)
}

/// The value following `flag` in the command's argument list.
#[must_use]
pub fn arg_after<'a>(spec: &'a CommandSpec, flag: &str) -> Option<&'a str> {
    let args = spec.arg_list();
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}
