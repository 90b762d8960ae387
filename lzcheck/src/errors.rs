//! Error types for the verification harness.
//!
//! Only conditions that invalidate an entire run surface as errors.
//! Per-file conditions (a codec failure on one input, a content mismatch)
//! are not errors: the stage pipeline folds them into the
//! [`FileOutcome`](crate::pipeline::FileOutcome) it returns, and the run
//! continues with the next input.

use std::path::PathBuf;
use thiserror::Error;

/// An error that aborts the whole verification run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// An external executable could not be located or started.
    ///
    /// This signals a broken environment rather than a data problem, so it
    /// is fatal to the run, not just to the current input.
    #[error("command not found: {program} (attempted: `{command}`)")]
    ToolNotFound {
        /// The program that failed to resolve.
        program: String,
        /// The full command line that was attempted.
        command: String,
    },

    /// The build step exited with a non-zero status.
    #[error("build failed: `{command}` exited with status {}", .exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    BuildFailed {
        /// The full build command line.
        command: String,
        /// The exit code, if the process exited normally.
        exit_code: Option<i32>,
    },

    /// Scratch-workspace reset or corpus discovery failed.
    #[error("workspace setup failed at {}: {source}", .path.display())]
    WorkspaceSetup {
        /// The path being created, removed, or listed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure crossing a run boundary.
    #[error("{context}: {source}")]
    Io {
        /// What the harness was doing when the error occurred.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    /// Creates a tool-not-found error.
    #[must_use]
    pub fn tool_not_found(program: impl Into<String>, command: impl Into<String>) -> Self {
        Self::ToolNotFound {
            program: program.into(),
            command: command.into(),
        }
    }

    /// Creates a build-failed error.
    #[must_use]
    pub fn build_failed(command: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::BuildFailed {
            command: command.into(),
            exit_code,
        }
    }

    /// Creates a workspace-setup error.
    #[must_use]
    pub fn workspace_setup(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WorkspaceSetup {
            path: path.into(),
            source,
        }
    }

    /// Creates a generic I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns true if the error means an executable was missing.
    #[must_use]
    pub fn is_tool_not_found(&self) -> bool {
        matches!(self, Self::ToolNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_not_found_display() {
        let err = HarnessError::tool_not_found("lz_codec", "lz_codec -c -i a.raw");
        let rendered = err.to_string();
        assert!(rendered.contains("lz_codec"));
        assert!(rendered.contains("lz_codec -c -i a.raw"));
        assert!(err.is_tool_not_found());
    }

    #[test]
    fn test_build_failed_display() {
        let err = HarnessError::build_failed("make -B -j4", Some(2));
        assert!(err.to_string().contains("make -B -j4"));
        assert!(err.to_string().contains('2'));
        assert!(!err.is_tool_not_found());
    }

    #[test]
    fn test_build_failed_by_signal() {
        let err = HarnessError::build_failed("make", None);
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_workspace_setup_carries_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = HarnessError::workspace_setup("tmp", io);
        assert!(err.to_string().contains("tmp"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
