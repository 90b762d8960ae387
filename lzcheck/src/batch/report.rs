//! Aggregate run report.

use crate::pipeline::FileOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use uuid::Uuid;

const SUMMARY_BANNER_WIDTH: usize = 60;

/// The aggregate of every per-file outcome in one run.
///
/// Built by folding outcomes in as each file completes, finalized once at
/// the end of corpus iteration, and the single source of truth for the
/// process exit code.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Unique id for this run.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished; `None` while the corpus loop is running.
    pub finished_at: Option<DateTime<Utc>>,
    /// One outcome per attempted input, in processing order.
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Opens a report at the start of a run.
    #[must_use]
    pub fn begin() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
        }
    }

    /// Folds one completed file into the report.
    pub fn record(&mut self, outcome: FileOutcome) {
        self.outcomes.push(outcome);
    }

    /// Seals the report once the corpus loop has completed.
    #[must_use]
    pub fn finalize(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    /// Number of inputs attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Every input that did not round-trip, in processing order.
    #[must_use]
    pub fn failed_inputs(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter(|o| !o.matched)
            .map(|o| o.input.as_path())
            .collect()
    }

    /// True iff every attempted input matched. An empty corpus counts as
    /// success.
    #[must_use]
    pub fn overall_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.matched)
    }

    /// The process exit code this report drives: 0 iff overall success.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.overall_success())
    }

    /// Renders the final summary banner and, on failure, the list of
    /// failed inputs.
    #[must_use]
    pub fn render_summary(&self) -> String {
        let banner = "#".repeat(SUMMARY_BANNER_WIDTH);
        let mut text = String::new();
        let _ = writeln!(text, "\n{banner}");
        let _ = writeln!(text, "{} Final Summary {}", "#".repeat(20), "#".repeat(22));
        let _ = writeln!(text, "{banner}");
        if self.overall_success() {
            let _ = writeln!(
                text,
                "\n>>> SUCCESS: All {} processed files were compressed and decompressed correctly!",
                self.total()
            );
        } else {
            let failed = self.failed_inputs();
            let _ = writeln!(
                text,
                "\n!!! FAILURE: {} of {} files failed the compression/decompression test. !!!",
                failed.len(),
                self.total()
            );
            let _ = writeln!(text, "Failed files:");
            for path in failed {
                let _ = writeln!(text, "  - {}", path.display());
            }
            let _ = writeln!(text, "{banner}");
        }
        text
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::begin()
    }
}
