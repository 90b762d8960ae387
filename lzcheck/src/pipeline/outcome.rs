//! Per-stage and per-file outcome types.

use crate::process::CommandOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// The fixed stages of the round-trip pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Encode the input with the codec.
    Compress,
    /// Decode the encoded artifact back to raw bytes.
    Decompress,
    /// Report original and encoded sizes, informational only.
    SizeReport,
    /// Byte-for-byte comparison of input and decoded output.
    Compare,
    /// Best-effort rendering of raw buffers to images.
    Visualize,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compress => write!(f, "compress"),
            Self::Decompress => write!(f, "decompress"),
            Self::SizeReport => write!(f, "size-report"),
            Self::Compare => write!(f, "compare"),
            Self::Visualize => write!(f, "visualize"),
        }
    }
}

/// The execution status of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage ran to completion.
    Ok,
    /// Stage ran and failed.
    Fail,
    /// Stage was not run.
    Skip,
}

/// What a stage produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageDetail {
    /// An external process ran to completion.
    Command(CommandOutcome),
    /// The in-process byte comparison ran; `matched` is its verdict.
    Comparison {
        /// True iff the decoded output was byte-identical to the input.
        matched: bool,
    },
    /// The stage failed or was skipped before producing a payload.
    Message {
        /// Failure description or skip reason.
        message: String,
    },
}

/// The outcome of one pipeline stage for one input file.
#[derive(Debug, Clone, Serialize)]
pub struct StageResult {
    /// Which stage this is.
    pub stage: StageKind,
    /// How the stage ended.
    pub status: StageStatus,
    /// The stage payload.
    pub detail: StageDetail,
    /// Whether a failure of this stage halts the remaining pipeline.
    pub fatal: bool,
}

impl StageResult {
    /// Wraps a finished external command; status follows the command's
    /// own success verdict.
    #[must_use]
    pub fn from_command(stage: StageKind, outcome: CommandOutcome, fatal: bool) -> Self {
        let status = if outcome.succeeded() {
            StageStatus::Ok
        } else {
            StageStatus::Fail
        };
        Self {
            stage,
            status,
            detail: StageDetail::Command(outcome),
            fatal,
        }
    }

    /// Records the byte-comparison verdict. The comparison itself ran, so
    /// the status is `Ok` even on a mismatch; a mismatch is a result, not
    /// a stage error.
    #[must_use]
    pub fn comparison(matched: bool) -> Self {
        Self {
            stage: StageKind::Compare,
            status: StageStatus::Ok,
            detail: StageDetail::Comparison { matched },
            fatal: true,
        }
    }

    /// Records a stage that failed without a command payload.
    #[must_use]
    pub fn failed(stage: StageKind, message: impl Into<String>, fatal: bool) -> Self {
        Self {
            stage,
            status: StageStatus::Fail,
            detail: StageDetail::Message {
                message: message.into(),
            },
            fatal,
        }
    }

    /// Records a stage that was not run.
    #[must_use]
    pub fn skipped(stage: StageKind, reason: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Skip,
            detail: StageDetail::Message {
                message: reason.into(),
            },
            fatal: false,
        }
    }

    /// Returns true unless the stage ran and failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status != StageStatus::Fail
    }
}

/// Scratch-workspace artifact paths derived from one input's file stem.
///
/// Stems within a corpus directory are unique and the run is sequential,
/// so these paths are collision-free.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactPaths {
    /// Encoded output of the compress stage.
    pub encoded: PathBuf,
    /// Decoded output of the decompress stage.
    pub decoded: PathBuf,
    /// Rendered image of the original input.
    pub golden_image: PathBuf,
    /// Rendered image of the decoded output.
    pub decoded_image: PathBuf,
}

impl ArtifactPaths {
    /// Derives the artifact paths for `input` inside `tmp_dir`.
    #[must_use]
    pub fn for_input(tmp_dir: &Path, input: &Path) -> Self {
        let stem = input
            .file_stem()
            .map_or_else(|| "input".to_string(), |s| s.to_string_lossy().into_owned());
        Self {
            encoded: tmp_dir.join(format!("{stem}.enc")),
            decoded: tmp_dir.join(format!("{stem}.dec")),
            golden_image: tmp_dir.join(format!("{stem}_golden.png")),
            decoded_image: tmp_dir.join(format!("{stem}_output.png")),
        }
    }
}

/// The per-input verdict: which stages ran, and whether the decoded
/// output was byte-identical to the input.
///
/// Created once when the pipeline starts on an input, finalized exactly
/// once when the pipeline completes or short-circuits, and never mutated
/// afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// The input file.
    pub input: PathBuf,
    /// The row width the pipeline resolved for this input.
    pub width: u32,
    /// Scratch artifacts derived from the input's stem.
    pub artifacts: ArtifactPaths,
    /// The stages that actually executed, in order.
    pub stages: Vec<StageResult>,
    /// True iff the decoded output was byte-identical to the input.
    pub matched: bool,
    /// When the pipeline started on this input.
    pub started_at: DateTime<Utc>,
    /// When the pipeline finished with this input.
    pub ended_at: DateTime<Utc>,
}

impl FileOutcome {
    /// Starts tracking an input at the head of its pipeline run.
    #[must_use]
    pub fn begin(input: impl Into<PathBuf>, width: u32, artifacts: ArtifactPaths) -> Self {
        let now = Utc::now();
        Self {
            input: input.into(),
            width,
            artifacts,
            stages: Vec::new(),
            matched: false,
            started_at: now,
            ended_at: now,
        }
    }

    /// Appends the result of a completed stage.
    pub fn push_stage(&mut self, result: StageResult) {
        self.stages.push(result);
    }

    /// Seals the outcome with the final verdict.
    #[must_use]
    pub fn finish(mut self, matched: bool) -> Self {
        self.matched = matched;
        self.ended_at = Utc::now();
        self
    }

    /// The first fatal stage failure, if the pipeline short-circuited.
    #[must_use]
    pub fn fatal_failure(&self) -> Option<&StageResult> {
        self.stages
            .iter()
            .find(|s| s.fatal && s.status == StageStatus::Fail)
    }

    /// Wall-clock duration of this input's pipeline run.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        (self.ended_at - self.started_at).num_milliseconds() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn command_outcome(exit_code: i32) -> CommandOutcome {
        CommandOutcome::new("tool -x", Some(exit_code), "", "", true)
    }

    #[test]
    fn test_stage_result_from_successful_command() {
        let result = StageResult::from_command(StageKind::Compress, command_outcome(0), true);
        assert_eq!(result.status, StageStatus::Ok);
        assert!(result.is_success());
        assert!(result.fatal);
    }

    #[test]
    fn test_stage_result_from_failed_command() {
        let result = StageResult::from_command(StageKind::Decompress, command_outcome(2), true);
        assert_eq!(result.status, StageStatus::Fail);
        assert!(!result.is_success());
    }

    #[test]
    fn test_comparison_mismatch_is_not_a_stage_error() {
        let result = StageResult::comparison(false);
        assert_eq!(result.status, StageStatus::Ok);
        assert!(matches!(
            result.detail,
            StageDetail::Comparison { matched: false }
        ));
    }

    #[test]
    fn test_skipped_stage_counts_as_success() {
        let result = StageResult::skipped(StageKind::Visualize, "decoded output differs");
        assert_eq!(result.status, StageStatus::Skip);
        assert!(result.is_success());
        assert!(!result.fatal);
    }

    #[test]
    fn test_artifact_paths_derive_from_stem() {
        let paths = ArtifactPaths::for_input(Path::new("tmp"), Path::new("benchmark/lena.raw"));
        assert_eq!(paths.encoded, PathBuf::from("tmp/lena.enc"));
        assert_eq!(paths.decoded, PathBuf::from("tmp/lena.dec"));
        assert_eq!(paths.golden_image, PathBuf::from("tmp/lena_golden.png"));
        assert_eq!(paths.decoded_image, PathBuf::from("tmp/lena_output.png"));
    }

    #[test]
    fn test_file_outcome_records_fatal_failure() {
        let artifacts = ArtifactPaths::for_input(Path::new("tmp"), Path::new("a.raw"));
        let mut outcome = FileOutcome::begin("a.raw", 512, artifacts);
        outcome.push_stage(StageResult::from_command(
            StageKind::Compress,
            command_outcome(1),
            true,
        ));
        let outcome = outcome.finish(false);
        assert!(!outcome.matched);
        let failure = outcome.fatal_failure().unwrap();
        assert_eq!(failure.stage, StageKind::Compress);
    }

    #[test]
    fn test_file_outcome_matched_run_has_no_fatal_failure() {
        let artifacts = ArtifactPaths::for_input(Path::new("tmp"), Path::new("a.raw"));
        let mut outcome = FileOutcome::begin("a.raw", 512, artifacts);
        outcome.push_stage(StageResult::from_command(
            StageKind::Compress,
            command_outcome(0),
            true,
        ));
        outcome.push_stage(StageResult::comparison(true));
        let outcome = outcome.finish(true);
        assert!(outcome.matched);
        assert!(outcome.fatal_failure().is_none());
    }

    #[test]
    fn test_stage_kind_display() {
        assert_eq!(StageKind::SizeReport.to_string(), "size-report");
        assert_eq!(StageKind::Compare.to_string(), "compare");
    }
}
