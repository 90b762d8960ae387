//! The batch orchestrator: prepare, discover, drive, report.
//!
//! One run builds the system under test, resets the scratch workspace,
//! walks each corpus phase in a fixed order, drives every discovered
//! input through the per-file pipeline, and folds the outcomes into a
//! single [`BatchReport`]. Per-file failures are recorded, never
//! propagated: the corpus loop always completes.

mod report;

pub use report::BatchReport;


use crate::config::HarnessConfig;
use crate::errors::HarnessError;
use crate::pipeline::RoundTripPipeline;
use crate::process::{CommandRunner, RunOptions, SystemRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const PHASE_BANNER_WIDTH: usize = 15;

/// One corpus discovery phase: a directory scanned for one extension.
#[derive(Debug, Clone)]
pub struct CorpusPhase {
    /// Human-readable phase label.
    pub label: String,
    /// Directory to scan.
    pub dir: PathBuf,
    /// Extension to match, without the dot.
    pub extension: String,
}

/// Top-level entry point for a verification run.
pub struct BatchOrchestrator {
    config: HarnessConfig,
    runner: Arc<dyn CommandRunner>,
}

impl BatchOrchestrator {
    /// Creates an orchestrator running real processes.
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner::new()))
    }

    /// Creates an orchestrator with a caller-supplied runner.
    #[must_use]
    pub fn with_runner(config: HarnessConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Runs the full batch: build, workspace reset, every corpus phase,
    /// final report.
    ///
    /// `Err` means the environment is broken (build failure, missing
    /// tool, workspace I/O); everything per-file is inside the report.
    pub async fn run(&self) -> Result<BatchReport, HarnessError> {
        self.build().await?;
        self.reset_workspace().await?;

        let mut report = BatchReport::begin();
        let pipeline = RoundTripPipeline::new(&self.config, self.runner.as_ref());

        for phase in self.phases() {
            let hashes = "#".repeat(PHASE_BANNER_WIDTH);
            println!(
                "\n{hashes} {}: {}/*.{} {hashes}",
                phase.label,
                phase.dir.display(),
                phase.extension
            );
            let inputs = self.discover(&phase).await?;
            if inputs.is_empty() {
                continue;
            }
            println!(
                "Found {} .{} files to process.",
                inputs.len(),
                phase.extension
            );
            for input in inputs {
                let outcome = pipeline.verify(&input).await?;
                report.record(outcome);
            }
        }

        let report = report.finalize();
        info!(
            run_id = %report.run_id,
            total = report.total(),
            failed = report.failed_inputs().len(),
            "batch complete"
        );
        Ok(report)
    }

    /// The fixed phase order: the `*.raw` benchmark corpus, then the
    /// optional `*.bin` generated corpus.
    fn phases(&self) -> Vec<CorpusPhase> {
        vec![
            CorpusPhase {
                label: "Phase 1".to_string(),
                dir: self.config.benchmark_dir.clone(),
                extension: "raw".to_string(),
            },
            CorpusPhase {
                label: "Phase 2".to_string(),
                dir: self.config.generated_dir.clone(),
                extension: "bin".to_string(),
            },
        ]
    }

    /// Compiles the system under test. The run is meaningless without a
    /// buildable codec, so any failure here aborts everything.
    async fn build(&self) -> Result<(), HarnessError> {
        println!(">>> Compiling project...");
        let spec = self.config.build_command_spec();
        let outcome = self.runner.run(&spec, RunOptions::new()).await?;
        if !outcome.succeeded() {
            return Err(HarnessError::build_failed(
                outcome.command,
                outcome.exit_code,
            ));
        }
        println!(">>> Compilation complete.");
        Ok(())
    }

    /// Wipes and recreates the scratch workspace, tolerating prior
    /// absence.
    async fn reset_workspace(&self) -> Result<(), HarnessError> {
        let tmp = &self.config.tmp_dir;
        println!("\n>>> Setting up temporary directory: {}", tmp.display());
        match tokio::fs::remove_dir_all(tmp).await {
            Ok(()) => debug!(path = %tmp.display(), "removed stale workspace"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(HarnessError::workspace_setup(tmp.clone(), err)),
        }
        tokio::fs::create_dir_all(tmp)
            .await
            .map_err(|err| HarnessError::workspace_setup(tmp.clone(), err))?;
        Ok(())
    }

    /// Lists a phase's inputs, sorted lexicographically for a
    /// deterministic run order. An empty or missing corpus is a warning,
    /// not an error.
    async fn discover(&self, phase: &CorpusPhase) -> Result<Vec<PathBuf>, HarnessError> {
        let mut inputs = match list_by_extension(&phase.dir, &phase.extension).await {
            Ok(inputs) => inputs,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    dir = %phase.dir.display(),
                    "corpus directory not found, skipping phase"
                );
                eprintln!(
                    "Warning: Directory {} not found. Skipping {}.",
                    phase.dir.display(),
                    phase.label
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(HarnessError::workspace_setup(phase.dir.clone(), err)),
        };
        inputs.sort();
        if inputs.is_empty() {
            warn!(
                dir = %phase.dir.display(),
                extension = %phase.extension,
                "no corpus files found"
            );
            eprintln!(
                "Warning: No .{} files found in {}",
                phase.extension,
                phase.dir.display()
            );
        }
        Ok(inputs)
    }
}

async fn list_by_extension(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut inputs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|e| e == extension) {
            inputs.push(path);
        }
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_build_failure_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::default()
            .rooted_at(dir.path())
            .with_build_command(vec!["make".to_string()]);
        let runner = Arc::new(ScriptedRunner::new(|spec| {
            Ok(crate::testing::exit_with(spec, 2))
        }));
        let orchestrator = BatchOrchestrator::with_runner(config, runner);

        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, HarnessError::BuildFailed { exit_code: Some(2), .. }));
    }

    #[tokio::test]
    async fn test_missing_build_tool_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::default().rooted_at(dir.path());
        let runner = Arc::new(ScriptedRunner::new(|spec| {
            Err(HarnessError::tool_not_found(spec.program(), spec.to_string()))
        }));
        let orchestrator = BatchOrchestrator::with_runner(config, runner);

        let err = orchestrator.run().await.unwrap_err();
        assert!(err.is_tool_not_found());
    }

    #[tokio::test]
    async fn test_empty_corpus_is_a_successful_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::default().rooted_at(dir.path());
        std::fs::create_dir_all(&config.benchmark_dir).unwrap();
        let runner = Arc::new(ScriptedRunner::succeeding());
        let orchestrator = BatchOrchestrator::with_runner(config, runner);

        let report = orchestrator.run().await.unwrap();
        assert_eq!(report.total(), 0);
        assert!(report.overall_success());
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_workspace_reset_creates_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::default().rooted_at(dir.path());
        let tmp = config.tmp_dir.clone();
        std::fs::create_dir_all(tmp.join("stale")).unwrap();
        std::fs::write(tmp.join("stale/leftover.enc"), b"x").unwrap();
        let runner = Arc::new(ScriptedRunner::succeeding());
        let orchestrator = BatchOrchestrator::with_runner(config, runner);

        orchestrator.run().await.unwrap();
        assert!(tmp.is_dir());
        assert!(!tmp.join("stale").exists());
    }

    #[tokio::test]
    async fn test_discovery_order_is_lexicographic() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::default().rooted_at(dir.path());
        std::fs::create_dir_all(&config.benchmark_dir).unwrap();
        for name in ["c.raw", "a.raw", "b.raw", "notes.txt"] {
            std::fs::write(config.benchmark_dir.join(name), b"x").unwrap();
        }
        let orchestrator =
            BatchOrchestrator::with_runner(config.clone(), Arc::new(ScriptedRunner::succeeding()));
        let phase = CorpusPhase {
            label: "Phase 1".to_string(),
            dir: config.benchmark_dir.clone(),
            extension: "raw".to_string(),
        };

        let inputs = orchestrator.discover(&phase).await.unwrap();
        let names: Vec<_> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.raw", "b.raw", "c.raw"]);
    }
}
