//! The per-file verification pipeline.
//!
//! For a single input, the pipeline drives the fixed stage sequence
//! compress → decompress → size-report → byte-compare → visualize,
//! short-circuiting on the first stage whose failure invalidates the
//! rest. Per file: `Init → Compressing → Decompressing → SizeChecking →
//! Comparing → {Visualizing → Done} | Done`; any fatal-stage failure
//! goes directly to `Done(failed)`.

mod outcome;
pub mod width;

pub use outcome::{ArtifactPaths, FileOutcome, StageDetail, StageKind, StageResult, StageStatus};


use crate::config::HarnessConfig;
use crate::errors::HarnessError;
use crate::process::{CommandRunner, RunOptions};
use std::path::Path;
use tracing::{debug, warn};

const FILE_BANNER_WIDTH: usize = 20;

/// Drives one input file through the fixed stage sequence.
pub struct RoundTripPipeline<'a> {
    config: &'a HarnessConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> RoundTripPipeline<'a> {
    /// Creates a pipeline over the given configuration and runner.
    #[must_use]
    pub fn new(config: &'a HarnessConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Runs the full stage sequence for `input` and returns its verdict.
    ///
    /// Every per-file condition (codec failure, size-tool failure,
    /// content mismatch, rendering failure) is folded into the returned
    /// [`FileOutcome`]. `Err` is reserved for environment failures that
    /// invalidate the whole run (a missing tool).
    pub async fn verify(&self, input: &Path) -> Result<FileOutcome, HarnessError> {
        let banner = "=".repeat(FILE_BANNER_WIDTH);
        println!("\n{banner} Processing file: {} {banner}", input.display());

        let width = width::resolve_width(input, self.config.default_width);
        let artifacts = ArtifactPaths::for_input(&self.config.tmp_dir, input);
        let mut outcome = FileOutcome::begin(input, width, artifacts);
        debug!(input = %input.display(), width, "starting round-trip pipeline");

        // Compress: fatal on failure.
        println!("\n[Compress]");
        let compress = self
            .config
            .compress_command(input, &outcome.artifacts.encoded, width);
        let run = self.runner.run(&compress, RunOptions::new()).await?;
        let succeeded = run.succeeded();
        outcome.push_stage(StageResult::from_command(StageKind::Compress, run, true));
        if !succeeded {
            println!("!!! Compression failed for {} !!!", input.display());
            return Ok(self.finish_failed(outcome));
        }

        // Decompress: fatal on failure.
        println!("\n[Decompress]");
        let decompress = self
            .config
            .decompress_command(&outcome.artifacts.encoded, &outcome.artifacts.decoded);
        let run = self.runner.run(&decompress, RunOptions::new()).await?;
        let succeeded = run.succeeded();
        outcome.push_stage(StageResult::from_command(StageKind::Decompress, run, true));
        if !succeeded {
            println!(
                "!!! Decompression failed for {} !!!",
                outcome.artifacts.encoded.display()
            );
            return Ok(self.finish_failed(outcome));
        }

        // Size report: informational output, but a failing size tool is an
        // environment problem and invalidates this file's pipeline.
        println!("\n[Verify Size]");
        let encoded = outcome.artifacts.encoded.clone();
        for subject in [input, encoded.as_path()] {
            let size = self.config.size_command(subject);
            let run = self.runner.run(&size, RunOptions::new()).await?;
            let succeeded = run.succeeded();
            outcome.push_stage(StageResult::from_command(StageKind::SizeReport, run, true));
            if !succeeded {
                return Ok(self.finish_failed(outcome));
            }
        }

        // Byte compare: the correctness oracle.
        println!("\n[Verify Content]");
        let matched = match files_identical(input, &outcome.artifacts.decoded).await {
            Ok(matched) => matched,
            Err(err) => {
                eprintln!("!!! Error comparing {}: {err} !!!", input.display());
                outcome.push_stage(StageResult::failed(
                    StageKind::Compare,
                    err.to_string(),
                    true,
                ));
                return Ok(self.finish_failed(outcome));
            }
        };
        outcome.push_stage(StageResult::comparison(matched));

        if !matched {
            eprintln!(
                "!!! Error: Files do not match for {}! !!!",
                input.display()
            );
            // Rendering a known-mismatched file adds nothing.
            outcome.push_stage(StageResult::skipped(
                StageKind::Visualize,
                "decoded output differs from input",
            ));
            return Ok(self.finish_failed(outcome));
        }
        println!(">>> Success: Files match!");

        // Visualize: best-effort, never fatal.
        println!("\n[Generate PNGs]");
        let renders = [
            (input.to_path_buf(), outcome.artifacts.golden_image.clone()),
            (
                outcome.artifacts.decoded.clone(),
                outcome.artifacts.decoded_image.clone(),
            ),
        ];
        for (raw, image) in &renders {
            let render = self.config.render_command(raw, width, image);
            let run = self.runner.run(&render, RunOptions::new()).await?;
            if !run.succeeded() {
                warn!(
                    source = %raw.display(),
                    image = %image.display(),
                    "rendering failed, continuing"
                );
                eprintln!("Warning: Failed to render {} to {}", raw.display(), image.display());
            }
            outcome.push_stage(StageResult::from_command(StageKind::Visualize, run, false));
        }

        println!(
            "\n{banner} Finished processing {} (Success) {banner}",
            input.display()
        );
        Ok(outcome.finish(true))
    }

    fn finish_failed(&self, outcome: FileOutcome) -> FileOutcome {
        let banner = "=".repeat(FILE_BANNER_WIDTH);
        println!(
            "{banner} Finished processing {} (FAILED) {banner}",
            outcome.input.display()
        );
        outcome.finish(false)
    }
}

/// Exact content-equality check between two files, equivalent to
/// `cmp -s a b` returning 0.
async fn files_identical(a: &Path, b: &Path) -> std::io::Result<bool> {
    let (left, right) = (tokio::fs::read(a).await?, tokio::fs::read(b).await?);
    Ok(left == right)
}
