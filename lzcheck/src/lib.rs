//! # lzcheck
//!
//! Batch round-trip verification harness for an external compression
//! codec.
//!
//! The harness builds the codec, discovers a corpus of fixed-format
//! binary inputs, and drives each one through a compress → decompress →
//! size-report → byte-compare → visualize pipeline, verifying that the
//! decoded output is byte-identical to the input. Per-file failures are
//! isolated so one bad input never aborts the run; the final report
//! drives the process exit code.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lzcheck::prelude::*;
//!
//! let orchestrator = BatchOrchestrator::new(HarnessConfig::default());
//! let report = orchestrator.run().await?;
//! std::process::exit(i32::from(report.exit_code()));
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod batch;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod process;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::batch::{BatchOrchestrator, BatchReport, CorpusPhase};
    pub use crate::config::HarnessConfig;
    pub use crate::errors::HarnessError;
    pub use crate::pipeline::{
        ArtifactPaths, FileOutcome, RoundTripPipeline, StageDetail, StageKind, StageResult,
        StageStatus,
    };
    pub use crate::process::{
        CommandOutcome, CommandRunner, CommandSpec, RunOptions, SystemRunner,
    };
}
