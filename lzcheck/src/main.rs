//! Binary entry point.
//!
//! Installs logging, loads configuration, runs the batch, prints the
//! final summary, and converts the report into the process exit code.
//! This is also the single catch-all: any error crossing this boundary
//! is printed with its full chain and exits non-zero.

use anyhow::Context;
use lzcheck::batch::{BatchOrchestrator, BatchReport};
use lzcheck::config::HarnessConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct CliArgs {
    config_path: Option<PathBuf>,
    json_path: Option<PathBuf>,
    help: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().ok_or("--config requires a path")?;
                parsed.config_path = Some(PathBuf::from(value));
            }
            "--json" => {
                let value = args.next().ok_or("--json requires a path")?;
                parsed.json_path = Some(PathBuf::from(value));
            }
            "-h" | "--help" => parsed.help = true,
            other => return Err(format!("unrecognized argument: {other}\n{}", usage())),
        }
    }
    Ok(parsed)
}

fn usage() -> String {
    "Usage: lzcheck [--config <path.json>] [--json <report-path.json>]".to_string()
}

fn load_config(path: Option<&Path>) -> anyhow::Result<HarnessConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(HarnessConfig::default()),
    }
}

fn write_json_report(path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("serializing report")?;
    std::fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
    Ok(())
}

async fn run(args: CliArgs) -> anyhow::Result<BatchReport> {
    let config = load_config(args.config_path.as_deref())?;
    let report = BatchOrchestrator::new(config).run().await?;
    println!("{}", report.render_summary());
    if let Some(path) = &args.json_path {
        write_json_report(path, &report)?;
    }
    Ok(report)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(1);
        }
    };
    if args.help {
        println!("{}", usage());
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(report) => ExitCode::from(report.exit_code()),
        Err(err) => {
            eprintln!("\nError: {err:#}");
            ExitCode::from(1)
        }
    }
}
