//! Harness configuration and external-command construction.
//!
//! The directory conventions and tool locations mirror the layout the
//! codec project ships with: the codec binary lands in `build/`, the
//! benchmark corpus lives in `benchmark/`, optional generated inputs in
//! `generated/`, and all per-run artifacts go to the `tmp/` scratch
//! workspace.

use crate::process::CommandSpec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Directory the build step writes to.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
    /// Directory holding the primary `*.raw` corpus.
    #[serde(default = "default_benchmark_dir")]
    pub benchmark_dir: PathBuf,
    /// Directory holding the optional `*.bin` corpus.
    #[serde(default = "default_generated_dir")]
    pub generated_dir: PathBuf,
    /// Scratch workspace, wiped and recreated each run.
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: PathBuf,
    /// Path to the codec executable under test.
    #[serde(default = "default_codec")]
    pub codec: PathBuf,
    /// Path to the size-reporting tool.
    #[serde(default = "default_size_tool")]
    pub size_tool: PathBuf,
    /// Path to the raw-buffer-to-image renderer.
    #[serde(default = "default_renderer")]
    pub renderer: PathBuf,
    /// Build command, program first.
    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,
    /// Row width used when an input does not encode its own.
    #[serde(default = "default_width")]
    pub default_width: u32,
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_benchmark_dir() -> PathBuf {
    PathBuf::from("benchmark")
}

fn default_generated_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_tmp_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_codec() -> PathBuf {
    default_build_dir().join("lz_codec")
}

fn default_size_tool() -> PathBuf {
    PathBuf::from("./size")
}

fn default_renderer() -> PathBuf {
    PathBuf::from("./convert")
}

fn default_build_command() -> Vec<String> {
    vec!["make".to_string(), "-B".to_string(), "-j4".to_string()]
}

fn default_width() -> u32 {
    512
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
            benchmark_dir: default_benchmark_dir(),
            generated_dir: default_generated_dir(),
            tmp_dir: default_tmp_dir(),
            codec: default_codec(),
            size_tool: default_size_tool(),
            renderer: default_renderer(),
            build_command: default_build_command(),
            default_width: default_width(),
        }
    }
}

impl HarnessConfig {
    /// Creates a configuration with the stock directory conventions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the codec executable path.
    #[must_use]
    pub fn with_codec(mut self, codec: impl Into<PathBuf>) -> Self {
        self.codec = codec.into();
        self
    }

    /// Sets the size-reporting tool path.
    #[must_use]
    pub fn with_size_tool(mut self, size_tool: impl Into<PathBuf>) -> Self {
        self.size_tool = size_tool.into();
        self
    }

    /// Sets the renderer path.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl Into<PathBuf>) -> Self {
        self.renderer = renderer.into();
        self
    }

    /// Sets the build command, program first.
    #[must_use]
    pub fn with_build_command(mut self, command: Vec<String>) -> Self {
        self.build_command = command;
        self
    }

    /// Sets the fallback row width.
    #[must_use]
    pub fn with_default_width(mut self, width: u32) -> Self {
        self.default_width = width;
        self
    }

    /// Re-roots every directory and tool path under `root`.
    ///
    /// Used by tests and by runs driven from outside the codec checkout.
    #[must_use]
    pub fn rooted_at(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        self.build_dir = root.join(&self.build_dir);
        self.benchmark_dir = root.join(&self.benchmark_dir);
        self.generated_dir = root.join(&self.generated_dir);
        self.tmp_dir = root.join(&self.tmp_dir);
        self.codec = root.join(&self.codec);
        self.size_tool = root.join(&self.size_tool);
        self.renderer = root.join(&self.renderer);
        self
    }

    /// The build invocation, `make -B -j4` unless overridden.
    #[must_use]
    pub fn build_command_spec(&self) -> CommandSpec {
        let mut parts = self.build_command.iter();
        let program = parts
            .next()
            .cloned()
            .unwrap_or_else(|| "make".to_string());
        CommandSpec::new(program).args(parts.cloned())
    }

    /// Encode invocation: `<codec> -c -i <input> -o <encoded> -w <width> -a`.
    #[must_use]
    pub fn compress_command(&self, input: &Path, encoded: &Path, width: u32) -> CommandSpec {
        CommandSpec::new(self.codec.display().to_string())
            .arg("-c")
            .arg("-i")
            .arg(input.display().to_string())
            .arg("-o")
            .arg(encoded.display().to_string())
            .arg("-w")
            .arg(width.to_string())
            .arg("-a")
    }

    /// Decode invocation: `<codec> -d -i <encoded> -o <decoded> -a`.
    #[must_use]
    pub fn decompress_command(&self, encoded: &Path, decoded: &Path) -> CommandSpec {
        CommandSpec::new(self.codec.display().to_string())
            .arg("-d")
            .arg("-i")
            .arg(encoded.display().to_string())
            .arg("-o")
            .arg(decoded.display().to_string())
            .arg("-a")
    }

    /// Size-report invocation: `<size-tool> <path>`.
    #[must_use]
    pub fn size_command(&self, path: &Path) -> CommandSpec {
        CommandSpec::new(self.size_tool.display().to_string()).arg(path.display().to_string())
    }

    /// Render invocation: `<renderer> <raw> <width> -o <image>`.
    #[must_use]
    pub fn render_command(&self, raw: &Path, width: u32, image: &Path) -> CommandSpec {
        CommandSpec::new(self.renderer.display().to_string())
            .arg(raw.display().to_string())
            .arg(width.to_string())
            .arg("-o")
            .arg(image.display().to_string())
    }
}
