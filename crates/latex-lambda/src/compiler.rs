//! pdflatex subprocess wrapper
//!
//! One `run_pass` call is a single compiler invocation; the fixed
//! two-pass loop that resolves cross-references lives in the pipeline.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

/// Outcome of a single compiler pass
#[derive(Debug, Clone)]
pub struct PassOutput {
    /// True when the process exited with status zero
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// A LaTeX compiler that can be substituted in tests
#[async_trait]
pub trait LatexCompiler: Send + Sync {
    /// Run one compiler pass over the given `.tex` file, blocking until
    /// the process exits.
    async fn run_pass(&self, tex_path: &Path) -> std::io::Result<PassOutput>;
}

/// The real pdflatex toolchain
pub struct Pdflatex {
    binary: PathBuf,
    output_dir: PathBuf,
}

impl Pdflatex {
    pub fn new(binary: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Arguments for a non-interactive pass writing into the scratch dir
    fn args(&self, tex_path: &Path) -> Vec<std::ffi::OsString> {
        vec![
            "-interaction=nonstopmode".into(),
            "-halt-on-error".into(),
            "-file-line-error".into(),
            format!("-output-directory={}", self.output_dir.display()).into(),
            tex_path.as_os_str().to_os_string(),
        ]
    }
}

#[async_trait]
impl LatexCompiler for Pdflatex {
    async fn run_pass(&self, tex_path: &Path) -> std::io::Result<PassOutput> {
        let output = Command::new(&self.binary)
            .args(self.args(tex_path))
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        info!(
            exit = ?output.status.code(),
            stdout_head = head(&stdout, 1000),
            stderr_head = head(&stderr, 500),
            "pdflatex pass finished"
        );

        Ok(PassOutput {
            success: output.status.success(),
            stdout,
            stderr,
        })
    }
}

/// First `limit` chars of compiler output, for log lines
fn head(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
