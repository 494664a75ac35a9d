//! Compile-and-deliver pipeline
//!
//! The whole request lifecycle: validate, write the source to scratch,
//! run pdflatex twice, then upload to S3 or return the PDF inline.

use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::compiler::LatexCompiler;
use crate::storage::ArtifactStore;
use crate::types::{CompileRequest, Delivery, ValidationError};
use crate::LatexLambdaConfig;

/// How many chars of the pdflatex `.log` to log on failure
const LOG_TAIL_CHARS: usize = 2000;

/// Pipeline failure taxonomy
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("LaTeX compilation error: {diagnostics}")]
    Compilation { diagnostics: String },

    #[error("Error uploading to S3: {0}")]
    Upload(String),

    #[error("Unexpected error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Internal(e.to_string())
    }
}

/// Compile the request's LaTeX source and deliver the resulting PDF.
///
/// The compiler runs exactly twice regardless of the first pass's
/// outcome; the second pass resolves cross-references (table of
/// contents, citations). Only the final pass's exit status and stderr
/// decide the result. Scratch files are named with a per-invocation
/// UUID so a pass can never pick up an artifact from an earlier
/// invocation; nothing is cleaned up, the platform reclaims scratch
/// storage.
#[instrument(skip_all, fields(output_filename = %request.output_filename))]
pub async fn compile_and_deliver(
    request: &CompileRequest,
    config: &LatexLambdaConfig,
    compiler: &dyn LatexCompiler,
    store: &dyn ArtifactStore,
) -> Result<Delivery, PipelineError> {
    request.validate()?;

    let base = format!("document_{}", Uuid::new_v4());
    let tex_path = config.scratch_dir.join(format!("{base}.tex"));
    let pdf_path = config.scratch_dir.join(format!("{base}.pdf"));

    tokio::fs::write(&tex_path, &request.latex_source).await?;

    // Two fixed passes; the first pass's diagnostics are discarded
    let _first = compiler.run_pass(&tex_path).await?;
    let last = compiler.run_pass(&tex_path).await?;

    if !last.success {
        log_compile_failure(config.scratch_dir.join(format!("{base}.log"))).await;
        return Err(PipelineError::Compilation {
            diagnostics: last.stderr,
        });
    }

    match &config.bucket {
        Some(bucket) => {
            store
                .upload(&pdf_path, bucket, &request.output_filename)
                .await
                .map_err(|e| PipelineError::Upload(e.to_string()))?;
            Ok(Delivery::Uploaded {
                bucket: bucket.clone(),
                key: request.output_filename.clone(),
            })
        }
        None => {
            let bytes = tokio::fs::read(&pdf_path).await?;
            info!(size = bytes.len(), "Returning compiled PDF inline");
            Ok(Delivery::Inline {
                data_base64: BASE64.encode(&bytes),
                filename: request.output_filename.clone(),
            })
        }
    }
}

/// Log the tail of the pdflatex log file, when one was written
async fn log_compile_failure(log_path: PathBuf) {
    if let Ok(bytes) = tokio::fs::read(&log_path).await {
        let text = String::from_utf8_lossy(&bytes);
        let tail_start = text
            .char_indices()
            .rev()
            .nth(LOG_TAIL_CHARS - 1)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        error!(log_tail = &text[tail_start..], "LaTeX compilation failed");
    } else {
        error!(log_path = %log_path.display(), "LaTeX compilation failed, no log file");
    }
}
