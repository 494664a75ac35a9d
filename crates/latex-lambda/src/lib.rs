//! LaTeX compiler Lambda - pdflatex with S3 delivery
//!
//! This crate compiles a LaTeX document received in the request payload
//! and delivers the resulting PDF:
//!
//! - **Upload mode**: when a bucket is configured (`S3_BUCKET_NAME`),
//!   the PDF is uploaded under the requested filename.
//! - **Inline mode**: with no bucket configured, the PDF comes back
//!   base64-encoded in the response body with `application/pdf` and
//!   attachment headers.
//!
//! The compiler runs two fixed passes so cross-references (table of
//! contents, citations) resolve. Success is judged from the final
//! pass's exit status alone.
//!
//! ## Architecture
//!
//! ```text
//! API Gateway → Lambda (this) → pdflatex subprocess
//!                  ↓
//!               S3 bucket (optional)
//! ```
//!
//! ## Usage
//!
//! Deploy as an AWS Lambda function with API Gateway trigger.
//! See `main.rs` for the Lambda handler implementation.

pub mod compiler;
pub mod pipeline;
pub mod storage;
pub mod types;

pub use compiler::{LatexCompiler, PassOutput, Pdflatex};
pub use pipeline::{compile_and_deliver, PipelineError};
pub use storage::{ArtifactStore, S3Store, StorageError};
pub use types::{CompileRequest, Delivery, ValidationError, DEFAULT_OUTPUT_FILENAME};

use std::path::PathBuf;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration for the compile pipeline
///
/// Read once at startup and passed into the handler, rather than
/// consulted from the ambient environment inside the pipeline.
#[derive(Debug, Clone)]
pub struct LatexLambdaConfig {
    /// Delivery bucket; `None` switches to inline base64 delivery
    pub bucket: Option<String>,

    /// Invocation-local writable scratch area
    pub scratch_dir: PathBuf,

    /// pdflatex binary to invoke
    pub pdflatex_bin: PathBuf,
}

impl Default for LatexLambdaConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            scratch_dir: PathBuf::from("/tmp"),
            pdflatex_bin: PathBuf::from("pdflatex"),
        }
    }
}

impl LatexLambdaConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        Self {
            bucket: std::env::var("S3_BUCKET_NAME")
                .ok()
                .filter(|v| !v.is_empty()),
            scratch_dir: std::env::var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp")),
            pdflatex_bin: std::env::var("PDFLATEX_BIN")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("pdflatex")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LatexLambdaConfig::default();
        assert!(config.bucket.is_none());
        assert_eq!(config.scratch_dir, PathBuf::from("/tmp"));
        assert_eq!(config.pdflatex_bin, PathBuf::from("pdflatex"));
    }

    /// Regression test: Ensure we're using GA-level Lambda runtime (0.14+)
    #[test]
    fn test_lambda_runtime_version_is_ga() {
        // These types are used in main.rs and must be available
        fn _assert_types_exist() {
            let _: fn() -> lambda_http::Body = || lambda_http::Body::Empty;
            type _Request = lambda_http::Request;
            type _Response = lambda_http::Response<lambda_http::Body>;
        }
    }

    /// Regression test: AWS SDK client construction pattern
    /// Ensures we follow best practice of initializing the client once
    #[test]
    fn test_s3_store_is_clonable() {
        // S3Store must be Arc-wrapped for sharing across Lambda invocations
        fn _assert_store_clonable<T: Clone>() {}
        _assert_store_clonable::<std::sync::Arc<storage::S3Store>>();
    }

    /// Regression test: Tracing subscriber has CloudWatch-compatible methods
    /// - .json() - for structured logging
    /// - .with_ansi(false) - CloudWatch doesn't support ANSI colors
    /// - .with_current_span(false) - reduces duplicate info
    /// - .without_time() - CloudWatch adds its own timestamp
    #[test]
    fn test_tracing_cloudwatch_methods_exist() {
        fn _assert_cloudwatch_config_compiles() {
            use tracing_subscriber::fmt;

            let _ = fmt::fmt()
                .json()
                .with_ansi(false)
                .with_current_span(false)
                .without_time();
        }
    }

    /// Regression test: tracing-subscriber has required features enabled
    #[test]
    fn test_tracing_features_enabled() {
        // "json" must be enabled for .json(), "env-filter" for EnvFilter
        fn _assert_features() {
            use tracing_subscriber::EnvFilter;
            let _ = EnvFilter::from_default_env();
        }
    }
}
