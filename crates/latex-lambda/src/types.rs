//! Request and response structures for the compile API

use serde::{Deserialize, Serialize};

/// Default name for the produced PDF when the caller doesn't supply one.
pub const DEFAULT_OUTPUT_FILENAME: &str = "output.pdf";

/// Request to compile a LaTeX document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Raw LaTeX source. Passed verbatim to pdflatex; no syntax
    /// validation happens before the compiler runs.
    pub latex_source: String,

    /// Name for the produced PDF (S3 key or attachment filename)
    #[serde(default = "default_output_filename")]
    pub output_filename: String,
}

fn default_output_filename() -> String {
    DEFAULT_OUTPUT_FILENAME.to_string()
}

impl CompileRequest {
    /// Create a request with the default output filename
    pub fn new(latex_source: &str) -> Self {
        Self {
            latex_source: latex_source.to_string(),
            output_filename: default_output_filename(),
        }
    }

    /// Override the output filename
    pub fn with_output_filename(mut self, filename: &str) -> Self {
        self.output_filename = filename.to_string();
        self
    }

    /// Validate the request
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.latex_source.is_empty() {
            return Err(ValidationError::MissingField("latex_source"));
        }
        Ok(())
    }
}

/// Where the compiled PDF ended up
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "delivery", rename_all = "snake_case")]
pub enum Delivery {
    /// Uploaded to the configured S3 bucket
    Uploaded { bucket: String, key: String },

    /// Returned inline, base64-encoded
    Inline {
        data_base64: String,
        filename: String,
    },
}

/// Validation error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn output_filename_defaults_when_omitted() {
        let request: CompileRequest =
            serde_json::from_str(r#"{"latex_source": "\\documentclass{article}"}"#).unwrap();
        assert_eq!(request.output_filename, "output.pdf");
    }

    #[test]
    fn output_filename_passes_through_literally() {
        let request: CompileRequest = serde_json::from_str(
            r#"{"latex_source": "x", "output_filename": "thesis-final (2).pdf"}"#,
        )
        .unwrap();
        assert_eq!(request.output_filename, "thesis-final (2).pdf");
    }

    #[test]
    fn empty_source_fails_validation() {
        let request = CompileRequest::new("");
        assert!(matches!(
            request.validate(),
            Err(ValidationError::MissingField("latex_source"))
        ));
    }

    #[test]
    fn missing_source_fails_to_parse() {
        let result = serde_json::from_str::<CompileRequest>(r#"{"output_filename": "a.pdf"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn delivery_serializes_tagged() {
        let delivery = Delivery::Uploaded {
            bucket: "docs".to_string(),
            key: "output.pdf".to_string(),
        };
        let json = serde_json::to_value(&delivery).unwrap();
        assert_eq!(json["delivery"], "uploaded");
        assert_eq!(json["bucket"], "docs");
    }
}
