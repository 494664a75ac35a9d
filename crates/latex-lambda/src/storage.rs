//! S3 artifact delivery
//!
//! Uploads the compiled PDF to the configured bucket. Credential and
//! connectivity problems surface as `StorageError`, never panics.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::{error, info, instrument};

/// Destination for compiled artifacts
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Upload a local file to `bucket` under `key`
    async fn upload(&self, local_path: &Path, bucket: &str, key: &str)
        -> Result<(), StorageError>;
}

/// S3-backed artifact store
pub struct S3Store {
    client: S3Client,
}

impl S3Store {
    /// Build a store from the default AWS credential provider chain
    pub async fn new() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: S3Client::new(&config),
        }
    }

    /// Create with an existing client (for testing against localstack)
    pub fn with_client(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactStore for S3Store {
    #[instrument(skip(self))]
    async fn upload(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::ReadArtifact(e.to_string()))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("application/pdf")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, bucket = %bucket, key = %key, "S3 upload failed");
                StorageError::UploadFailed(e.to_string())
            })?;

        info!(bucket = %bucket, key = %key, "Uploaded compiled PDF");
        Ok(())
    }
}

/// Artifact delivery errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read compiled artifact: {0}")]
    ReadArtifact(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),
}
