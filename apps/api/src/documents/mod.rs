//! CV retrieval from object storage and plain-text extraction.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

/// Read-only access to uploaded documents by object key.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_text(&self, key: &str) -> Result<String, AppError>;
}

#[derive(Clone)]
pub struct S3DocumentSource {
    client: S3Client,
    bucket: String,
}

impl S3DocumentSource {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl DocumentSource for S3DocumentSource {
    async fn fetch_text(&self, key: &str) -> Result<String, AppError> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::DocumentUnavailable(format!(
                    "s3://{}/{key}: {}",
                    self.bucket,
                    DisplayErrorContext(&e)
                ))
            })?;

        let body: Bytes = object
            .body
            .collect()
            .await
            .map_err(|e| AppError::DocumentUnavailable(format!("reading {key}: {e}")))?
            .into_bytes();

        debug!("Fetched document {key} ({} bytes)", body.len());
        off_runtime(move || extract_text(&body)).await
    }
}

/// Runs CPU-bound extraction on the blocking pool. A panic inside `work`
/// surfaces as `DocumentUnavailable` instead of aborting the request.
async fn off_runtime<F>(work: F) -> Result<String, AppError>
where
    F: FnOnce() -> Result<String, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::DocumentUnavailable(format!("text extraction aborted: {e}")))?
}

/// PDFs go through `pdf-extract`; anything else is read as (lossy) UTF-8.
pub fn extract_text(bytes: &[u8]) -> Result<String, AppError> {
    if bytes.starts_with(b"%PDF") {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::DocumentUnavailable(format!("unreadable PDF: {e}")))
    } else {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
