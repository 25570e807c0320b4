//! Upload collaborator — optional S3-compatible blob storage for originals.
//!
//! Failure here is non-fatal to the extraction response: callers log the error
//! and omit the reference URL from the output.

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::document::DocumentFormat;

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
pub async fn build_s3_client(storage: &StorageConfig) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &storage.access_key_id,
        &storage.secret_access_key,
        None,
        None,
        "resume-extractor-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&storage.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}

/// Uploads the original file under `resumes/{uuid}/{filename}` and returns a
/// reference URL into the configured bucket.
pub async fn send(
    s3: &aws_sdk_s3::Client,
    storage: &StorageConfig,
    bytes: Bytes,
    filename: &str,
    format: DocumentFormat,
) -> Result<String> {
    let key = format!("resumes/{}/{}", Uuid::new_v4(), filename);
    let content_type = match format {
        DocumentFormat::Pdf => "application/pdf",
        DocumentFormat::Docx => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
    };

    s3.put_object()
        .bucket(&storage.bucket)
        .key(&key)
        .body(ByteStream::from(bytes.to_vec()))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

    info!("Uploaded original to s3://{}/{}", storage.bucket, key);

    Ok(format!(
        "{}/{}/{}",
        storage.endpoint.trim_end_matches('/'),
        storage.bucket,
        key
    ))
}
