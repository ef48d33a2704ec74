use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;
use tracing::debug;

use super::S3Client;
use super::error::Result;
use super::helpers::detect_content_type;

impl S3Client {
    /// Upload a local file as a single object
    ///
    /// The `Content-Type` is derived from the file extension and the length is
    /// sent explicitly. Returns the number of bytes uploaded.
    pub async fn put_object_from_path(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> Result<u64> {
        let file_size = tokio::fs::metadata(local_path).await?.len();

        // Create ByteStream from file
        let body = ByteStream::from_path(local_path).await?;

        debug!(
            "Uploading {} ({} bytes) -> s3://{}/{}",
            local_path.display(),
            file_size,
            bucket,
            key
        );

        self.client()
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_length(file_size as i64)
            .content_type(detect_content_type(local_path))
            .send()
            .await?;

        Ok(file_size)
    }
}
