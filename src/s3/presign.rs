use aws_sdk_s3::presigning::PresigningConfig;
use std::time::Duration;
use tracing::debug;

use super::S3Client;
use super::error::Result;

/// AWS presigned URL max is 7 days
pub const MAX_PRESIGN_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Presigning config with the expiry capped at [`MAX_PRESIGN_EXPIRY`]
fn presigning_config(expire: Duration) -> Result<PresigningConfig> {
    Ok(PresigningConfig::expires_in(expire.min(MAX_PRESIGN_EXPIRY))?)
}

impl S3Client {
    /// Presigned PUT URL bound to the length of `body`
    ///
    /// The body itself is not uploaded; its length is signed as
    /// `Content-Length`, so the URL only accepts a payload of that size.
    pub async fn put_object_presigned_with_body(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        expire: Duration,
    ) -> Result<String> {
        let presigned = self
            .client()
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(body.len() as i64)
            .presigned(presigning_config(expire)?)
            .await?;

        debug!("Presigned PUT for s3://{}/{} ({} bytes)", bucket, key, body.len());
        Ok(presigned.uri().to_string())
    }

    /// Presigned PUT URL accepting any payload
    pub async fn put_object_presigned(
        &self,
        bucket: &str,
        key: &str,
        expire: Duration,
    ) -> Result<String> {
        let presigned = self
            .client()
            .put_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning_config(expire)?)
            .await?;

        Ok(presigned.uri().to_string())
    }

    /// Generate a pre-signed GET URL
    ///
    /// # Notes
    ///
    /// AWS limits pre-signed URLs to a maximum of 7 days.
    /// Longer expirations are capped.
    pub async fn get_object_presigned(
        &self,
        bucket: &str,
        key: &str,
        expire: Duration,
    ) -> Result<String> {
        let presigned = self
            .client()
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning_config(expire)?)
            .await?;

        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> S3Client {
        S3Client::new("http://s3.test.com:8080", "hehehehe", "hehehehe")
    }

    #[tokio::test]
    async fn test_get_object_presigned() {
        let url = client()
            .get_object_presigned("bucket", "key", Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(url.starts_with("http://s3.test.com:8080/bucket/key?"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Credential=hehehehe"));
    }

    #[tokio::test]
    async fn test_put_object_presigned_caps_expiry() {
        let url = client()
            .put_object_presigned("bucket", "key", Duration::from_secs(30 * 24 * 60 * 60))
            .await
            .unwrap();

        assert!(url.contains("X-Amz-Expires=604800"));
    }

    #[tokio::test]
    async fn test_put_object_presigned_with_body() {
        let url = client()
            .put_object_presigned_with_body("bucket", "key", b"hello", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(url.starts_with("http://s3.test.com:8080/bucket/key?"));
        assert!(url.contains("X-Amz-Expires=60"));
        assert!(url.contains("X-Amz-SignedHeaders=content-length%3Bhost"));
    }

    #[tokio::test]
    async fn test_put_object_presigned_signs_only_host() {
        let url = client()
            .put_object_presigned("bucket", "key", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(url.contains("X-Amz-SignedHeaders=host"));
        assert!(!url.contains("content-length"));
    }
}
