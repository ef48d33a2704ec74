use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use bytes::Bytes;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::S3Client;
use super::error::{Result, S3Error};

/// Object attributes returned by a HEAD request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMeta {
    pub content_length: Option<i64>,
    pub etag: Option<String>,
    pub content_type: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// Result of a ranged GET
#[derive(Debug)]
pub struct RangedObject {
    /// `Content-Range` header, e.g. `bytes 0-9/443`
    pub content_range: String,
    pub body: ByteStream,
}

/// One page of a ListObjects call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsPage {
    /// Common prefixes first, then object keys, in server order
    pub keys: Vec<String>,
    pub is_truncated: bool,
    pub next_marker: Option<String>,
}

impl S3Client {
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: impl Into<ByteStream>,
    ) -> Result<()> {
        debug!("PutObject s3://{}/{}", bucket, key);

        self.client()
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body.into())
            .send()
            .await?;

        Ok(())
    }

    /// Upload an object with user metadata; each entry is sent as `x-amz-meta-<name>`
    pub async fn put_object_with_meta(
        &self,
        bucket: &str,
        key: &str,
        body: impl Into<ByteStream>,
        meta: HashMap<String, String>,
    ) -> Result<()> {
        debug!(
            "PutObject s3://{}/{} with {} metadata entries",
            bucket,
            key,
            meta.len()
        );

        self.client()
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body.into())
            .set_metadata(Some(meta))
            .send()
            .await?;

        Ok(())
    }

    pub async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMeta> {
        let out = self
            .client()
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;

        Ok(ObjectMeta {
            content_length: out.content_length,
            etag: out.e_tag,
            content_type: out.content_type,
            metadata: out.metadata.unwrap_or_default(),
        })
    }

    /// Fetch an object; the caller drains the returned stream
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteStream> {
        let out = self
            .client()
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;

        Ok(out.body)
    }

    /// Fetch an object and collect its body in memory
    pub async fn get_object_bytes(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let body = self.get_object(bucket, key).await?;
        Ok(body.collect().await?.into_bytes())
    }

    /// GET with a raw `Range` header value such as `bytes=0-9`
    pub async fn get_object_with_range(
        &self,
        bucket: &str,
        key: &str,
        range: &str,
    ) -> Result<RangedObject> {
        let out = self
            .client()
            .get_object()
            .bucket(bucket)
            .key(key)
            .range(range)
            .send()
            .await?;

        let content_range = out
            .content_range
            .ok_or_else(|| S3Error::missing("GetObject", "Content-Range"))?;

        Ok(RangedObject {
            content_range,
            body: out.body,
        })
    }

    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        debug!("DeleteObject s3://{}/{}", bucket, key);

        self.client()
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;

        Ok(())
    }

    /// Batch delete; returns the keys the server reports as deleted
    pub async fn delete_objects<S: AsRef<str>>(
        &self,
        bucket: &str,
        keys: &[S],
    ) -> Result<Vec<String>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key.as_ref()).build())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let delete = Delete::builder().set_objects(Some(objects)).build()?;

        let out = self
            .client()
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await?;

        for failed in out.errors() {
            warn!(
                "Failed to delete s3://{}/{}: {} {}",
                bucket,
                failed.key().unwrap_or_default(),
                failed.code().unwrap_or_default(),
                failed.message().unwrap_or_default()
            );
        }

        Ok(out
            .deleted
            .unwrap_or_default()
            .into_iter()
            .filter_map(|deleted| deleted.key)
            .collect())
    }

    /// Server-side copy; `copy_source` is `source-bucket/source-key`
    pub async fn copy_object(
        &self,
        destination_bucket: &str,
        copy_source: &str,
        key: &str,
    ) -> Result<()> {
        debug!(
            "CopyObject {} -> s3://{}/{}",
            copy_source, destination_bucket, key
        );

        self.client()
            .copy_object()
            .bucket(destination_bucket)
            .copy_source(copy_source)
            .key(key)
            .send()
            .await?;

        Ok(())
    }

    /// One ListObjects (v1) page; empty `prefix`/`delimiter` are omitted
    pub async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
        max_keys: i32,
        marker: Option<&str>,
    ) -> Result<ListObjectsPage> {
        let out = self
            .client()
            .list_objects()
            .bucket(bucket)
            .max_keys(max_keys)
            .set_prefix(non_empty(prefix))
            .set_delimiter(non_empty(delimiter))
            .set_marker(marker.map(str::to_string))
            .send()
            .await?;

        let mut keys = Vec::new();
        for prefix in out.common_prefixes.unwrap_or_default() {
            if let Some(prefix) = prefix.prefix {
                debug!("Prefix: {}", prefix);
                keys.push(prefix);
            }
        }
        for object in out.contents.unwrap_or_default() {
            if let Some(key) = object.key {
                debug!("Key: {}", key);
                keys.push(key);
            }
        }

        Ok(ListObjectsPage {
            keys,
            is_truncated: out.is_truncated.unwrap_or(false),
            next_marker: out.next_marker,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
