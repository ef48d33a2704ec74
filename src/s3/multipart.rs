use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart, Part, StorageClass};
use indicatif::ProgressBar;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use super::S3Client;
use super::error::{Result, S3Error};

// Size of each part (10MB) - AWS minimum is 5MB
pub const PART_SIZE: usize = 10 * 1024 * 1024;

impl S3Client {
    /// Start a multipart upload and return its upload id
    pub async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        storage_class: &str,
    ) -> Result<String> {
        let out = self
            .client()
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .storage_class(StorageClass::from(storage_class))
            .send()
            .await?;

        let upload_id = out
            .upload_id
            .ok_or_else(|| S3Error::missing("CreateMultipartUpload", "UploadId"))?;

        debug!("Multipart upload initiated with ID: {}", upload_id);
        Ok(upload_id)
    }

    /// Upload one part and return its ETag
    pub async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        part_number: i32,
        upload_id: &str,
        value: impl Into<ByteStream>,
    ) -> Result<String> {
        let out = self
            .client()
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(value.into())
            .send()
            .await?;

        out.e_tag
            .ok_or_else(|| S3Error::missing("UploadPart", "ETag"))
    }

    /// Parts the server holds for an in-progress upload
    pub async fn list_parts(&self, bucket: &str, key: &str, upload_id: &str) -> Result<Vec<Part>> {
        let out = self
            .client()
            .list_parts()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await?;

        Ok(out.parts.unwrap_or_default())
    }

    /// Abort a multipart upload and discard the uploaded parts
    pub async fn abort_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<()> {
        self.client()
            .abort_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await?;

        debug!("Aborted multipart upload {}", upload_id);
        Ok(())
    }

    pub async fn complete_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        completed: CompletedMultipartUpload,
        upload_id: &str,
    ) -> Result<()> {
        self.client()
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(completed)
            .send()
            .await?;

        Ok(())
    }

    /// Upload a local file in [`PART_SIZE`] parts
    ///
    /// Parts are sent in order. If any part or the completion fails the
    /// upload is aborted and that error is returned.
    pub async fn upload_file_multipart(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
        pb: Option<&ProgressBar>,
    ) -> Result<()> {
        let file_size = tokio::fs::metadata(local_path).await?.len();
        let mut file = tokio::fs::File::open(local_path).await?;

        info!(
            "Starting multipart upload for {} ({} bytes, {} parts)",
            local_path.display(),
            file_size,
            (file_size as usize).div_ceil(PART_SIZE)
        );

        let upload_id = self.create_multipart_upload(bucket, key, "STANDARD").await?;

        if let Some(pb) = pb {
            pb.set_length(file_size);
            pb.set_position(0);
            pb.set_message(format!("Multipart upload {}", local_path.display()));
        }

        if let Err(e) = self
            .upload_and_complete(&mut file, bucket, key, &upload_id, pb)
            .await
        {
            if let Err(abort_err) = self.abort_multipart_upload(bucket, key, &upload_id).await {
                warn!("Failed to abort multipart upload {}: {}", upload_id, abort_err);
            }
            return Err(e);
        }

        if let Some(pb) = pb {
            pb.finish_with_message(format!("✓ {}", local_path.display()));
        }

        info!(
            "Successfully completed multipart upload: {} -> s3://{}/{}",
            local_path.display(),
            bucket,
            key
        );

        Ok(())
    }

    async fn upload_and_complete(
        &self,
        file: &mut tokio::fs::File,
        bucket: &str,
        key: &str,
        upload_id: &str,
        pb: Option<&ProgressBar>,
    ) -> Result<()> {
        let parts = self
            .upload_parts_from(file, bucket, key, upload_id, pb)
            .await?;

        debug!(
            "All {} parts uploaded, completing multipart upload",
            parts.len()
        );

        self.complete_multipart_upload(bucket, key, completed_upload(&parts), upload_id)
            .await
    }

    async fn upload_parts_from(
        &self,
        file: &mut tokio::fs::File,
        bucket: &str,
        key: &str,
        upload_id: &str,
        pb: Option<&ProgressBar>,
    ) -> Result<Vec<(i32, String)>> {
        let mut parts = Vec::new();
        let mut part_number = 1i32;
        let mut uploaded_bytes = 0u64;

        loop {
            let buffer = read_part(file).await?;
            // An empty file is still completed from one empty part.
            if buffer.is_empty() && !parts.is_empty() {
                break; // EOF
            }

            let len = buffer.len();
            debug!("Uploading part {} ({} bytes)", part_number, len);

            let etag = self
                .upload_part(bucket, key, part_number, upload_id, buffer)
                .await?;
            parts.push((part_number, etag));

            uploaded_bytes += len as u64;
            if let Some(pb) = pb {
                pb.set_position(uploaded_bytes);
            }

            part_number += 1;
        }

        Ok(parts)
    }
}

/// Assemble the completion manifest from `(part number, ETag)` pairs
pub fn completed_upload(parts: &[(i32, String)]) -> CompletedMultipartUpload {
    let parts = parts
        .iter()
        .map(|(number, etag)| {
            CompletedPart::builder()
                .part_number(*number)
                .e_tag(etag)
                .build()
        })
        .collect();

    CompletedMultipartUpload::builder()
        .set_parts(Some(parts))
        .build()
}

// A single read may return less than requested, so fill until full or EOF.
async fn read_part(file: &mut tokio::fs::File) -> std::io::Result<Vec<u8>> {
    let mut buffer = vec![0u8; PART_SIZE];
    let mut filled = 0;

    while filled < PART_SIZE {
        let n = file.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    buffer.truncate(filled);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s3::test_util::{body_text, ok, replay_client, response};
    use std::io::Write;

    const INITIATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<InitiateMultipartUploadResult><Bucket>bucket</Bucket><Key>big</Key><UploadId>upload-1</UploadId></InitiateMultipartUploadResult>"#;

    const COMPLETE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CompleteMultipartUploadResult><Bucket>bucket</Bucket><Key>big</Key><ETag>"final-2"</ETag></CompleteMultipartUploadResult>"#;

    #[tokio::test]
    async fn test_create_multipart_upload_returns_id() {
        let (s3, replay) = replay_client(vec![response(200, &[], INITIATE)]);

        let upload_id = s3
            .create_multipart_upload("bucket", "big", "STANDARD_IA")
            .await
            .unwrap();

        assert_eq!(upload_id, "upload-1");
        let request = replay.actual_requests().next().unwrap();
        assert_eq!(request.method(), "POST");
        assert!(request.uri().contains("uploads"));
        assert_eq!(
            request.headers().get("x-amz-storage-class"),
            Some("STANDARD_IA")
        );
    }

    #[tokio::test]
    async fn test_upload_part_returns_etag() {
        let (s3, replay) = replay_client(vec![response(200, &[("etag", "\"part-1\"")], "")]);

        let etag = s3
            .upload_part("bucket", "big", 3, "upload-1", b"chunk".to_vec())
            .await
            .unwrap();

        assert_eq!(etag, "\"part-1\"");
        let request = replay.actual_requests().next().unwrap();
        assert_eq!(request.method(), "PUT");
        assert!(request.uri().contains("partNumber=3"));
        assert!(request.uri().contains("uploadId=upload-1"));
    }

    #[tokio::test]
    async fn test_upload_part_without_etag_is_error() {
        let (s3, _replay) = replay_client(vec![ok()]);

        let err = s3
            .upload_part("bucket", "big", 1, "upload-1", b"chunk".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, S3Error::MissingField { field: "ETag", .. }));
    }

    #[tokio::test]
    async fn test_list_parts() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListPartsResult>
  <Bucket>bucket</Bucket><Key>big</Key><UploadId>upload-1</UploadId>
  <IsTruncated>false</IsTruncated>
  <Part><PartNumber>1</PartNumber><ETag>"p1"</ETag><Size>5242880</Size></Part>
  <Part><PartNumber>2</PartNumber><ETag>"p2"</ETag><Size>12</Size></Part>
</ListPartsResult>"#;
        let (s3, replay) = replay_client(vec![response(200, &[], body)]);

        let parts = s3.list_parts("bucket", "big", "upload-1").await.unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].part_number(), Some(1));
        assert_eq!(parts[1].e_tag(), Some("\"p2\""));
        assert_eq!(parts[1].size(), Some(12));

        let request = replay.actual_requests().next().unwrap();
        assert_eq!(request.method(), "GET");
        assert!(request.uri().contains("uploadId=upload-1"));
    }

    #[tokio::test]
    async fn test_complete_multipart_upload_sends_manifest() {
        let (s3, replay) = replay_client(vec![response(200, &[], COMPLETE)]);
        let completed = completed_upload(&[
            (1, "\"p1\"".to_string()),
            (2, "\"p2\"".to_string()),
        ]);

        s3.complete_multipart_upload("bucket", "big", completed, "upload-1")
            .await
            .unwrap();

        let request = replay.actual_requests().next().unwrap();
        assert_eq!(request.method(), "POST");
        let sent = body_text(request.body());
        assert!(sent.contains("<PartNumber>1</PartNumber>"));
        assert!(sent.contains("<PartNumber>2</PartNumber>"));
        assert!(sent.contains("p2"));
    }

    #[tokio::test]
    async fn test_abort_multipart_upload() {
        let (s3, replay) = replay_client(vec![response(204, &[], "")]);

        s3.abort_multipart_upload("bucket", "big", "upload-1")
            .await
            .unwrap();

        let request = replay.actual_requests().next().unwrap();
        assert_eq!(request.method(), "DELETE");
        assert!(request.uri().contains("uploadId=upload-1"));
    }

    #[tokio::test]
    async fn test_upload_file_multipart_small_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"0123456789").unwrap();

        let (s3, replay) = replay_client(vec![
            response(200, &[], INITIATE),
            response(200, &[("etag", "\"p1\"")], ""),
            response(200, &[], COMPLETE),
        ]);

        s3.upload_file_multipart("bucket", "big", file.path(), None)
            .await
            .unwrap();

        let methods: Vec<_> = replay
            .actual_requests()
            .map(|r| r.method().to_string())
            .collect();
        assert_eq!(methods, vec!["POST", "PUT", "POST"]);
    }

    #[tokio::test]
    async fn test_upload_file_multipart_aborts_on_part_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"0123456789").unwrap();

        let denied = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>"#;
        let (s3, replay) = replay_client(vec![
            response(200, &[], INITIATE),
            response(403, &[], denied),
            response(204, &[], ""),
        ]);

        let err = s3
            .upload_file_multipart("bucket", "big", file.path(), None)
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some("AccessDenied"));
        let last = replay.actual_requests().last().unwrap();
        assert_eq!(last.method(), "DELETE");
        assert!(last.uri().contains("uploadId=upload-1"));
    }

    #[tokio::test]
    async fn test_upload_file_multipart_empty_file_sends_one_part() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let (s3, replay) = replay_client(vec![
            response(200, &[], INITIATE),
            response(200, &[("etag", "\"empty\"")], ""),
            response(200, &[], COMPLETE),
        ]);

        s3.upload_file_multipart("bucket", "big", file.path(), None)
            .await
            .unwrap();

        let requests: Vec<_> = replay.actual_requests().collect();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].method(), "PUT");
        assert!(requests[1].uri().contains("partNumber=1"));
        assert_eq!(body_text(requests[1].body()), "");
        let manifest = body_text(requests[2].body());
        assert!(manifest.contains("<PartNumber>1</PartNumber>"));
        assert!(manifest.contains("empty"));
    }

    #[tokio::test]
    async fn test_upload_file_multipart_aborts_on_complete_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"0123456789").unwrap();

        let malformed = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>MalformedXML</Code><Message>The XML you provided was not well-formed</Message></Error>"#;
        let (s3, replay) = replay_client(vec![
            response(200, &[], INITIATE),
            response(200, &[("etag", "\"p1\"")], ""),
            response(400, &[], malformed),
            response(204, &[], ""),
        ]);

        let err = s3
            .upload_file_multipart("bucket", "big", file.path(), None)
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some("MalformedXML"));
        let methods: Vec<_> = replay
            .actual_requests()
            .map(|r| r.method().to_string())
            .collect();
        assert_eq!(methods, vec!["POST", "PUT", "POST", "DELETE"]);
        let last = replay.actual_requests().last().unwrap();
        assert!(last.uri().contains("uploadId=upload-1"));
    }
}
