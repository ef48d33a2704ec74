use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use yig_s3_sdk::s3::{PART_SIZE, completed_upload};

use crate::common::{SampleContext, show, with_clean_bucket};

pub async fn run(ctx: &SampleContext, file: Option<&Path>) -> Result<()> {
    with_clean_bucket(ctx, "MultiPartUploadSample", || scenario(ctx, file)).await
}

async fn scenario(ctx: &SampleContext, file: Option<&Path>) -> Result<()> {
    let s3 = &ctx.s3;
    let bucket = ctx.bucket.as_str();
    let key = ctx.key.as_str();

    s3.make_bucket(bucket).await?;

    // 1. Explicit lifecycle: every part but the last must be at least 5MB
    let upload_id = s3.create_multipart_upload(bucket, key, "STANDARD").await?;
    show("Upload id", &upload_id);

    let chunks = [vec![b'a'; PART_SIZE], b"tail of the object".to_vec()];
    let mut parts = Vec::new();
    for (index, chunk) in chunks.into_iter().enumerate() {
        let part_number = index as i32 + 1;
        let etag = s3
            .upload_part(bucket, key, part_number, &upload_id, chunk)
            .await?;
        show(&format!("Part {}", part_number), &etag);
        parts.push((part_number, etag));
    }

    let listed = s3.list_parts(bucket, key, &upload_id).await?;
    show("Listed parts", listed.len());

    s3.complete_multipart_upload(bucket, key, completed_upload(&parts), &upload_id)
        .await?;
    let head = s3.head_object(bucket, key).await?;
    show("Object length", head.content_length.unwrap_or_default());

    // 2. Abort an upload that never completes
    let aborted_key = format!("{}-aborted", key);
    let upload_id = s3
        .create_multipart_upload(bucket, &aborted_key, "STANDARD")
        .await?;
    s3.upload_part(bucket, &aborted_key, 1, &upload_id, b"discarded".to_vec())
        .await?;
    s3.abort_multipart_upload(bucket, &aborted_key, &upload_id)
        .await?;
    show("Aborted", &upload_id);

    // 3. Whole-file helper with progress
    if let Some(path) = file {
        let file_key = format!("{}-file", key);
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")?
                .progress_chars("#>-"),
        );
        s3.upload_file_multipart(bucket, &file_key, path, Some(&pb))
            .await?;
    }

    Ok(())
}
