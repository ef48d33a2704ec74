use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use yig_s3_sdk::s3::ByteStream;

use crate::common::{SampleContext, show, with_clean_bucket};

const CHUNKS: [&str; 3] = ["yig1", "yig2", "yig3"];

pub async fn run(ctx: &SampleContext, files: &[PathBuf]) -> Result<()> {
    with_clean_bucket(ctx, "AppendObjectSample", || scenario(ctx, files)).await
}

async fn scenario(ctx: &SampleContext, files: &[PathBuf]) -> Result<()> {
    let s3 = &ctx.s3;
    let bucket = ctx.bucket.as_str();
    let key = ctx.key.as_str();

    s3.make_bucket(bucket).await?;

    // 1. Append strings to an object
    let mut next_pos = 0;
    for chunk in CHUNKS {
        show("Append string", chunk);
        next_pos = s3
            .append_object(bucket, key, chunk.as_bytes().to_vec(), next_pos)
            .await?;
    }
    let body = s3.get_object_bytes(bucket, key).await?;
    show("Get appended string", String::from_utf8_lossy(&body));

    // 2. Append files to the same object
    for file in files {
        show("Append file", file.display());
        let body = ByteStream::from_path(file)
            .await
            .with_context(|| format!("Failed to open {}", file.display()))?;
        next_pos = s3.append_object(bucket, key, body, next_pos).await?;
    }

    // 3. Ask the store where the next append goes
    next_pos = s3
        .get_object_next_append_position(bucket, key, next_pos)
        .await?;
    show("Next position", next_pos);

    // 4. Append with ACL and metadata
    let meta = HashMap::from([("a".to_string(), "b".to_string())]);
    for chunk in CHUNKS {
        show("Append string", chunk);
        next_pos = s3
            .append_object_with_acl_and_meta(
                bucket,
                key,
                chunk.as_bytes().to_vec(),
                next_pos,
                "public-read",
                meta.clone(),
            )
            .await?;
    }

    let head = s3.head_object(bucket, key).await?;
    show("Final length", head.content_length.unwrap_or_default());

    Ok(())
}
