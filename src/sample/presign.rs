use anyhow::{Context, Result};
use std::time::Duration;

use crate::common::{SampleContext, show, with_clean_bucket};

const CONTENT: &[u8] = b"uploaded through a presigned URL";

pub async fn run(ctx: &SampleContext, expiry_secs: u64) -> Result<()> {
    with_clean_bucket(ctx, "PresignedUrlSample", || scenario(ctx, expiry_secs)).await
}

async fn scenario(ctx: &SampleContext, expiry_secs: u64) -> Result<()> {
    let s3 = &ctx.s3;
    let bucket = ctx.bucket.as_str();
    let key = ctx.key.as_str();
    let expire = Duration::from_secs(expiry_secs);
    let http = reqwest::Client::new();

    s3.make_bucket(bucket).await?;

    // 1. PUT URL bound to the payload length
    let url = s3
        .put_object_presigned_with_body(bucket, key, CONTENT, expire)
        .await?;
    show("PUT (with body) URL", &url);
    http.put(&url)
        .body(CONTENT.to_vec())
        .send()
        .await?
        .error_for_status()
        .context("Presigned PUT with body was rejected")?;

    // 2. GET URL
    let url = s3.get_object_presigned(bucket, key, expire).await?;
    show("GET URL", &url);
    let body = http
        .get(&url)
        .send()
        .await?
        .error_for_status()
        .context("Presigned GET was rejected")?
        .bytes()
        .await?;
    if &body[..] != CONTENT {
        anyhow::bail!("Presigned GET returned different content");
    }

    // 3. PUT URL without a known body
    let other_key = format!("{}-unsized", key);
    let url = s3.put_object_presigned(bucket, &other_key, expire).await?;
    show("PUT URL", &url);
    http.put(&url)
        .body("any payload")
        .send()
        .await?
        .error_for_status()
        .context("Presigned PUT was rejected")?;

    Ok(())
}
