use anyhow::{Context, Result};
use yig_s3_sdk::s3::{content_md5_hex, parse_metadata, trim_etag};

use crate::common::{SampleContext, show, with_clean_bucket};

const CONTENT: &[u8] = b"Hello from yig-s3-sdk!";

pub async fn run(ctx: &SampleContext, metadata: &str) -> Result<()> {
    with_clean_bucket(ctx, "ObjectSample", || scenario(ctx, metadata)).await
}

async fn scenario(ctx: &SampleContext, metadata: &str) -> Result<()> {
    let s3 = &ctx.s3;
    let bucket = ctx.bucket.as_str();
    let key = ctx.key.as_str();

    s3.make_bucket(bucket).await?;

    // 1. Plain put, then verify through HEAD that the ETag is the payload MD5
    s3.put_object(bucket, key, CONTENT.to_vec()).await?;
    let meta = s3.head_object(bucket, key).await?;
    let etag = meta.etag.as_deref().context("HEAD returned no ETag")?;
    show("ETag", etag);
    if trim_etag(etag) != content_md5_hex(CONTENT) {
        anyhow::bail!("ETag {} does not match local MD5", etag);
    }

    // 2. Full and ranged reads
    let body = s3.get_object_bytes(bucket, key).await?;
    show("Get object", String::from_utf8_lossy(&body));

    let ranged = s3.get_object_with_range(bucket, key, "bytes=0-4").await?;
    show("Content-Range", &ranged.content_range);

    // 3. Put with metadata
    let meta_key = format!("{}-meta", key);
    let metadata = parse_metadata(metadata);
    s3.put_object_with_meta(bucket, &meta_key, CONTENT.to_vec(), metadata.clone())
        .await?;
    let head = s3.head_object(bucket, &meta_key).await?;
    for (name, value) in &metadata {
        show(&format!("Metadata {}", name), head.metadata.get(name).unwrap_or(value));
    }

    // 4. Server-side copy
    let copy_key = format!("{}-copy", key);
    s3.copy_object(bucket, &format!("{}/{}", bucket, key), &copy_key)
        .await?;

    // 5. List, then delete one object and batch-delete the rest
    let page = s3.list_objects(bucket, "", "", 100, None).await?;
    show("Objects", page.keys.join(", "));

    s3.delete_object(bucket, &copy_key).await?;
    let deleted = s3.delete_objects(bucket, &[key, meta_key.as_str()]).await?;
    show("Batch deleted", deleted.join(", "));

    Ok(())
}
