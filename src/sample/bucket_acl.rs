use anyhow::Result;
use yig_s3_sdk::s3::BucketCannedAcl;

use crate::common::{SampleContext, show, with_clean_bucket};

pub async fn run(ctx: &SampleContext) -> Result<()> {
    with_clean_bucket(ctx, "BucketACLSample", || scenario(ctx)).await
}

async fn scenario(ctx: &SampleContext) -> Result<()> {
    let s3 = &ctx.s3;
    let bucket = ctx.bucket.as_str();

    s3.make_bucket(bucket).await?;

    // Set Bucket CannedACL 'PublicRead'
    s3.put_bucket_acl(bucket, BucketCannedAcl::PublicRead)
        .await?;

    let acl = s3.get_bucket_acl(bucket).await?;
    show("Get Bucket ACL", serde_json::to_string_pretty(&acl)?);

    Ok(())
}
