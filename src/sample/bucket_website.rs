use anyhow::{Context, Result};
use std::path::Path;
use yig_s3_sdk::s3::WebsiteConfig;

use crate::common::{SampleContext, show, with_clean_bucket};

pub async fn run(ctx: &SampleContext, config: Option<&Path>) -> Result<()> {
    let website = match config {
        Some(path) => load_website_config(path).await?,
        None => WebsiteConfig::default(),
    };

    with_clean_bucket(ctx, "BucketWebsiteSample", || scenario(ctx, &website)).await
}

async fn load_website_config(path: &Path) -> Result<WebsiteConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse website config {}", path.display()))
}

async fn scenario(ctx: &SampleContext, website: &WebsiteConfig) -> Result<()> {
    let s3 = &ctx.s3;
    let bucket = ctx.bucket.as_str();

    s3.make_bucket(bucket).await?;

    s3.put_bucket_website(bucket, website).await?;

    let current = s3.get_bucket_website(bucket).await?;
    show("Index document", &current.index_document);
    if let Some(error_document) = &current.error_document {
        show("Error document", error_document);
    }
    if let Some(host) = &current.redirect_all_requests_to {
        show("Redirect all requests to", host);
    }

    s3.delete_bucket_website(bucket).await?;

    Ok(())
}
