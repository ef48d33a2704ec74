use anyhow::{Context, Result};
use console::style;
use std::env;
use std::future::Future;
use tracing::{debug, warn};
use yig_s3_sdk::config::validate_bucket_name;
use yig_s3_sdk::s3::ListObjectsPage;
use yig_s3_sdk::{Config, S3Client, S3Error};

const DEFAULT_BUCKET: &str = "yig-sample-bucket";
const DEFAULT_OBJECT_KEY: &str = "yig-sample-object";

/// Client plus the scratch bucket and object the samples work on
pub struct SampleContext {
    pub s3: S3Client,
    pub bucket: String,
    pub key: String,
}

impl SampleContext {
    pub async fn from_env() -> Result<Self> {
        let config = Config::from_env()?;

        let bucket = env::var("S3_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string());
        validate_bucket_name(&bucket).context("Invalid S3_BUCKET")?;

        let key = env::var("S3_OBJECT_KEY").unwrap_or_else(|_| DEFAULT_OBJECT_KEY.to_string());

        let s3 = S3Client::from_config(&config).await;

        println!(
            "{}",
            style(format!("📦 Target: {}/{}", config.endpoint, bucket))
                .cyan()
                .bold()
        );

        Ok(Self { s3, bucket, key })
    }
}

/// Run `scenario` between two cleanups of the sample bucket
///
/// The scenario's error wins over a cleanup error.
pub async fn with_clean_bucket<F, Fut>(ctx: &SampleContext, name: &str, scenario: F) -> Result<()>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    println!("\n{}", style(format!("▶ {}", name)).bold());

    delete_test_bucket_and_object(ctx).await?;
    let result = scenario().await;
    let cleanup = delete_test_bucket_and_object(ctx).await;

    match (result, cleanup) {
        (Err(e), cleanup) => {
            if let Err(cleanup_err) = cleanup {
                warn!("Cleanup after failed sample also failed: {}", cleanup_err);
            }
            eprintln!("{} {} - {}", style("✗").red(), style(name).red(), style(&e).red());
            Err(e)
        }
        (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => {
            println!("{} {} Run Success!", style("✓").green(), style(name).green());
            Ok(())
        }
    }
}

/// Remove every object in the sample bucket, then the bucket itself
pub async fn delete_test_bucket_and_object(ctx: &SampleContext) -> Result<()> {
    let mut marker: Option<String> = None;

    loop {
        let page = match ctx
            .s3
            .list_objects(&ctx.bucket, "", "", 1000, marker.as_deref())
            .await
        {
            Ok(page) => page,
            Err(e) if is_no_such_bucket(&e) => return Ok(()),
            Err(e) => return Err(e).context("Failed to list sample bucket"),
        };

        if !page.keys.is_empty() {
            let deleted = ctx.s3.delete_objects(&ctx.bucket, &page.keys).await?;
            debug!("Deleted {} objects from {}", deleted.len(), ctx.bucket);
        }

        match next_page_marker(&page) {
            Some(next) => marker = Some(next),
            None => break,
        }
    }

    match ctx.s3.delete_bucket(&ctx.bucket).await {
        Ok(()) => Ok(()),
        Err(e) if is_no_such_bucket(&e) => Ok(()),
        Err(e) => Err(e).context("Failed to delete sample bucket"),
    }
}

/// Marker for the next listing page; `None` when there is nothing left to page through
fn next_page_marker(page: &ListObjectsPage) -> Option<String> {
    if !page.is_truncated {
        return None;
    }
    page.next_marker.clone().or_else(|| page.keys.last().cloned())
}

fn is_no_such_bucket(error: &S3Error) -> bool {
    error.code() == Some("NoSuchBucket")
}

/// Print a labelled value
pub fn show(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{}:", label)).dim(), value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(keys: &[&str], is_truncated: bool, next_marker: Option<&str>) -> ListObjectsPage {
        ListObjectsPage {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            is_truncated,
            next_marker: next_marker.map(str::to_string),
        }
    }

    #[test]
    fn test_next_page_marker_stops_when_not_truncated() {
        assert_eq!(next_page_marker(&page(&["a", "b"], false, Some("b"))), None);
    }

    #[test]
    fn test_next_page_marker_prefers_next_marker() {
        assert_eq!(
            next_page_marker(&page(&["a", "b"], true, Some("z"))),
            Some("z".to_string())
        );
    }

    #[test]
    fn test_next_page_marker_falls_back_to_last_key() {
        assert_eq!(
            next_page_marker(&page(&["a", "b"], true, None)),
            Some("b".to_string())
        );
    }

    #[test]
    fn test_next_page_marker_stops_on_empty_truncated_page() {
        assert_eq!(next_page_marker(&page(&[], true, None)), None);
    }
}
