mod append;
mod bucket_acl;
mod bucket_website;
mod common;
mod multipart;
mod object;
mod presign;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use common::SampleContext;

#[derive(Parser, Debug)]
#[command(
    name = "s3sample",
    version = env!("CARGO_PKG_VERSION"),
    author = "Tyr Chen <tyr.chen@gmail.com>",
    about = "Run yig-s3-sdk usage samples against an S3-compatible endpoint",
    long_about = "Each sample creates a scratch bucket, exercises one group of operations and \
                  removes the bucket (with its objects) before and after running. \
                  Configure the endpoint and credentials via .env file.",
    after_help = "Examples:\n  \
                  s3sample object                          # Put/get/head/copy/list/delete\n  \
                  s3sample append sample/L.jpeg            # Append strings, then files\n  \
                  s3sample multipart ./big.iso             # Multipart upload of a local file\n  \
                  s3sample presign --expiry-secs 600       # Presigned PUT/GET round trip\n  \
                  s3sample all                             # Run every sample\n\n\
                  Configuration (.env):\n  \
                  S3_ENDPOINT=http://127.0.0.1:8080\n  \
                  AWS_ACCESS_KEY_ID=hehehehe\n  \
                  AWS_SECRET_ACCESS_KEY=hehehehe\n  \
                  S3_BUCKET=yig-sample-bucket\n  \
                  S3_OBJECT_KEY=yig-sample-object"
)]
struct Cli {
    #[command(subcommand)]
    sample: Sample,
}

#[derive(Subcommand, Debug)]
enum Sample {
    /// Put, get, head, ranged get, copy, list and delete objects
    Object {
        /// Custom metadata for the metadata upload (key=value pairs, comma-separated)
        #[arg(long, default_value = "a=b,project=yig")]
        metadata: String,
    },
    /// Append strings and files to one object
    Append {
        /// Files to append after the built-in strings
        files: Vec<PathBuf>,
    },
    /// Multipart upload lifecycle: create, upload parts, list, complete, abort
    Multipart {
        /// Local file to upload in parts (optional)
        file: Option<PathBuf>,
    },
    /// Presigned PUT and GET URLs used over plain HTTP
    Presign {
        /// URL expiration in seconds (max: 604800 = 7 days)
        #[arg(long, default_value = "3600")]
        expiry_secs: u64,
    },
    /// Set the bucket canned ACL to public-read and read it back
    BucketAcl,
    /// Put, get and delete a bucket website configuration
    BucketWebsite {
        /// YAML website configuration (index_document, error_document, redirect_all_requests_to)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run all samples
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file early to get LOG_LEVEL
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    info!("S3 samples v{}", env!("CARGO_PKG_VERSION"));

    let ctx = SampleContext::from_env().await?;

    match cli.sample {
        Sample::Object { metadata } => object::run(&ctx, &metadata).await,
        Sample::Append { files } => append::run(&ctx, &files).await,
        Sample::Multipart { file } => multipart::run(&ctx, file.as_deref()).await,
        Sample::Presign { expiry_secs } => presign::run(&ctx, expiry_secs).await,
        Sample::BucketAcl => bucket_acl::run(&ctx).await,
        Sample::BucketWebsite { config } => bucket_website::run(&ctx, config.as_deref()).await,
        Sample::All => {
            object::run(&ctx, "a=b,project=yig").await?;
            append::run(&ctx, &[]).await?;
            multipart::run(&ctx, None).await?;
            presign::run(&ctx, 3600).await?;
            bucket_acl::run(&ctx).await?;
            bucket_website::run(&ctx, None).await
        }
    }
}
