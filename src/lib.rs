//! Async client for S3-compatible object stores such as Yig.
//!
//! Every operation on [`S3Client`] maps one-to-one onto an S3 request; the
//! SDK owns signing, retries and checksums, and its errors are surfaced
//! unchanged through [`S3Error`].
//!
//! ```no_run
//! use yig_s3_sdk::S3Client;
//!
//! # async fn run() -> yig_s3_sdk::s3::Result<()> {
//! let s3 = S3Client::new("http://127.0.0.1:8080", "access-key", "secret-key");
//! s3.make_bucket("my-bucket").await?;
//!
//! let mut next = 0;
//! for chunk in ["yig1", "yig2", "yig3"] {
//!     next = s3.append_object("my-bucket", "log", chunk.as_bytes().to_vec(), next).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod s3;

pub use config::Config;
pub use s3::{S3Client, S3Error};
