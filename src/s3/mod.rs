pub mod append;
pub mod bucket;
pub mod client;
pub mod error;
pub mod helpers;
pub mod multipart;
pub mod object;
pub mod presign;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_util;

pub use aws_sdk_s3::primitives::ByteStream;
pub use aws_sdk_s3::types::{BucketCannedAcl, CompletedMultipartUpload, ObjectCannedAcl, Part};
pub use bucket::{AclGrant, BucketAcl, WebsiteConfig};
pub use client::S3Client;
pub use error::{Result, S3Error};
pub use helpers::{content_md5_hex, detect_content_type, parse_metadata, trim_etag};
pub use multipart::{PART_SIZE, completed_upload};
pub use object::{ListObjectsPage, ObjectMeta, RangedObject};
pub use presign::MAX_PRESIGN_EXPIRY;
