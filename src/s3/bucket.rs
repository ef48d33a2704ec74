use aws_sdk_s3::types::{
    BucketCannedAcl, ErrorDocument, IndexDocument, RedirectAllRequestsTo, WebsiteConfiguration,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::S3Client;
use super::error::Result;

/// Bucket ACL as returned by GetBucketAcl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BucketAcl {
    pub owner_id: Option<String>,
    pub owner_display_name: Option<String>,
    pub grants: Vec<AclGrant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclGrant {
    /// Canonical user id, group URI or email, whichever the grant names
    pub grantee: String,
    pub permission: String,
}

/// Static website hosting settings for a bucket
///
/// When `redirect_all_requests_to` is set the other fields are ignored, as
/// S3 does not allow mixing a redirect-all rule with documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebsiteConfig {
    pub index_document: String,
    pub error_document: Option<String>,
    pub redirect_all_requests_to: Option<String>,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            index_document: "index.html".to_string(),
            error_document: Some("error.html".to_string()),
            redirect_all_requests_to: None,
        }
    }
}

impl WebsiteConfig {
    fn to_sdk(&self) -> Result<WebsiteConfiguration> {
        let builder = WebsiteConfiguration::builder();

        let builder = match &self.redirect_all_requests_to {
            Some(host) => builder.redirect_all_requests_to(
                RedirectAllRequestsTo::builder().host_name(host).build()?,
            ),
            None => {
                let builder = builder.index_document(
                    IndexDocument::builder()
                        .suffix(&self.index_document)
                        .build()?,
                );
                match &self.error_document {
                    Some(key) => {
                        builder.error_document(ErrorDocument::builder().key(key).build()?)
                    }
                    None => builder,
                }
            }
        };

        Ok(builder.build())
    }
}

impl S3Client {
    pub async fn make_bucket(&self, bucket: &str) -> Result<()> {
        debug!("CreateBucket {}", bucket);
        self.client().create_bucket().bucket(bucket).send().await?;
        Ok(())
    }

    pub async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        debug!("DeleteBucket {}", bucket);
        self.client().delete_bucket().bucket(bucket).send().await?;
        Ok(())
    }

    /// Succeeds if the bucket exists and is accessible
    pub async fn head_bucket(&self, bucket: &str) -> Result<()> {
        self.client().head_bucket().bucket(bucket).send().await?;
        Ok(())
    }

    /// Names of all buckets owned by the caller
    pub async fn list_buckets(&self) -> Result<Vec<String>> {
        let out = self.client().list_buckets().send().await?;

        Ok(out
            .buckets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|bucket| bucket.name)
            .collect())
    }

    pub async fn put_bucket_acl(&self, bucket: &str, acl: BucketCannedAcl) -> Result<()> {
        debug!("PutBucketAcl {} {}", bucket, acl.as_str());
        self.client()
            .put_bucket_acl()
            .bucket(bucket)
            .acl(acl)
            .send()
            .await?;
        Ok(())
    }

    pub async fn get_bucket_acl(&self, bucket: &str) -> Result<BucketAcl> {
        let out = self.client().get_bucket_acl().bucket(bucket).send().await?;

        let grants = out
            .grants()
            .iter()
            .map(|grant| {
                let grantee = grant
                    .grantee()
                    .and_then(|g| g.id().or(g.uri()).or(g.email_address()))
                    .unwrap_or_default()
                    .to_string();
                let permission = grant
                    .permission()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                AclGrant {
                    grantee,
                    permission,
                }
            })
            .collect();

        Ok(BucketAcl {
            owner_id: out.owner().and_then(|o| o.id()).map(str::to_string),
            owner_display_name: out
                .owner()
                .and_then(|o| o.display_name())
                .map(str::to_string),
            grants,
        })
    }

    pub async fn put_bucket_website(&self, bucket: &str, website: &WebsiteConfig) -> Result<()> {
        self.client()
            .put_bucket_website()
            .bucket(bucket)
            .website_configuration(website.to_sdk()?)
            .send()
            .await?;
        Ok(())
    }

    pub async fn get_bucket_website(&self, bucket: &str) -> Result<WebsiteConfig> {
        let out = self
            .client()
            .get_bucket_website()
            .bucket(bucket)
            .send()
            .await?;

        Ok(WebsiteConfig {
            index_document: out
                .index_document()
                .map(|doc| doc.suffix().to_string())
                .unwrap_or_default(),
            error_document: out.error_document().map(|doc| doc.key().to_string()),
            redirect_all_requests_to: out
                .redirect_all_requests_to()
                .map(|redirect| redirect.host_name().to_string()),
        })
    }

    pub async fn delete_bucket_website(&self, bucket: &str) -> Result<()> {
        self.client()
            .delete_bucket_website()
            .bucket(bucket)
            .send()
            .await?;
        Ok(())
    }
}
