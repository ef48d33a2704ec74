use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_REGION: &str = "us-east-1";

/// Static access key pair for the object store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key: String,
    pub secret_key: String,
}

/// Connection settings for an S3-compatible endpoint
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub region: String,
    pub profile: Option<String>,
    pub credentials: Option<StaticCredentials>,
    pub force_path_style: bool,
}

impl Config {
    /// Build a configuration for an endpoint with static credentials
    pub fn new(
        endpoint: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            region: DEFAULT_REGION.to_string(),
            profile: None,
            credentials: Some(StaticCredentials {
                access_key: access_key.into(),
                secret_key: secret_key.into(),
            }),
            force_path_style: true,
        }
    }

    /// Load configuration from environment variables and .env file
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("S3_ENDPOINT")
            .context("S3_ENDPOINT not found in environment. Please set it in .env file")?;
        Self::validate_endpoint(&endpoint)?;

        let region = lookup("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());
        Self::validate_region(&region)?;

        let profile = lookup("AWS_PROFILE");

        let credentials = match (lookup("AWS_ACCESS_KEY_ID"), lookup("AWS_SECRET_ACCESS_KEY")) {
            (Some(access_key), Some(secret_key)) => Some(StaticCredentials {
                access_key,
                secret_key,
            }),
            (None, None) => None,
            _ => anyhow::bail!(
                "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together"
            ),
        };

        let force_path_style = match lookup("S3_FORCE_PATH_STYLE") {
            Some(value) => Self::parse_bool("S3_FORCE_PATH_STYLE", &value)?,
            None => true,
        };

        Ok(Self {
            endpoint,
            region,
            profile,
            credentials,
            force_path_style,
        })
    }

    /// Validate the endpoint URL scheme
    fn validate_endpoint(endpoint: &str) -> Result<()> {
        if endpoint.is_empty() {
            anyhow::bail!("S3_ENDPOINT cannot be empty");
        }

        let host = endpoint
            .strip_prefix("http://")
            .or_else(|| endpoint.strip_prefix("https://"))
            .with_context(|| {
                format!(
                    "S3_ENDPOINT '{}' must start with http:// or https://",
                    endpoint
                )
            })?;

        if host.is_empty() || host.starts_with('/') {
            anyhow::bail!("S3_ENDPOINT '{}' is missing a host", endpoint);
        }

        Ok(())
    }

    /// Validate AWS region format
    fn validate_region(region: &str) -> Result<()> {
        if region.is_empty() {
            anyhow::bail!("AWS_REGION cannot be empty");
        }

        // Basic validation - ensure it looks like a region (contains a dash)
        if !region.contains('-') {
            anyhow::bail!(
                "AWS_REGION '{}' doesn't look like a valid region (e.g., us-east-1, cn-north-1)",
                region
            );
        }

        Ok(())
    }

    fn parse_bool(name: &str, value: &str) -> Result<bool> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => anyhow::bail!("{} '{}' is not a boolean", name, value),
        }
    }
}

/// Validate S3 bucket name according to AWS rules
pub fn validate_bucket_name(bucket: &str) -> Result<()> {
    if bucket.is_empty() {
        anyhow::bail!("Bucket name cannot be empty");
    }

    if bucket.len() < 3 || bucket.len() > 63 {
        anyhow::bail!(
            "Bucket '{}' must be between 3 and 63 characters (got {})",
            bucket,
            bucket.len()
        );
    }

    let starts_ok = bucket
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !starts_ok {
        anyhow::bail!(
            "Bucket '{}' must start with a lowercase letter or number",
            bucket
        );
    }

    let ends_ok = bucket
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !ends_ok {
        anyhow::bail!(
            "Bucket '{}' must end with a lowercase letter or number",
            bucket
        );
    }

    for c in bucket.chars() {
        if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '.' {
            anyhow::bail!(
                "Bucket '{}' contains invalid character '{}'. Only lowercase letters, numbers, hyphens, and periods are allowed",
                bucket,
                c
            );
        }
    }

    if bucket.contains("..") {
        anyhow::bail!("Bucket '{}' cannot contain consecutive periods", bucket);
    }

    // Check for IP address format (not allowed)
    if bucket
        .split('.')
        .all(|part| part.parse::<u8>().is_ok() && !part.is_empty())
    {
        anyhow::bail!("Bucket '{}' cannot be formatted as an IP address", bucket);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_bucket_name_validation() {
        // Valid bucket names
        assert!(validate_bucket_name("my-bucket").is_ok());
        assert!(validate_bucket_name("my.bucket.123").is_ok());
        assert!(validate_bucket_name("abc").is_ok());
        assert!(validate_bucket_name("yig-sample-bucket").is_ok());

        // Invalid bucket names
        assert!(validate_bucket_name("ab").is_err()); // Too short
        assert!(validate_bucket_name(&"a".repeat(64)).is_err()); // Too long
        assert!(validate_bucket_name("MY-BUCKET").is_err()); // Uppercase
        assert!(validate_bucket_name("my_bucket").is_err()); // Underscore
        assert!(validate_bucket_name("-mybucket").is_err()); // Starts with dash
        assert!(validate_bucket_name("mybucket-").is_err()); // Ends with dash
        assert!(validate_bucket_name("my..bucket").is_err()); // Consecutive periods
        assert!(validate_bucket_name("192.168.1.1").is_err()); // IP address format
        assert!(validate_bucket_name("").is_err()); // Empty
    }

    #[test]
    fn test_region_validation() {
        assert!(Config::validate_region("us-east-1").is_ok());
        assert!(Config::validate_region("cn-bj-1").is_ok());

        assert!(Config::validate_region("").is_err());
        assert!(Config::validate_region("useast1").is_err());
    }

    #[test]
    fn test_endpoint_validation() {
        assert!(Config::validate_endpoint("http://127.0.0.1:8080").is_ok());
        assert!(Config::validate_endpoint("https://s3.example.com").is_ok());

        assert!(Config::validate_endpoint("").is_err());
        assert!(Config::validate_endpoint("s3.example.com").is_err()); // No scheme
        assert!(Config::validate_endpoint("http://").is_err()); // No host
        assert!(Config::validate_endpoint("ftp://s3.example.com").is_err());
    }

    #[test]
    fn test_from_lookup_with_static_credentials() {
        let config = Config::from_lookup(lookup_from(&[
            ("S3_ENDPOINT", "http://s3.test.com:8080"),
            ("AWS_ACCESS_KEY_ID", "hehehehe"),
            ("AWS_SECRET_ACCESS_KEY", "hehehehe"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint, "http://s3.test.com:8080");
        assert_eq!(config.region, DEFAULT_REGION);
        assert!(config.force_path_style);
        assert_eq!(
            config.credentials,
            Some(StaticCredentials {
                access_key: "hehehehe".to_string(),
                secret_key: "hehehehe".to_string(),
            })
        );
    }

    #[test]
    fn test_from_lookup_defaults_to_credential_chain() {
        let config = Config::from_lookup(lookup_from(&[
            ("S3_ENDPOINT", "https://s3.example.com"),
            ("AWS_REGION", "eu-west-1"),
            ("AWS_PROFILE", "staging"),
            ("S3_FORCE_PATH_STYLE", "false"),
        ]))
        .unwrap();

        assert!(config.credentials.is_none());
        assert_eq!(config.profile.as_deref(), Some("staging"));
        assert_eq!(config.region, "eu-west-1");
        assert!(!config.force_path_style);
    }

    #[test]
    fn test_from_lookup_rejects_partial_credentials() {
        let result = Config::from_lookup(lookup_from(&[
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("AWS_ACCESS_KEY_ID", "only-the-key"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_lookup_requires_endpoint() {
        let result = Config::from_lookup(lookup_from(&[("AWS_REGION", "us-east-1")]));
        assert!(result.is_err());

        let result = Config::from_lookup(lookup_from(&[
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("S3_FORCE_PATH_STYLE", "maybe"),
        ]));
        assert!(result.is_err());
    }
}
