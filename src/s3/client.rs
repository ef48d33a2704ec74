use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Builder, Credentials};
use aws_smithy_types::checksum_config::{RequestChecksumCalculation, ResponseChecksumValidation};
use tracing::debug;

use crate::config::{Config, StaticCredentials};

/// Handle to an S3-compatible object store
///
/// Cheap to clone; clones share the underlying SDK client.
#[derive(Clone, Debug)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Create a client for `endpoint` with a static key pair
    pub fn new(endpoint: &str, access_key: &str, secret_key: &str) -> Self {
        let config = Config::new(endpoint, access_key, secret_key);
        let credentials = StaticCredentials {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        };
        Self::from_client(Client::from_conf(
            sdk_config_builder(&config, &credentials).build(),
        ))
    }

    /// Create a client from loaded configuration
    ///
    /// Static credentials are used when configured, otherwise the default
    /// AWS credential chain (optionally with a named profile).
    pub async fn from_config(config: &Config) -> Self {
        if let Some(credentials) = &config.credentials {
            debug!("Using static credentials for {}", config.endpoint);
            return Self::from_client(Client::from_conf(
                sdk_config_builder(config, credentials).build(),
            ));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint);

        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }

        let sdk_config = loader.load().await;
        let s3_config = Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();

        debug!("Using default credential chain for {}", config.endpoint);
        Self::from_client(Client::from_conf(s3_config))
    }

    /// Wrap an already configured SDK client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// The underlying SDK client, for calls this crate does not wrap
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// SDK configuration for an endpoint with static credentials
///
/// Checksums are only sent and validated when an operation requires them,
/// since many S3-compatible stores reject the newer flexible checksum headers.
pub fn sdk_config_builder(config: &Config, credentials: &StaticCredentials) -> Builder {
    aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .endpoint_url(&config.endpoint)
        .force_path_style(config.force_path_style)
        .credentials_provider(Credentials::new(
            &credentials.access_key,
            &credentials.secret_key,
            None,
            None,
            "yig-static",
        ))
        .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
        .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
}
