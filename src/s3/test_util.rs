//! Replay-backed client for exercising request marshalling without a server.

use aws_sdk_s3::Client;
use aws_smithy_http_client::test_util::{ReplayEvent, StaticReplayClient};
use aws_smithy_types::body::SdkBody;

use super::S3Client;
use super::client::sdk_config_builder;
use crate::config::{Config, StaticCredentials};

pub(crate) const ENDPOINT: &str = "http://s3.test.com:8080";

/// A canned response the replay client hands back for the next request
pub(crate) fn response(status: u16, headers: &[(&str, &str)], body: &str) -> ReplayEvent {
    let request = http::Request::builder()
        .uri(ENDPOINT)
        .body(SdkBody::empty())
        .unwrap();

    let mut builder = http::Response::builder().status(status);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let response = builder.body(SdkBody::from(body.to_string())).unwrap();

    ReplayEvent::new(request, response)
}

pub(crate) fn ok() -> ReplayEvent {
    response(200, &[], "")
}

pub(crate) fn replay_client(events: Vec<ReplayEvent>) -> (S3Client, StaticReplayClient) {
    let replay = StaticReplayClient::new(events);
    let config = Config::new(ENDPOINT, "ak", "sk");
    let credentials = StaticCredentials {
        access_key: "ak".to_string(),
        secret_key: "sk".to_string(),
    };
    let conf = sdk_config_builder(&config, &credentials)
        .http_client(replay.clone())
        .build();

    (S3Client::from_client(Client::from_conf(conf)), replay)
}

/// Body of a captured request as text
pub(crate) fn body_text(body: &SdkBody) -> String {
    String::from_utf8_lossy(body.bytes().unwrap_or_default()).into_owned()
}
