//! Appendable objects.
//!
//! Yig accepts `POST /{bucket}/{key}?append&position={n}` with the same
//! headers as PutObject and answers with the offset the next append must use
//! in `x-amz-next-append-position`. The SDK has no such operation, so the
//! request is built as a PutObject and rewritten by [`AppendInterceptor`]
//! before it is signed.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_smithy_runtime_api::box_error::BoxError;
use aws_smithy_runtime_api::client::interceptors::Intercept;
use aws_smithy_runtime_api::client::interceptors::context::{
    BeforeDeserializationInterceptorContextRef, BeforeTransmitInterceptorContextMut,
};
use aws_smithy_runtime_api::client::orchestrator::HttpRequest;
use aws_smithy_runtime_api::client::runtime_components::RuntimeComponents;
use aws_smithy_types::body::SdkBody;
use aws_smithy_types::config_bag::ConfigBag;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::S3Client;
use super::error::{Result, S3Error};

pub const NEXT_APPEND_POSITION_HEADER: &str = "x-amz-next-append-position";

/// Turns a signed-to-be PutObject into an append and records the next position
#[derive(Debug, Clone)]
struct AppendInterceptor {
    position: i64,
    next_position: Arc<Mutex<Option<String>>>,
}

impl AppendInterceptor {
    fn new(position: i64) -> Self {
        Self {
            position,
            next_position: Arc::new(Mutex::new(None)),
        }
    }

    fn next_position(&self) -> Result<i64> {
        let captured = self
            .next_position
            .lock()
            .ok()
            .and_then(|mut value| value.take())
            .ok_or_else(|| S3Error::missing("AppendObject", NEXT_APPEND_POSITION_HEADER))?;

        captured.trim().parse::<i64>().map_err(|_| {
            S3Error::InvalidResponse(format!(
                "{} is not a position: '{}'",
                NEXT_APPEND_POSITION_HEADER, captured
            ))
        })
    }
}

impl Intercept for AppendInterceptor {
    fn name(&self) -> &'static str {
        "AppendInterceptor"
    }

    fn modify_before_signing(
        &self,
        context: &mut BeforeTransmitInterceptorContextMut<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> std::result::Result<(), BoxError> {
        let request = std::mem::replace(context.request_mut(), HttpRequest::new(SdkBody::taken()));
        let mut request = request.try_into_http1x()?;

        let uri = append_uri(&request.uri().to_string(), self.position).parse::<http::Uri>()?;
        *request.method_mut() = http::Method::POST;
        *request.uri_mut() = uri;

        *context.request_mut() = HttpRequest::try_from(request)?;
        Ok(())
    }

    fn read_before_deserialization(
        &self,
        context: &BeforeDeserializationInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> std::result::Result<(), BoxError> {
        let value = context
            .response()
            .headers()
            .get(NEXT_APPEND_POSITION_HEADER)
            .map(str::to_string);

        *self
            .next_position
            .lock()
            .map_err(|_| "append position lock poisoned")? = value;
        Ok(())
    }
}

/// Replace the PutObject query with the append query
fn append_uri(uri: &str, position: i64) -> String {
    let base = uri.split('?').next().unwrap_or(uri);
    format!("{}?append&position={}", base, position)
}

impl S3Client {
    /// Append `body` at `position`; returns the position for the next append
    pub async fn append_object(
        &self,
        bucket: &str,
        key: &str,
        body: impl Into<ByteStream>,
        position: i64,
    ) -> Result<i64> {
        let interceptor = AppendInterceptor::new(position);

        self.client()
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body.into())
            .customize()
            .interceptor(interceptor.clone())
            .send()
            .await?;

        let next = interceptor.next_position()?;
        debug!(
            "Appended to s3://{}/{} at {}, next position {}",
            bucket, key, position, next
        );
        Ok(next)
    }

    /// Append with a canned ACL (e.g. `public-read`) and user metadata
    pub async fn append_object_with_acl_and_meta(
        &self,
        bucket: &str,
        key: &str,
        body: impl Into<ByteStream>,
        position: i64,
        acl: &str,
        meta: HashMap<String, String>,
    ) -> Result<i64> {
        let interceptor = AppendInterceptor::new(position);

        self.client()
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body.into())
            .acl(ObjectCannedAcl::from(acl))
            .set_metadata(Some(meta))
            .customize()
            .interceptor(interceptor.clone())
            .send()
            .await?;

        let next = interceptor.next_position()?;
        debug!(
            "Appended to s3://{}/{} at {} with acl {}, next position {}",
            bucket, key, position, acl, next
        );
        Ok(next)
    }

    /// Ask the store for the next append position by appending nothing
    pub async fn get_object_next_append_position(
        &self,
        bucket: &str,
        key: &str,
        position: i64,
    ) -> Result<i64> {
        self.append_object(bucket, key, ByteStream::from_static(b""), position)
            .await
    }
}
