use aws_sdk_s3::error::{BuildError, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfigError;
use aws_smithy_types::byte_stream::error::Error as ByteStreamError;
use thiserror::Error;

/// Errors returned by [`S3Client`](super::S3Client) operations
///
/// Service and transport failures are carried unchanged in [`S3Error::Sdk`].
#[derive(Error, Debug)]
pub enum S3Error {
    /// Error reported by the SDK or the object store
    #[error("S3 error: {0}")]
    Sdk(Box<aws_sdk_s3::Error>),

    /// Invalid presigning parameters (e.g. zero expiry)
    #[error("Presigning error: {0}")]
    Presign(#[from] PresigningConfigError),

    /// A request input could not be built
    #[error("Request build error: {0}")]
    Build(#[from] BuildError),

    /// Failure while reading a response body
    #[error("Body stream error: {0}")]
    ByteStream(#[from] ByteStreamError),

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The response is missing a field the operation returns
    #[error("{operation} response is missing {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    /// The response carried a value that could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl<E, R> From<SdkError<E, R>> for S3Error
where
    aws_sdk_s3::Error: From<SdkError<E, R>>,
{
    fn from(error: SdkError<E, R>) -> Self {
        Self::Sdk(Box::new(error.into()))
    }
}

impl S3Error {
    pub(crate) fn missing(operation: &'static str, field: &'static str) -> Self {
        Self::MissingField { operation, field }
    }

    /// Service error code such as `NoSuchKey`, if the store returned one
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Sdk(err) => err.code(),
            _ => None,
        }
    }

    /// Service error message, if the store returned one
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Sdk(err) => err.message(),
            _ => None,
        }
    }

    /// The underlying SDK error, if any
    pub fn as_sdk(&self) -> Option<&aws_sdk_s3::Error> {
        match self {
            Self::Sdk(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for S3 operations
pub type Result<T> = std::result::Result<T, S3Error>;
