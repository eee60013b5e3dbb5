//! Error types.
//!
//! Three layers, three types:
//!
//! | Type | Raised by | Ends up as |
//! |---|---|---|
//! | [`Error`] | startup and the accept loop | a non-zero exit code |
//! | [`StoreError`](crate::store::StoreError) | document store backends | wrapped in [`ApiError`] |
//! | [`ApiError`] | article handlers | a bodiless status code |

use http::StatusCode;
use thiserror::Error;
use tracing::{error, warn};

use crate::response::{IntoResponse, Response};
use crate::store::StoreError;

/// A type alias for `Box<dyn Error + Send + Sync>`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Infrastructure failures: reading configuration, binding a port.
///
/// Request-level failures never surface here. They are [`ApiError`]s and are
/// turned into responses before they leave the handler.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Why an article request failed.
///
/// Each variant maps to exactly one status code. The detail is logged, never
/// returned to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("reading request body failed: {0}")]
    BodyRead(#[source] BoxError),

    #[error("unmarshalling json failed: {0}")]
    Payload(#[source] serde_json::Error),

    #[error("request body has no `id`")]
    MissingId,

    #[error("stored document could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("encoding response failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unsupported method {0}")]
    UnsupportedMethod(http::Method),
}

impl ApiError {
    /// The status code the caller receives for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BodyRead(_) | Self::Payload(_) | Self::MissingId => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::AlreadyExists { .. }) => StatusCode::CONFLICT,
            Self::Store(_) | Self::Decode(_) | Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UnsupportedMethod(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(status = status.as_u16(), "{self}");
        } else {
            warn!(status = status.as_u16(), "{self}");
        }

        match self {
            Self::UnsupportedMethod(_) => Response::builder().status(status).text("UNSUPPORTED METHOD"),
            _ => Response::status(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::ApiError;
    use crate::response::IntoResponse;
    use crate::store::StoreError;

    fn payload_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{").unwrap_err()
    }

    #[test]
    fn test_client_errors_are_bad_request() {
        assert_eq!(ApiError::MissingId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Payload(payload_error()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::BodyRead("connection reset".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_duplicate_create_is_conflict() {
        let error = ApiError::from(StoreError::AlreadyExists {
            collection: "articles".to_owned(),
            key: "a1".to_owned(),
        });

        assert_eq!(error.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_other_store_failures_are_internal() {
        assert_eq!(
            ApiError::from(StoreError::Closed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(StoreError::Rejected {
                status: 403,
                message: "permission denied".to_owned(),
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_responses_carry_no_detail() {
        let response = ApiError::Payload(payload_error()).into_response();

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_unsupported_method_body() {
        let response = ApiError::UnsupportedMethod(http::Method::PATCH).into_response();

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(&response.body()[..], b"UNSUPPORTED METHOD");
    }
}
