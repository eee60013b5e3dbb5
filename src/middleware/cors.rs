//! Open CORS policy.
//!
//! The endpoint is called straight from browsers on other origins, so every
//! answer allows any origin and pre-flights allow any method.

use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE,
};
use http::{HeaderValue, StatusCode};

use crate::response::Response;

const ANY: HeaderValue = HeaderValue::from_static("*");
const CONTENT_TYPE_ONLY: HeaderValue = HeaderValue::from_static("Content-Type");
const ONE_HOUR: HeaderValue = HeaderValue::from_static("3600");

/// `204 No Content` answer to an `OPTIONS` pre-flight.
pub fn preflight() -> Response {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, ANY)
        .header(ACCESS_CONTROL_ALLOW_METHODS, ANY)
        .header(ACCESS_CONTROL_ALLOW_HEADERS, CONTENT_TYPE_ONLY)
        .header(ACCESS_CONTROL_MAX_AGE, ONE_HOUR)
        .no_body()
}

/// Adds `Access-Control-Allow-Origin: *`.
pub fn allow_any_origin(mut response: Response) -> Response {
    response.set_header(ACCESS_CONTROL_ALLOW_ORIGIN, ANY);
    response
}
