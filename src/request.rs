//! Incoming HTTP request type.

use bytes::Bytes;
use http::{HeaderMap, Method};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::BodyExt;
use hyper::body::Body;

use crate::error::BoxError;

/// An incoming HTTP request.
///
/// The body is not read until a handler asks for it, so pre-flight and
/// list requests never pay for it and a broken body only fails the
/// handlers that need one.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: UnsyncBoxBody<Bytes, BoxError>,
}

impl Request {
    /// Wraps any `http::Request` whose body yields [`Bytes`].
    ///
    /// The server passes hyper's `Incoming` here; tests pass
    /// `http_body_util::Full` or a stream that fails on purpose.
    pub fn from_http<B>(req: http::Request<B>) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: parts.headers,
            body: body.map_err(Into::into).boxed_unsync(),
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// Case-insensitive header lookup. Non-UTF-8 values are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Reads the whole body into memory.
    pub async fn bytes(self) -> Result<Bytes, BoxError> {
        Ok(self.body.collect().await?.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http_body_util::{Empty, Full};

    use super::Request;

    #[tokio::test]
    async fn test_bytes_collects_body() {
        let req = Request::from_http(
            http::Request::post("/articles?x=1")
                .header("Content-Type", "application/json")
                .body(Full::new(Bytes::from_static(b"{\"id\":\"a1\"}")))
                .unwrap(),
        );

        assert_eq!(req.method(), http::Method::POST);
        assert_eq!(req.path(), "/articles");
        assert_eq!(req.query(), Some("x=1"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.bytes().await.unwrap(), Bytes::from_static(b"{\"id\":\"a1\"}"));
    }

    #[tokio::test]
    async fn test_empty_body() {
        let req = Request::from_http(http::Request::get("/").body(Empty::<Bytes>::new()).unwrap());

        assert!(req.bytes().await.unwrap().is_empty());
    }
}
