//! Handlers and the endpoint objects the router stores.
//!
//! Any `async fn(Request) -> impl IntoResponse`, or a closure of that shape,
//! is a [`Handler`]. The router turns each one into an [`Endpoint`] trait
//! object once, at registration, so the articles API, the probes and a
//! plain `async fn` can sit in the same table.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

pub(crate) type ResponseFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// A registered handler, shared by every connection task.
#[doc(hidden)]
pub type SharedEndpoint = Arc<dyn Endpoint>;

/// Object-safe form of [`Handler`].
#[doc(hidden)]
pub trait Endpoint: Send + Sync + 'static {
    fn call(&self, req: Request) -> ResponseFuture;
}

/// Something the [`Router`](crate::Router) can dispatch to.
///
/// Implemented for every `Fn(Request) -> impl Future<Output = impl IntoResponse>`
/// that can be shared across tasks.
pub trait Handler: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_endpoint(self) -> SharedEndpoint;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn into_endpoint(self) -> SharedEndpoint {
        Arc::new(FnEndpoint(self))
    }
}

struct FnEndpoint<F>(F);

impl<F, Fut, R> Endpoint for FnEndpoint<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn call(&self, req: Request) -> ResponseFuture {
        let pending = (self.0)(req);
        Box::pin(async move { pending.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Empty;

    use super::Handler;
    use crate::request::Request;

    async fn teapot(_req: Request) -> StatusCode {
        StatusCode::IM_A_TEAPOT
    }

    #[tokio::test]
    async fn test_endpoint_converts_output() {
        let endpoint = teapot.into_endpoint();
        let req = Request::from_http(http::Request::get("/").body(Empty::<Bytes>::new()).unwrap());

        assert_eq!(endpoint.call(req).await.status_code(), StatusCode::IM_A_TEAPOT);
    }
}
