//! Path router.
//!
//! A radix tree of exact routes (the health probes) in front of one
//! fallback (the articles endpoint). Method dispatch is the handler's job,
//! not the router's: the endpoint must answer every method itself,
//! including the ones it rejects.

use std::sync::Arc;

use http::StatusCode;
use matchit::Router as MatchitRouter;

use crate::handler::{Handler, SharedEndpoint};
use crate::request::Request;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Every method returns `self` so registrations chain.
pub struct Router {
    routes: MatchitRouter<SharedEndpoint>,
    fallback: SharedEndpoint,
}

impl Router {
    /// An empty router. Every path answers `404` until a route or a fallback
    /// is registered.
    pub fn new() -> Self {
        Self {
            routes: MatchitRouter::new(),
            fallback: not_found.into_endpoint(),
        }
    }

    /// Registers `handler` for an exact path such as `/healthz`.
    ///
    /// # Panics
    ///
    /// Panics if the path is not a valid route or is already taken. Routes
    /// are fixed at startup, so this is a programming error.
    pub fn route(mut self, path: &str, handler: impl Handler) -> Self {
        self.routes
            .insert(path, handler.into_endpoint())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Registers the handler for every path no route claims.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = handler.into_endpoint();
        self
    }

    pub(crate) fn lookup(&self, path: &str) -> SharedEndpoint {
        match self.routes.at(path) {
            Ok(matched) => Arc::clone(matched.value),
            Err(_) => Arc::clone(&self.fallback),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

async fn not_found(_req: Request) -> StatusCode {
    StatusCode::NOT_FOUND
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Empty;

    use super::Router;
    use crate::request::Request;

    fn get(path: &str) -> Request {
        Request::from_http(http::Request::get(path).body(Empty::<Bytes>::new()).unwrap())
    }

    async fn ok(_req: Request) -> &'static str {
        "ok"
    }

    async fn accepted(_req: Request) -> StatusCode {
        StatusCode::ACCEPTED
    }

    #[tokio::test]
    async fn test_exact_route_then_fallback() {
        let router = Router::new().route("/healthz", ok).fallback(accepted);

        let health = router.lookup("/healthz").call(get("/healthz")).await;
        let other = router.lookup("/articles/a1").call(get("/articles/a1")).await;
        let root = router.lookup("/").call(get("/")).await;

        assert_eq!(health.status_code(), StatusCode::OK);
        assert_eq!(&health.body()[..], b"ok");
        assert_eq!(other.status_code(), StatusCode::ACCEPTED);
        assert_eq!(root.status_code(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_default_fallback_is_not_found() {
        let response = Router::new().lookup("/anything").call(get("/anything")).await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    #[should_panic(expected = "invalid route `/healthz`")]
    fn test_duplicate_route_panics() {
        let _ = Router::new().route("/healthz", ok).route("/healthz", ok);
    }
}
