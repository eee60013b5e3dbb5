//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can it reach the document store? Failure → no traffic. |
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use articles::{health, MemoryStore, Router, SharedStore};
//!
//! let store = Arc::new(SharedStore::ready(Arc::new(MemoryStore::new())));
//! let app = Router::new()
//!     .route("/healthz", health::liveness)
//!     .route("/readyz", health::readiness(store));
//! ```

use std::sync::Arc;

use http::StatusCode;
use tracing::warn;

use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;
use crate::store::SharedStore;

/// Liveness probe. Always `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe.
///
/// Connects the shared store if no request has yet, so a pod that cannot
/// reach its database never receives traffic. `503` while that fails.
pub fn readiness(store: Arc<SharedStore>) -> impl Handler {
    move |_req: Request| {
        let store = Arc::clone(&store);
        async move {
            match store.get().await {
                Ok(_) => Response::text("ready"),
                Err(e) => {
                    warn!("readiness check failed: {e}");
                    Response::status(StatusCode::SERVICE_UNAVAILABLE)
                }
            }
        }
    }
}
