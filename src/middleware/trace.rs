use std::time::Instant;

use tracing::{info, info_span, Instrument};

use crate::handler::SharedEndpoint;
use crate::request::Request;
use crate::response::Response;

/// Runs `handler` inside a `request` span and logs how it went.
///
/// Everything the handler logs, including [`ApiError`](crate::ApiError)
/// reports, inherits the span's method and path.
pub(crate) async fn instrument(handler: SharedEndpoint, req: Request) -> Response {
    let span = info_span!("request", method = %req.method(), path = %req.path());

    async move {
        let started = Instant::now();
        let response = handler.call(req).await;
        info!(
            status = response.status_code().as_u16(),
            latency_ms = started.elapsed().as_secs_f64() * 1000.0,
            "served"
        );
        response
    }
    .instrument(span)
    .await
}
