//! Request instrumentation.
//!
//! Every request passes through [`track_requests`], which brackets the inner
//! handler with an [`InFlight`] guard: the guard starts the clock and bumps
//! the active-connections gauge on entry, and records the outcome when the
//! request finishes. If the handler future is dropped before completing
//! (client disconnect, timeout, panic while unwinding), the guard's `Drop`
//! still records the request, with the `aborted` status class.

use crate::app_state::AppState;
use crate::domain::{MetricsPtr, RequestOutcome};
use axum::{
    extract::{MatchedPath, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Route label used for anything that is not a registered route template.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Route templates the service registers. Only these may appear as `route` labels.
pub const ROUTES: &[&str] = &[
    "/",
    "/health",
    "/metrics",
    "/users/register",
    "/orders",
    "/simulate/load",
    "/simulate/error",
    "/analytics/metrics",
];

/// Distinct `method` labels: seven named methods plus `OTHER`.
const METHOD_LABELS: usize = 8;

/// Distinct `status` labels: `1xx` to `5xx` plus `aborted`.
const STATUS_LABELS: usize = 6;

/// Most `requests_total` series the middleware can ever produce.
pub const REQUEST_SERIES_BOUND: usize = (ROUTES.len() + 1) * METHOD_LABELS * STATUS_LABELS;

/// Map a matched route template onto the bounded label set.
pub fn route_label(matched: Option<&str>) -> &'static str {
    matched
        .and_then(|path| ROUTES.iter().copied().find(|route| *route == path))
        .unwrap_or(UNMATCHED_ROUTE)
}

/// Map a request method onto the bounded label set.
pub fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

/// Bookkeeping for one request between entry and exit.
struct InFlight {
    metrics: MetricsPtr,
    method: &'static str,
    route: &'static str,
    started: Instant,
    finished: bool,
}

impl InFlight {
    fn start(metrics: MetricsPtr, method: &'static str, route: &'static str) -> Self {
        metrics.connection_opened();
        InFlight {
            metrics,
            method,
            route,
            started: Instant::now(),
            finished: false,
        }
    }

    fn finish(mut self, status: u16) {
        self.record(RequestOutcome::Completed(status));
        self.finished = true;
    }

    fn record(&self, outcome: RequestOutcome) {
        self.metrics
            .record_http_request(self.method, self.route, outcome, self.started.elapsed());
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(method = self.method, route = self.route, "Request aborted before completion");
            self.record(RequestOutcome::Aborted);
            self.metrics.record_error("aborted");
        }
        self.metrics.connection_closed();
    }
}

/// Axum middleware recording request count, latency and in-flight connections.
///
/// Install with `axum::middleware::from_fn_with_state` via `Router::layer`,
/// so that it runs after routing and can see the [`MatchedPath`].
pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    // ---
    let route = route_label(
        request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str),
    );
    let method = method_label(request.method());

    let guard = InFlight::start(state.metrics().clone(), method, route);
    let response = next.run(request).await;
    guard.finish(response.status().as_u16());

    response
}
