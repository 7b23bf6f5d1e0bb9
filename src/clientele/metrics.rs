//! Prometheus metrics and request access logging.
//!
//! One middleware wraps every request: it logs method and URL before the
//! handler runs, then logs status and elapsed time afterwards while feeding
//! the same observation into the Prometheus recorder exposed at `/metrics`.

use std::sync::OnceLock;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Request duration histogram.
pub const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";

/// Request counter.
pub const HTTP_REQUEST_TOTAL: &str = "http_request_total";

const UNMATCHED_ENDPOINT: &str = "unmatched";

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global metrics recorder with the Prometheus exporter.
///
/// Safe to call multiple times; subsequent calls are no-ops. The handle is
/// stored globally for the `/metrics` endpoint.
///
/// # Panics
///
/// Panics if the Prometheus recorder cannot be installed, the server should
/// not start without its metrics endpoint.
#[allow(clippy::panic)]
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .unwrap_or_else(|e| panic!("failed to install prometheus recorder: {e}"));

            describe_histogram!(
                HTTP_REQUEST_DURATION,
                "Duration of HTTP requests in seconds"
            );
            describe_counter!(HTTP_REQUEST_TOTAL, "Total number of HTTP requests");

            tracing::info!("Prometheus metrics recorder initialized");
            handle
        })
        .clone()
}

/// Returns the global Prometheus handle, if initialized.
#[must_use]
pub fn prometheus_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

fn endpoint_label<B>(request: &axum::http::Request<B>) -> String {
    request.extensions().get::<MatchedPath>().map_or_else(
        || UNMATCHED_ENDPOINT.to_string(),
        |path| path.as_str().to_string(),
    )
}

/// Middleware that logs every request and records its metrics.
///
/// Captures:
/// - `http_request_duration_seconds{endpoint, method, status}` - histogram of request durations
/// - `http_request_total{endpoint, method, status}` - counter of total requests
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let uri = request.uri().clone();
    let endpoint = endpoint_label(&request);

    info!("Request: {method} {uri}");

    let response = next.run(request).await;

    let elapsed = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();

    info!("Response: {status} for {method} {uri} in {elapsed:.4}s");

    let labels = [
        ("endpoint", endpoint),
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];

    histogram!(HTTP_REQUEST_DURATION, &labels).record(elapsed);
    counter!(HTTP_REQUEST_TOTAL, &labels).increment(1);

    response
}

/// Handler for the `/metrics` endpoint.
///
/// Returns Prometheus-formatted metrics text.
pub async fn serve_metrics() -> impl IntoResponse {
    prometheus_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain; charset=utf-8")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; charset=utf-8")],
                handle.render(),
            )
        },
    )
}
