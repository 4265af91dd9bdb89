//! Prometheus metrics for monitoring the demo service.

use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

use crate::{callback::CallbackResult, error::ApiError, par::ParResponse};

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let builder = PrometheusBuilder::new();

    // Configure histogram buckets for request duration (in seconds)
    let builder = builder.set_buckets_for_metric(
        Matcher::Full("http_request_duration_seconds".to_string()),
        &[
            0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ],
    )?;

    let handle = builder.install_recorder()?;

    Ok(handle)
}

/// Middleware to record HTTP request metrics
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();

    // Label by route template so unknown paths cannot blow up cardinality
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());

    let response: Response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(duration);

    response
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}

/// Record the outcome of a pushed authorization request
pub fn record_par_request(result: &Result<ParResponse, ApiError>) {
    counter!("agekey_par_requests_total", "outcome" => par_outcome(result)).increment(1);
}

/// Record how a callback was interpreted
pub fn record_callback(result: &CallbackResult) {
    counter!(
        "agekey_callbacks_total",
        "flow" => result.flow_label(),
        "outcome" => result.outcome().as_str()
    )
    .increment(1);
}

const fn par_outcome(result: &Result<ParResponse, ApiError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(ApiError::Validation(_)) => "invalid_request",
        Err(ApiError::Configuration(_)) => "misconfigured",
        Err(ApiError::Upstream { .. }) => "upstream_error",
        Err(ApiError::Internal(_) | ApiError::Template(_)) => "internal_error",
    }
}
