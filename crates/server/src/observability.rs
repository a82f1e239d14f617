use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, Encoder, Histogram, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "experience_gateway_requests_total",
        "Total composite requests handled by the gateway"
    )
    .expect("register requests_total")
});

pub static UPSTREAM_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "experience_gateway_upstream_errors_total",
        "Total requests failed by a strict upstream dependency"
    )
    .expect("register upstream_errors_total")
});

pub static SIDE_FETCH_DEGRADED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "experience_gateway_side_fetch_degraded_total",
        "Side fetches degraded to an empty field in a merged view"
    )
    .expect("register side_fetch_degraded_total")
});

pub static SEARCH_DEGRADED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "experience_gateway_search_degraded_total",
        "Unified searches answered empty because the backend was unreachable"
    )
    .expect("register search_degraded_total")
});

pub static REQUEST_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "experience_gateway_request_duration_seconds",
        "Composite request duration in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register request_duration")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
