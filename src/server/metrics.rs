use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all enrichment server metrics
const PREFIX: &str = "enrichment";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Enrichment Metrics
    pub static ref ENRICHMENT_ITEMS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_items_total"), "Per-item enrichment outcomes"),
        &["job", "outcome"]
    ).expect("Failed to create items_total metric");

    pub static ref ENRICHMENT_BATCHES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_batches_total"), "Enrichment batch invocations"),
        &["job", "status"]
    ).expect("Failed to create batches_total metric");

    pub static ref ENRICHMENT_BATCH_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_batch_duration_seconds"),
            "Enrichment batch duration in seconds"
        )
        .buckets(vec![0.1, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        &["job"]
    ).expect("Failed to create batch_duration_seconds metric");

    // Provider Metrics
    pub static ref PROVIDER_RESPONSES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_provider_responses_total"), "External provider responses by outcome"),
        &["provider", "outcome"]
    ).expect("Failed to create provider_responses_total metric");

    // Error Metrics
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_errors_total"), "Total errors by type and endpoint"),
        &["error_type", "endpoint"]
    ).expect("Failed to create errors_total metric");

    pub static ref PROCESS_MEMORY_BYTES: Gauge = Gauge::new(
        format!("{PREFIX}_process_memory_bytes"),
        "Process memory usage in bytes"
    ).expect("Failed to create process_memory_bytes metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(ENRICHMENT_ITEMS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ENRICHMENT_BATCHES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ENRICHMENT_BATCH_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(PROVIDER_RESPONSES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PROCESS_MEMORY_BYTES.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Record the outcome of one enrichment item
pub fn record_enrichment_item(job: &str, outcome: &str) {
    ENRICHMENT_ITEMS_TOTAL
        .with_label_values(&[job, outcome])
        .inc();
}

/// Record a finished batch invocation
pub fn record_enrichment_batch(job: &str, status: &str, duration: Duration) {
    ENRICHMENT_BATCHES_TOTAL
        .with_label_values(&[job, status])
        .inc();

    ENRICHMENT_BATCH_DURATION_SECONDS
        .with_label_values(&[job])
        .observe(duration.as_secs_f64());
}

/// Record one provider response
pub fn record_provider_response(provider: &str, outcome: &str) {
    PROVIDER_RESPONSES_TOTAL
        .with_label_values(&[provider, outcome])
        .inc();
}

/// Record an error
pub fn record_error(error_type: &str, endpoint: &str) {
    ERRORS_TOTAL
        .with_label_values(&[error_type, endpoint])
        .inc();
}

/// Update process memory usage
pub fn update_memory_usage() {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            for line in status.lines() {
                if let Some(rest) = line.strip_prefix("VmRSS:") {
                    if let Some(kb) = rest
                        .split_whitespace()
                        .next()
                        .and_then(|s| s.parse::<f64>().ok())
                    {
                        PROCESS_MEMORY_BYTES.set(kb * 1024.0);
                        return;
                    }
                }
            }
        }
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    update_memory_usage();

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
