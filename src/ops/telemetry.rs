// * Telemetry - JSON logging and Prometheus metrics
// * Structured logging for every pipeline stage plus counters suitable for
// * scraping into an external metrics stack. The dashboard surface is an
// * external collaborator, so no exporter server lives here; callers render
// * the registry with `get_metrics_string`.

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_int_counter, CounterVec, Encoder, IntCounter, TextEncoder};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

lazy_static! {
    // * Pages fetched by outcome
    pub static ref PAGES_FETCHED_TOTAL: CounterVec = register_counter_vec!(
        "admitflow_pages_fetched_total",
        "Total listings pages fetched by outcome",
        &["outcome"]
    ).unwrap();

    // * Raw rows produced by extraction
    pub static ref ROWS_EXTRACTED_TOTAL: IntCounter = register_int_counter!(
        "admitflow_rows_extracted_total",
        "Total raw rows produced by the row extractor"
    ).unwrap();

    // * Rows removed during cleaning, by reason
    pub static ref ROWS_DROPPED_TOTAL: CounterVec = register_counter_vec!(
        "admitflow_rows_dropped_total",
        "Rows dropped during cleaning by reason",
        &["reason"]
    ).unwrap();

    // * Loader outcomes per attempted row
    pub static ref ROWS_LOADED_TOTAL: CounterVec = register_counter_vec!(
        "admitflow_rows_loaded_total",
        "Loader outcomes per attempted row",
        &["outcome"]
    ).unwrap();

    // * Enrichment batches that degraded to null labels
    pub static ref ENRICHMENT_DEGRADED_TOTAL: IntCounter = register_int_counter!(
        "admitflow_enrichment_degraded_total",
        "Enrichment batches degraded to all-null labels"
    ).unwrap();

    // * Per-row enrichment merges undone by validation
    pub static ref ENRICHMENT_ROLLBACKS_TOTAL: IntCounter = register_int_counter!(
        "admitflow_enrichment_rollbacks_total",
        "Enrichment merges rolled back after validation failure"
    ).unwrap();
}

/// Initializes the tracing subscriber with JSON formatting
///
/// # Example
/// ```ignore
/// use admit_flow::ops::telemetry;
///
/// telemetry::init_tracing();
/// tracing::info!(page = 3, "Fetching listings page");
/// ```
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .init();
}

/// Initializes tracing with human-readable output (development)
pub fn init_tracing_pretty() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().pretty())
        .init();
}

// * Recording helpers used by the pipeline stages

pub fn record_page_fetched(ok: bool) {
    let outcome = if ok { "ok" } else { "failed" };
    PAGES_FETCHED_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_rows_extracted(count: usize) {
    ROWS_EXTRACTED_TOTAL.inc_by(count as u64);
}

pub fn record_row_dropped(reason: &str) {
    ROWS_DROPPED_TOTAL.with_label_values(&[reason]).inc();
}

pub fn record_load_outcome(inserted: usize, skipped: usize) {
    ROWS_LOADED_TOTAL.with_label_values(&["inserted"]).inc_by(inserted as f64);
    ROWS_LOADED_TOTAL.with_label_values(&["skipped"]).inc_by(skipped as f64);
}

pub fn record_enrichment_degraded() {
    ENRICHMENT_DEGRADED_TOTAL.inc();
}

pub fn record_enrichment_rollback() {
    ENRICHMENT_ROLLBACKS_TOTAL.inc();
}

/// Renders all registered metrics in Prometheus text exposition format
pub fn get_metrics_string() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}
