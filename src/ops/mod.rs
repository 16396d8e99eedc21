// * Operations & observability
// * Structured logging and metrics for the pipeline stages.

pub mod telemetry;

// * Re-exports for convenient access
pub use telemetry::{
    get_metrics_string, init_tracing, init_tracing_pretty, record_enrichment_degraded,
    record_enrichment_rollback, record_load_outcome, record_page_fetched, record_row_dropped,
    record_rows_extracted,
};
