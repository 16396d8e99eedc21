// * Pipeline configuration
// * One struct drives a full pull-and-load cycle; the binary fills it from
// * environment variables, tests construct it directly.

pub mod constants;

use crate::persistence::schema::CleanBounds;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Listings URL to crawl; a `page=` query parameter is replaced or appended.
    pub base_url: String,
    /// First page number to fetch.
    pub start_page: u32,
    /// Maximum number of consecutive pages to visit.
    pub max_pages: u32,
    /// Fixed politeness delay between page requests.
    pub page_delay: Duration,
    /// Run the LLM canonicalization stage.
    pub use_llm: bool,
    /// Remove prior snapshot artifacts before starting.
    pub force_fresh: bool,
    /// Directory receiving snapshot artifacts.
    pub data_dir: PathBuf,
    /// Enrichment service endpoint (ignored when `use_llm` is false).
    pub enrich_url: String,
    /// Upper bound on the whole enrichment batch call.
    pub enrich_timeout: Duration,
    /// Enable the strict typed-schema gate during cleaning and enrichment.
    pub validate: bool,
    /// Numeric bounds applied by the cleaner and the strict gate.
    pub bounds: CleanBounds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            start_page: constants::DEFAULT_START_PAGE,
            max_pages: constants::DEFAULT_MAX_PAGES,
            page_delay: Duration::from_millis(constants::DEFAULT_PAGE_DELAY_MS),
            use_llm: false,
            force_fresh: false,
            data_dir: PathBuf::from("data"),
            enrich_url: String::new(),
            enrich_timeout: Duration::from_millis(constants::DEFAULT_ENRICH_TIMEOUT_MS),
            validate: true,
            bounds: CleanBounds::default(),
        }
    }
}
