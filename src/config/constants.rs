// * Configuration Constants
// * Central location for all configurable bounds, timeouts, and policy knobs

// * HTTP identity sent with every listings request
pub const USER_AGENT: &str = "admit-flow/0.1 (polite archive sync)";

// * Connect / read timeouts in milliseconds
pub const CONNECT_TIMEOUT_MS: u64 = 5_000;
pub const READ_TIMEOUT_MS: u64 = 15_000;

// * Retry policy for transient upstream failures
pub const MAX_FETCH_RETRIES: u32 = 3;
pub const RETRY_BACKOFF_FACTOR_MS: u64 = 300;
pub const RETRY_STATUS_CODES: [u16; 4] = [500, 502, 503, 504];

// * Crawl loop defaults
pub const DEFAULT_START_PAGE: u32 = 1;
pub const DEFAULT_MAX_PAGES: u32 = 12;
pub const DEFAULT_PAGE_DELAY_MS: u64 = 800;

// * Enrichment service defaults
pub const DEFAULT_ENRICH_TIMEOUT_MS: u64 = 120_000;

// * Cleaning bounds defaults
pub const DEFAULT_GPA_MAX: f64 = 5.0;
pub const DEFAULT_YEAR_MIN: i32 = 1950;
pub const DEFAULT_YEAR_MAX: i32 = 2035;

// * Fixed GRE score bounds
pub const GRE_TOTAL_MIN: i64 = 260;
pub const GRE_TOTAL_MAX: i64 = 340;
pub const GRE_VERBAL_MIN: i64 = 130;
pub const GRE_VERBAL_MAX: i64 = 170;
pub const GRE_AW_MIN: f64 = 0.0;
pub const GRE_AW_MAX: f64 = 6.0;

// * UI chatter tokens that leak into badge text and must be trimmed off
pub const UI_CHATTER_TOKENS: [&str; 4] = ["Total comments", "Open options", "See More", "Report"];

// * Snapshot artifact filenames (relative to the configured data dir)
pub const RAW_SNAPSHOT: &str = "applicant_data.json";
pub const CLEANED_SNAPSHOT: &str = "applicant_data_cleaned.json";
pub const EXTENDED_SNAPSHOT: &str = "llm_extend_applicant_data.json";
