// * Binary entry point
// * Reads configuration from ADMITFLOW_* environment variables, runs one
// * pull-and-load cycle, and prints the run report as JSON.

use admit_flow::config::{constants, PipelineConfig};
use admit_flow::engine::{Pipeline, PipelineError};
use admit_flow::ops::telemetry;
use admit_flow::persistence::loader;
use admit_flow::persistence::schema::CleanBounds;
use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();

    let base_url = match std::env::var("ADMITFLOW_BASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            tracing::error!("ADMITFLOW_BASE_URL must point at the listings site");
            std::process::exit(2);
        }
    };

    let bounds = match CleanBounds::new(
        env_parsed("ADMITFLOW_GPA_MAX", constants::DEFAULT_GPA_MAX),
        env_parsed("ADMITFLOW_YEAR_MIN", constants::DEFAULT_YEAR_MIN),
        env_parsed("ADMITFLOW_YEAR_MAX", constants::DEFAULT_YEAR_MAX),
    ) {
        Ok(bounds) => bounds,
        Err(error) => {
            tracing::error!(%error, "invalid cleaning bounds");
            std::process::exit(2);
        }
    };

    let config = PipelineConfig {
        base_url,
        start_page: env_parsed("ADMITFLOW_START_PAGE", constants::DEFAULT_START_PAGE),
        max_pages: env_parsed("ADMITFLOW_PAGES", constants::DEFAULT_MAX_PAGES),
        page_delay: Duration::from_millis(env_parsed(
            "ADMITFLOW_DELAY_MS",
            constants::DEFAULT_PAGE_DELAY_MS,
        )),
        use_llm: env_flag("ADMITFLOW_USE_LLM", false),
        force_fresh: env_flag("ADMITFLOW_FORCE", false),
        data_dir: PathBuf::from(
            std::env::var("ADMITFLOW_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        ),
        enrich_url: std::env::var("ADMITFLOW_LLM_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000/canonize".to_string()),
        enrich_timeout: Duration::from_millis(env_parsed(
            "ADMITFLOW_LLM_TIMEOUT_MS",
            constants::DEFAULT_ENRICH_TIMEOUT_MS,
        )),
        validate: env_flag("ADMITFLOW_VALIDATE", true),
        bounds,
    };

    let db_path =
        std::env::var("ADMITFLOW_DB").unwrap_or_else(|_| "data/admitflow.sqlite".to_string());
    if let Some(parent) = PathBuf::from(&db_path).parent() {
        if let Err(error) = std::fs::create_dir_all(parent) {
            tracing::error!(%error, "cannot create database directory");
            std::process::exit(1);
        }
    }

    let conn = match Connection::open(&db_path) {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!(%error, %db_path, "cannot open store");
            std::process::exit(1);
        }
    };
    if let Err(error) = conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;") {
        tracing::warn!(%error, "could not apply store pragmas");
    }
    if let Err(error) = loader::init_schema(&conn) {
        tracing::error!(%error, "cannot initialize store schema");
        std::process::exit(1);
    }

    let pipeline = Pipeline::new(config);
    match pipeline.run(&conn).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        }
        Err(PipelineError::Busy) => {
            tracing::error!("a pull cycle is already running; try again shortly");
            std::process::exit(3);
        }
        Err(error) => {
            tracing::error!(%error, "pull cycle failed");
            std::process::exit(1);
        }
    }
}
