// * Pipeline orchestration
// * One pull-and-load cycle: fetch -> clean -> enrich -> load, with a
// * snapshot artifact written between stages. Stages run strictly in order;
// * no stage starts before the previous stage's full output exists. A
// * non-blocking gate rejects a second cycle while one is in flight.

use crate::config::constants::{CLEANED_SNAPSHOT, EXTENDED_SNAPSHOT, RAW_SNAPSHOT};
use crate::config::PipelineConfig;
use crate::engine::cleaner::{CleanError, Cleaner};
use crate::enrich::{extend_rows, Canonicalizer, EnrichmentError, HttpCanonicalizer};
use crate::network::{ListingsClient, NetworkError};
use crate::ops::telemetry;
use crate::persistence::loader::{load_applicants, LoadError, LoadStats};
use crate::persistence::schema::{ExtendedApplicantEntry, RawRecord};
use crate::persistence::snapshot::{self, SnapshotError};
use crate::refinery::ListingExtractor;
use rusqlite::Connection;
use serde::Serialize;

/// Errors that abort a pipeline cycle
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("a pull cycle is already running")]
    Busy,

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Clean(#[from] CleanError),

    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Mutual exclusion for pull cycles. A caller that cannot acquire the gate
/// is told so immediately; cycles are never queued.
#[derive(Debug, Default)]
pub struct CycleGate {
    inner: tokio::sync::Mutex<()>,
}

impl CycleGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking acquire; the guard releases the gate on drop.
    pub fn try_acquire(&self) -> Result<tokio::sync::MutexGuard<'_, ()>, PipelineError> {
        self.inner.try_lock().map_err(|_| PipelineError::Busy)
    }
}

/// Counts reported by one completed cycle.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunReport {
    pub scraped: usize,
    pub cleaned: usize,
    pub to_load: usize,
    #[serde(flatten)]
    pub load: LoadStats,
}

/// Drives one full scrape -> clean -> enrich -> load cycle.
pub struct Pipeline {
    config: PipelineConfig,
    gate: CycleGate,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config, gate: CycleGate::new() }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one complete cycle against the given store. Returns `Busy`
    /// immediately when another cycle holds the gate.
    pub async fn run(&self, conn: &Connection) -> Result<RunReport, PipelineError> {
        let _guard = self.gate.try_acquire()?;
        tracing::info!(base_url = %self.config.base_url, "pull cycle started");

        if self.config.force_fresh {
            for name in [RAW_SNAPSHOT, CLEANED_SNAPSHOT, EXTENDED_SNAPSHOT] {
                snapshot::remove_if_present(&self.config.data_dir.join(name));
            }
        }

        let raw = self.fetch_all().await?;

        if self.config.use_llm {
            let canonicalizer = HttpCanonicalizer::new(
                self.config.enrich_url.clone(),
                self.config.enrich_timeout,
            )?;
            self.process(raw, conn, Some(&canonicalizer)).await
        } else {
            self.process::<HttpCanonicalizer>(raw, conn, None).await
        }
    }

    /// The crawl loop: sequential page fetches separated by a fixed delay.
    /// The first empty or row-less page ends the loop cleanly with whatever
    /// was collected so far; it is not an error.
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, PipelineError> {
        let client = ListingsClient::new(self.config.base_url.clone())?;
        let mut raw: Vec<RawRecord> = Vec::new();

        let start = self.config.start_page;
        let end = start.saturating_add(self.config.max_pages);
        for page in start..end {
            let page_url = client.page_url(page);
            tracing::info!(page, url = %page_url, "fetching listings page");

            let html = match client.fetch_page(&page_url).await {
                Ok(html) => html,
                Err(error) => {
                    tracing::warn!(page, %error, "page fetch failed; ending crawl");
                    telemetry::record_page_fetched(false);
                    break;
                }
            };
            telemetry::record_page_fetched(true);

            if html.trim().is_empty() {
                tracing::warn!(page, "empty page body; ending crawl");
                break;
            }

            let rows = ListingExtractor::extract_page(&html, &page_url);
            if rows.is_empty() {
                tracing::info!(page, "no rows detected; ending crawl");
                break;
            }

            telemetry::record_rows_extracted(rows.len());
            tracing::info!(page, rows = rows.len(), total = raw.len() + rows.len(), "page parsed");
            raw.extend(rows);

            tokio::time::sleep(self.config.page_delay).await;
        }

        Ok(raw)
    }

    /// Clean, optionally enrich, and load already-fetched raw rows. Public
    /// so callers with their own row source (tests, replays from a raw
    /// snapshot) can drive the back half of the cycle.
    pub async fn process<C: Canonicalizer + ?Sized>(
        &self,
        raw: Vec<RawRecord>,
        conn: &Connection,
        canonicalizer: Option<&C>,
    ) -> Result<RunReport, PipelineError> {
        let data_dir = &self.config.data_dir;
        snapshot::save_json(&raw, &data_dir.join(RAW_SNAPSHOT))?;
        tracing::info!(rows = raw.len(), "raw snapshot written");

        let cleaner = Cleaner::with_flags(self.config.bounds, true, self.config.validate);
        let cleaned = cleaner.clean(&raw)?;
        snapshot::save_json(&cleaned, &data_dir.join(CLEANED_SNAPSHOT))?;

        let cleaned_count = cleaned.len();
        let extended: Vec<ExtendedApplicantEntry> = match canonicalizer {
            Some(canonicalizer) => {
                let extended = extend_rows(
                    cleaned,
                    canonicalizer,
                    &self.config.bounds,
                    self.config.validate,
                )
                .await;
                snapshot::save_json(&extended, &data_dir.join(EXTENDED_SNAPSHOT))?;
                extended
            }
            None => cleaned.into_iter().map(ExtendedApplicantEntry::from).collect(),
        };

        let load = load_applicants(conn, &extended)?;

        Ok(RunReport {
            scraped: raw.len(),
            cleaned: cleaned_count,
            to_load: extended.len(),
            load,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_rejects_second_acquire() {
        let gate = CycleGate::new();
        let guard = gate.try_acquire().expect("first acquire succeeds");

        assert!(matches!(gate.try_acquire(), Err(PipelineError::Busy)));
        drop(guard);
        assert!(gate.try_acquire().is_ok());
    }

    #[test]
    fn test_report_serializes_flat() {
        let report = RunReport {
            scraped: 10,
            cleaned: 8,
            to_load: 8,
            load: LoadStats { attempted: 8, inserted: 6, skipped: 2 },
        };

        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["scraped"], 10);
        assert_eq!(json["attempted"], 8);
        assert_eq!(json["inserted"], 6);
        assert_eq!(json["skipped"], 2);
    }
}
