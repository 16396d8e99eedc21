// * LLM Canonicalization boundary
// * An external batch service maps free-text "program, university" pairs to
// * canonical labels. The contract preserved here: ordered 1:1 labels per
// * input, graceful degradation to null labels when the service is
// * unavailable, and per-row atomic merge with validation-triggered
// * rollback. The transport behind the trait is interchangeable.

pub mod client;

// * Re-exports for convenient access
pub use client::HttpCanonicalizer;

use crate::ops::telemetry;
use crate::persistence::schema::{CanonicalApplicantEntry, CleanBounds, ExtendedApplicantEntry};
use std::future::Future;
use std::pin::Pin;

/// Canonical labels for one input row. None means the service declined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonLabel {
    pub program_canon: Option<String>,
    pub university_canon: Option<String>,
}

/// Type alias for async result
pub type AsyncResult<T> = Pin<Box<dyn Future<Output = Result<T, EnrichmentError>> + Send>>;

/// Boundary to the canonicalization service.
pub trait Canonicalizer: Send + Sync {
    /// Submits one batch of texts and returns one label per input, in order.
    fn canonize_batch(&self, texts: Vec<String>) -> AsyncResult<Vec<CanonLabel>>;
}

/// Errors that can occur during enrichment
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    #[error("enrichment transport failed: {0}")]
    Transport(String),

    #[error("enrichment response unreadable: {0}")]
    Malformed(String),
}

/// Runs the enrichment stage over cleaned rows. Never fails: a transport or
/// service error degrades the whole batch to null labels, and a label-count
/// mismatch is reconciled by truncating or padding with null labels.
pub async fn extend_rows<C: Canonicalizer + ?Sized>(
    rows: Vec<CanonicalApplicantEntry>,
    canonicalizer: &C,
    bounds: &CleanBounds,
    validate: bool,
) -> Vec<ExtendedApplicantEntry> {
    if rows.is_empty() {
        tracing::warn!("enrichment skipped: no rows");
        return Vec::new();
    }

    let texts: Vec<String> = rows.iter().map(|r| batch_text(&r.program, &r.university)).collect();

    let mut labels = match canonicalizer.canonize_batch(texts).await {
        Ok(labels) => labels,
        Err(error) => {
            tracing::warn!(%error, "enrichment unavailable; degrading batch to null labels");
            telemetry::record_enrichment_degraded();
            vec![CanonLabel::default(); rows.len()]
        }
    };

    if labels.len() != rows.len() {
        tracing::warn!(
            rows = rows.len(),
            labels = labels.len(),
            "label count mismatch; reconciling"
        );
        labels.resize(rows.len(), CanonLabel::default());
    }

    rows.into_iter()
        .zip(labels)
        .map(|(entry, label)| merge_label(entry, label, bounds, validate))
        .collect()
}

/// Builds the service input text: "program, university" with a dangling
/// separator trimmed when either side is empty.
fn batch_text(program: &str, university: &str) -> String {
    format!("{}, {}", program.trim(), university.trim())
        .trim_matches(|c| c == ',' || c == ' ')
        .to_string()
}

/// Applies one label to one row. The primary fields are overridden only by
/// non-empty canonical values; the canon fields are always attached (null
/// when the service declined). When validation fails afterwards the whole
/// merge is undone for this row only.
fn merge_label(
    entry: CanonicalApplicantEntry,
    label: CanonLabel,
    bounds: &CleanBounds,
    validate: bool,
) -> ExtendedApplicantEntry {
    let original_program = entry.program.clone();
    let original_university = entry.university.clone();

    let program_canon =
        label.program_canon.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let university_canon =
        label.university_canon.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let mut out = ExtendedApplicantEntry {
        entry,
        program_canon: program_canon.clone(),
        university_canon: university_canon.clone(),
    };
    if let Some(program) = program_canon {
        out.entry.program = program;
    }
    if let Some(university) = university_canon {
        out.entry.university = university;
    }

    if validate {
        if let Err(error) = out.validate(bounds) {
            tracing::info!(%error, url = %out.entry.url, "post-merge validation failed; rolling back");
            telemetry::record_enrichment_rollback();
            out.entry.program = original_program;
            out.entry.university = original_university;
            out.program_canon = None;
            out.university_canon = None;
        }
    }

    out
}
