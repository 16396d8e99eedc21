// * Cleaning stage
// * Projects raw rows onto the fixed schema, drives the Field Normalizer
// * field by field, enforces the required-field gate, and owns
// * deduplication by listing URL. Structural incompleteness drops a row
// * silently; a strict-validation failure aborts the whole clean.

use crate::config::constants::{
    GRE_AW_MAX, GRE_AW_MIN, GRE_TOTAL_MAX, GRE_TOTAL_MIN, GRE_VERBAL_MAX, GRE_VERBAL_MIN,
};
use crate::engine::normalization;
use crate::ops::telemetry;
use crate::persistence::schema::{CanonicalApplicantEntry, CleanBounds, RawRecord, SchemaError};
use serde_json::Value;
use std::collections::HashSet;
use xxhash_rust::xxh64::xxh64;

/// Errors that abort a cleaning run
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("strict schema validation failed: {0}")]
    Validation(#[from] SchemaError),
}

/// Cleans scraped rows into the canonical schema.
pub struct Cleaner {
    bounds: CleanBounds,
    dedupe_by_url: bool,
    validate: bool,
}

impl Cleaner {
    /// Creates a cleaner with dedupe and strict validation enabled.
    pub fn new(bounds: CleanBounds) -> Self {
        Self { bounds, dedupe_by_url: true, validate: true }
    }

    pub fn with_flags(bounds: CleanBounds, dedupe_by_url: bool, validate: bool) -> Self {
        Self { bounds, dedupe_by_url, validate }
    }

    /// Cleans a batch of raw rows. Output order is input order, minus
    /// dropped rows and later duplicates.
    pub fn clean(&self, rows: &[RawRecord]) -> Result<Vec<CanonicalApplicantEntry>, CleanError> {
        let total = rows.len();
        let mut kept: Vec<CanonicalApplicantEntry> = Vec::with_capacity(total);
        let mut dropped = 0usize;

        for raw in rows {
            let entry = match self.shape(raw) {
                Some(entry) => entry,
                None => {
                    dropped += 1;
                    telemetry::record_row_dropped("missing_required");
                    continue;
                }
            };

            if self.validate {
                entry.validate(&self.bounds)?;
            }

            kept.push(entry);
        }

        let before_dedupe = kept.len();
        let cleaned = if self.dedupe_by_url { Self::dedupe_by_url(kept) } else { kept };
        let duplicates = before_dedupe - cleaned.len();
        for _ in 0..duplicates {
            telemetry::record_row_dropped("duplicate_url");
        }

        tracing::info!(total, kept = cleaned.len(), dropped, duplicates, "cleaning complete");
        Ok(cleaned)
    }

    /// Projects one raw row onto the schema and normalizes every field.
    /// Returns None when a required field is missing or empty after
    /// normalization.
    fn shape(&self, raw: &RawRecord) -> Option<CanonicalApplicantEntry> {
        let field = |key: &str| raw.get(key).unwrap_or(&Value::Null);
        let text = |key: &str| normalization::norm_value(field(key));

        // * Required fields gate the row
        let program = text("program")?;
        let university = text("university")?;
        let url = text("url")?;
        let status = text("status").and_then(|s| normalization::status(&s))?;
        let date_added = text("date_added").and_then(|s| normalization::date_iso(&s))?;

        // * Decision dates borrow their year from the publish date
        let default_year = date_added.get(..4).and_then(|p| p.parse::<i32>().ok());
        let accept_date =
            text("accept_date").and_then(|s| normalization::badge_date(&s, default_year));
        let reject_date =
            text("reject_date").and_then(|s| normalization::badge_date(&s, default_year));

        let start_year = normalization::parse_int(field("start_year"))
            .filter(|y| *y >= self.bounds.year_min as i64 && *y <= self.bounds.year_max as i64)
            .map(|y| y as i32);

        let gpa = normalization::parse_float(field("gpa"))
            .filter(|g| (0.0..=self.bounds.gpa_max).contains(g));
        let gre_total = normalization::parse_int(field("gre_total"))
            .filter(|v| (GRE_TOTAL_MIN..=GRE_TOTAL_MAX).contains(v));
        let gre_verbal = normalization::parse_int(field("gre_verbal"))
            .filter(|v| (GRE_VERBAL_MIN..=GRE_VERBAL_MAX).contains(v));
        let gre_aw = normalization::parse_float(field("gre_aw"))
            .filter(|v| (GRE_AW_MIN..=GRE_AW_MAX).contains(v));

        Some(CanonicalApplicantEntry {
            program,
            university,
            date_added,
            url,
            status,
            comments: text("comments"),
            accept_date,
            reject_date,
            start_term: text("start_term").and_then(|s| normalization::term(&s)),
            start_year,
            citizenship: text("citizenship").and_then(|s| normalization::citizenship(&s)),
            gre_total,
            gre_verbal,
            gre_aw,
            degree: text("degree").and_then(|s| normalization::degree(&s)),
            gpa,
        })
    }

    /// Keeps the first row per distinct trimmed URL. Rows with an empty URL
    /// bypass dedupe; the required-field gate makes that branch unreachable
    /// in practice, but it must not panic if it occurs.
    fn dedupe_by_url(rows: Vec<CanonicalApplicantEntry>) -> Vec<CanonicalApplicantEntry> {
        let mut seen: HashSet<u64> = HashSet::new();
        let mut out = Vec::with_capacity(rows.len());

        for entry in rows {
            let key = entry.url.trim();
            if key.is_empty() {
                out.push(entry);
                continue;
            }
            if seen.insert(xxh64(key.as_bytes(), 0)) {
                out.push(entry);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::schema::{Citizenship, Degree, Status, Term};
    use serde_json::json;

    fn raw(fields: serde_json::Value) -> RawRecord {
        fields.as_object().cloned().expect("test row must be an object")
    }

    fn full_raw(url: &str) -> RawRecord {
        raw(json!({
            "program": "Computer Science",
            "university": "MIT",
            "date_added": "Jan 5, 2024",
            "url": url,
            "status": "Accepted",
            "accept_date": "3 Jan",
            "start_term": "Fall",
            "start_year": 2024,
            "citizenship": "International",
            "gre_total": 325,
            "gre_verbal": 160,
            "gre_aw": 4.5,
            "degree": "PhD",
            "gpa": 3.8,
        }))
    }

    #[test]
    fn test_full_row_normalizes() {
        let cleaner = Cleaner::new(CleanBounds::default());
        let cleaned = cleaner.clean(&[full_raw("https://x/1")]).unwrap();
        assert_eq!(cleaned.len(), 1);

        let entry = &cleaned[0];
        assert_eq!(entry.date_added, "2024-01-05");
        assert_eq!(entry.status, Status::Accepted);
        assert_eq!(entry.accept_date.as_deref(), Some("2024-01-03"));
        assert_eq!(entry.start_term, Some(Term::Fall));
        assert_eq!(entry.start_year, Some(2024));
        assert_eq!(entry.citizenship, Some(Citizenship::International));
        assert_eq!(entry.degree, Some(Degree::PhD));
        assert_eq!(entry.gpa, Some(3.8));
    }

    #[test]
    fn test_missing_required_field_drops_row() {
        let cleaner = Cleaner::new(CleanBounds::default());

        let mut no_university = full_raw("https://x/1");
        no_university.insert("university".into(), Value::Null);
        assert!(cleaner.clean(&[no_university]).unwrap().is_empty());

        let mut blank_program = full_raw("https://x/2");
        blank_program.insert("program".into(), Value::from("   "));
        assert!(cleaner.clean(&[blank_program]).unwrap().is_empty());

        let mut no_status = full_raw("https://x/3");
        no_status.insert("status".into(), Value::from(""));
        assert!(cleaner.clean(&[no_status]).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_numerics_are_nulled_not_clamped() {
        let cleaner = Cleaner::new(CleanBounds::default());

        let mut row = full_raw("https://x/1");
        row.insert("gpa".into(), Value::from(9.9));
        row.insert("gre_total".into(), Value::from(400));
        row.insert("gre_verbal".into(), Value::from(129));
        row.insert("gre_aw".into(), Value::from(6.5));
        row.insert("start_year".into(), Value::from(1800));

        let cleaned = cleaner.clean(&[row]).unwrap();
        let entry = &cleaned[0];
        assert_eq!(entry.gpa, None);
        assert_eq!(entry.gre_total, None);
        assert_eq!(entry.gre_verbal, None);
        assert_eq!(entry.gre_aw, None);
        assert_eq!(entry.start_year, None);
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let cleaner = Cleaner::new(CleanBounds::default());
        let mut row = full_raw("https://x/1");
        row.insert("mood".into(), Value::from("hopeful"));

        let cleaned = cleaner.clean(&[row]).unwrap();
        let json = serde_json::to_value(&cleaned[0]).unwrap();
        assert!(json.get("mood").is_none());
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence_in_input_order() {
        let cleaner = Cleaner::new(CleanBounds::default());

        let mut first = full_raw("https://x/1");
        first.insert("status".into(), Value::from("Accepted"));
        let mut second = full_raw("https://x/1");
        second.insert("status".into(), Value::from("Rejected"));
        let third = full_raw("https://x/2");

        let cleaned = cleaner.clean(&[first, second, third]).unwrap();
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].status, Status::Accepted);
        assert_eq!(cleaned[0].url, "https://x/1");
        assert_eq!(cleaned[1].url, "https://x/2");
    }

    #[test]
    fn test_dedupe_trims_url_whitespace() {
        let cleaner = Cleaner::new(CleanBounds::default());
        let rows = [full_raw("https://x/1"), full_raw("  https://x/1  ")];
        let cleaned = cleaner.clean(&rows).unwrap();
        assert_eq!(cleaned.len(), 1);
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let cleaner = Cleaner::new(CleanBounds::default());
        let rows = [full_raw("https://x/1"), full_raw("https://x/1"), full_raw("https://x/2")];

        let once = cleaner.clean(&rows).unwrap();
        let twice = cleaner.clean(&rows).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_gpa_cap() {
        let bounds = CleanBounds::new(4.0, 1950, 2035).unwrap();
        let cleaner = Cleaner::new(bounds);

        let mut row = full_raw("https://x/1");
        row.insert("gpa".into(), Value::from(4.3));
        let cleaned = cleaner.clean(&[row]).unwrap();
        assert_eq!(cleaned[0].gpa, None);
    }

    #[test]
    fn test_unknown_status_text_survives_as_pending() {
        let cleaner = Cleaner::new(CleanBounds::default());
        let mut row = full_raw("https://x/1");
        row.insert("status".into(), Value::from("Accepted via E-mail"));

        let cleaned = cleaner.clean(&[row]).unwrap();
        assert_eq!(cleaned[0].status, Status::Pending);
    }
}
