// * Idempotent persistence stage
// * Maps canonical entries onto the storage columns and performs an
// * insert-if-absent keyed on the listing URL. The natural-key uniqueness is
// * enforced by the storage layer itself (UNIQUE column + INSERT OR IGNORE),
// * so concurrent loader invocations from different processes stay safe.
// * Each batch commits as one transaction; on error the whole batch rolls
// * back and nothing is counted.

use crate::ops::telemetry;
use crate::persistence::schema::{ExtendedApplicantEntry, Term};
use rusqlite::{params, Connection};
use serde::Serialize;

/// Storage DDL for the applicants table. The column set is an external
/// contract: names differ from the JSON schema (see `INSERT_SQL` mapping).
pub const APPLICANTS_DDL: &str = "
CREATE TABLE IF NOT EXISTS applicants (
    id                       INTEGER PRIMARY KEY,
    program                  TEXT NOT NULL,
    university               TEXT NOT NULL,
    comments                 TEXT,
    date_added               TEXT NOT NULL,
    url                      TEXT NOT NULL UNIQUE,
    status                   TEXT NOT NULL,
    term                     TEXT,
    acceptance_date          TEXT,
    rejection_date           TEXT,
    us_or_international      TEXT,
    gpa                      REAL,
    gre                      INTEGER,
    gre_v                    INTEGER,
    gre_aw                   REAL,
    degree                   TEXT,
    llm_generated_program    TEXT,
    llm_generated_university TEXT,
    loaded_at                TEXT NOT NULL DEFAULT (datetime('now'))
);
";

// * Fixed translation from canonical fields onto storage columns:
// *   start_term + start_year -> term (composed), citizenship ->
// *   us_or_international, gre_total/gre_verbal/gre_aw -> gre/gre_v/gre_aw,
// *   accept_date/reject_date -> acceptance_date/rejection_date,
// *   program_canon/university_canon -> llm_generated_program/_university.
const INSERT_SQL: &str = "
INSERT OR IGNORE INTO applicants (
    program, university, comments, date_added, url, status, term,
    acceptance_date, rejection_date, us_or_international, gpa, gre, gre_v,
    gre_aw, degree, llm_generated_program, llm_generated_university
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
";

/// Outcome counters for one load call. `attempted == inserted + skipped`
/// holds for every returned value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub attempted: usize,
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Creates the applicants table if absent.
pub fn init_schema(conn: &Connection) -> Result<(), LoadError> {
    conn.execute_batch(APPLICANTS_DDL)?;
    Ok(())
}

/// Loads a batch of entries. A row whose URL already exists in storage is
/// counted as skipped; re-invoking with previously-loaded rows inserts
/// nothing and changes no stored data.
pub fn load_applicants(
    conn: &Connection,
    rows: &[ExtendedApplicantEntry],
) -> Result<LoadStats, LoadError> {
    let mut stats = LoadStats::default();

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(INSERT_SQL)?;
        for row in rows {
            let entry = &row.entry;
            let changed = stmt.execute(params![
                entry.program,
                entry.university,
                entry.comments,
                entry.date_added,
                entry.url,
                entry.status.as_str(),
                compose_term(entry.start_term, entry.start_year),
                entry.accept_date,
                entry.reject_date,
                entry.citizenship.map(|c| c.as_str()),
                entry.gpa,
                entry.gre_total,
                entry.gre_verbal,
                entry.gre_aw,
                entry.degree.map(|d| d.as_str()),
                row.program_canon,
                row.university_canon,
            ])?;

            stats.attempted += 1;
            if changed > 0 {
                stats.inserted += 1;
            } else {
                stats.skipped += 1;
            }
        }
    }
    tx.commit()?;

    telemetry::record_load_outcome(stats.inserted, stats.skipped);
    tracing::info!(
        attempted = stats.attempted,
        inserted = stats.inserted,
        skipped = stats.skipped,
        "load complete"
    );

    Ok(stats)
}

/// Composes the single storage `term` column from start term and year:
/// "Fall 2024", or one side alone when the other is null.
fn compose_term(term: Option<Term>, year: Option<i32>) -> Option<String> {
    match (term, year) {
        (Some(t), Some(y)) => Some(format!("{} {}", t.as_str(), y)),
        (Some(t), None) => Some(t.as_str().to_string()),
        (None, Some(y)) => Some(y.to_string()),
        (None, None) => None,
    }
}
