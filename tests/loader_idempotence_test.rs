use admit_flow::engine::Cleaner;
use admit_flow::persistence::loader::{init_schema, load_applicants, LoadStats};
use admit_flow::persistence::schema::{CleanBounds, ExtendedApplicantEntry, RawRecord};
use rusqlite::Connection;
use serde_json::json;

// * Test Suite for the idempotent loader

fn raw_row(url: &str, status: &str) -> RawRecord {
    json!({
        "program": "Computer Science",
        "university": "MIT",
        "date_added": "2024-01-05",
        "url": url,
        "status": status,
    })
    .as_object()
    .cloned()
    .unwrap()
}

fn cleaned_rows(rows: &[RawRecord]) -> Vec<ExtendedApplicantEntry> {
    Cleaner::new(CleanBounds::default())
        .clean(rows)
        .unwrap()
        .into_iter()
        .map(ExtendedApplicantEntry::from)
        .collect()
}

fn store() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

fn count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM applicants", [], |r| r.get(0)).unwrap()
}

#[test]
fn test_end_to_end_dedupe_then_idempotent_load() {
    // * Two raw rows share one URL; cleaning keeps the first, loading it
    // * twice inserts exactly once
    let conn = store();
    let rows = [raw_row("https://x/1", "Accepted"), raw_row("https://x/1", "Rejected")];

    let to_load = cleaned_rows(&rows);
    assert_eq!(to_load.len(), 1);

    let first = load_applicants(&conn, &to_load).unwrap();
    assert_eq!(first, LoadStats { attempted: 1, inserted: 1, skipped: 0 });

    let second = load_applicants(&conn, &to_load).unwrap();
    assert_eq!(second, LoadStats { attempted: 1, inserted: 0, skipped: 1 });

    assert_eq!(count(&conn), 1);
}

#[test]
fn test_count_identity_on_every_call() {
    let conn = store();
    let batches: Vec<Vec<ExtendedApplicantEntry>> = vec![
        cleaned_rows(&[raw_row("https://x/1", "Accepted")]),
        cleaned_rows(&[raw_row("https://x/1", "Accepted"), raw_row("https://x/2", "Rejected")]),
        Vec::new(),
    ];

    for batch in &batches {
        let stats = load_applicants(&conn, batch).unwrap();
        assert_eq!(stats.attempted, batch.len());
        assert_eq!(stats.attempted, stats.inserted + stats.skipped);
    }
}

#[test]
fn test_subset_reload_inserts_nothing() {
    let conn = store();
    let all = cleaned_rows(&[
        raw_row("https://x/1", "Accepted"),
        raw_row("https://x/2", "Rejected"),
        raw_row("https://x/3", "Interview"),
    ]);
    load_applicants(&conn, &all).unwrap();
    let before = count(&conn);

    let subset = &all[..2];
    let stats = load_applicants(&conn, subset).unwrap();
    assert_eq!(stats.inserted, 0);
    assert_eq!(stats.skipped, subset.len());
    assert_eq!(count(&conn), before);
}

#[test]
fn test_storage_enforces_url_uniqueness() {
    // * The unique constraint lives at the storage boundary, so a second
    // * connection-level insert for the same URL is also a no-op
    let conn = store();
    let rows = cleaned_rows(&[raw_row("https://x/unique", "Accepted")]);
    load_applicants(&conn, &rows).unwrap();

    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO applicants
             (program, university, date_added, url, status)
             VALUES ('P', 'U', '2024-01-01', 'https://x/unique', 'Pending')",
            [],
        )
        .unwrap();
    assert_eq!(changed, 0);
}
