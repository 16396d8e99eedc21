// * Persistence
// * Typed record schema, snapshot artifacts, and the idempotent loader.

pub mod loader;
pub mod schema;
pub mod snapshot;

// * Re-exports for convenient access
pub use loader::{init_schema, load_applicants, LoadError, LoadStats, APPLICANTS_DDL};
pub use schema::{
    CanonicalApplicantEntry, Citizenship, CleanBounds, Degree, ExtendedApplicantEntry, RawRecord,
    SchemaError, Status, Term,
};
pub use snapshot::{load_json, save_json, SnapshotError};
