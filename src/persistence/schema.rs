// * Canonical record schema for applicant result entries
// * Defines the typed persisted unit, its closed vocabularies, and the
// * strict-validation bounds applied during cleaning and enrichment.

use crate::config::constants::{
    DEFAULT_GPA_MAX, DEFAULT_YEAR_MAX, DEFAULT_YEAR_MIN, GRE_AW_MAX, GRE_AW_MIN, GRE_TOTAL_MAX,
    GRE_TOTAL_MIN, GRE_VERBAL_MAX, GRE_VERBAL_MIN,
};
use serde::{Deserialize, Serialize};

/// Loosely-typed row as produced by extraction. No guarantees on presence or
/// type of any field; it exists only between extraction and cleaning.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Decision status, closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Accepted,
    Rejected,
    Interview,
    Waitlisted,
    Pending,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Accepted => "Accepted",
            Status::Rejected => "Rejected",
            Status::Interview => "Interview",
            Status::Waitlisted => "Waitlisted",
            Status::Pending => "Pending",
        }
    }
}

/// Degree sought, closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Degree {
    Masters,
    PhD,
    MFA,
    MBA,
    JD,
    EdD,
    PsyD,
    Other,
}

impl Degree {
    pub fn as_str(&self) -> &'static str {
        match self {
            Degree::Masters => "Masters",
            Degree::PhD => "PhD",
            Degree::MFA => "MFA",
            Degree::MBA => "MBA",
            Degree::JD => "JD",
            Degree::EdD => "EdD",
            Degree::PsyD => "PsyD",
            Degree::Other => "Other",
        }
    }
}

/// Program start term, closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Fall,
    Spring,
    Summer,
}

impl Term {
    pub fn as_str(&self) -> &'static str {
        match self {
            Term::Fall => "Fall",
            Term::Spring => "Spring",
            Term::Summer => "Summer",
        }
    }
}

/// Applicant citizenship bucket, closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Citizenship {
    International,
    American,
}

impl Citizenship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Citizenship::International => "International",
            Citizenship::American => "American",
        }
    }
}

/// The validated, persisted unit. Required fields are non-empty after
/// cleaning; optional fields are either in-bounds or None.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalApplicantEntry {
    // * Required
    pub program: String,
    pub university: String,
    pub date_added: String,
    pub url: String,
    pub status: Status,

    // * Optional
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub accept_date: Option<String>,
    #[serde(default)]
    pub reject_date: Option<String>,
    #[serde(default)]
    pub start_term: Option<Term>,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub citizenship: Option<Citizenship>,
    #[serde(default)]
    pub gre_total: Option<i64>,
    #[serde(default)]
    pub gre_verbal: Option<i64>,
    #[serde(default)]
    pub gre_aw: Option<f64>,
    #[serde(default)]
    pub degree: Option<Degree>,
    #[serde(default)]
    pub gpa: Option<f64>,
}

impl CanonicalApplicantEntry {
    /// Strict schema check: required fields non-empty, numerics in bounds.
    pub fn validate(&self, bounds: &CleanBounds) -> Result<(), SchemaError> {
        let required = [
            ("program", &self.program),
            ("university", &self.university),
            ("date_added", &self.date_added),
            ("url", &self.url),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(SchemaError::MissingRequired(field));
            }
        }

        if let Some(gpa) = self.gpa {
            if !(0.0..=bounds.gpa_max).contains(&gpa) {
                return Err(SchemaError::OutOfBounds { field: "gpa", value: gpa.to_string() });
            }
        }
        if let Some(year) = self.start_year {
            if year < bounds.year_min || year > bounds.year_max {
                return Err(SchemaError::OutOfBounds {
                    field: "start_year",
                    value: year.to_string(),
                });
            }
        }
        if let Some(total) = self.gre_total {
            if !(GRE_TOTAL_MIN..=GRE_TOTAL_MAX).contains(&total) {
                return Err(SchemaError::OutOfBounds {
                    field: "gre_total",
                    value: total.to_string(),
                });
            }
        }
        if let Some(verbal) = self.gre_verbal {
            if !(GRE_VERBAL_MIN..=GRE_VERBAL_MAX).contains(&verbal) {
                return Err(SchemaError::OutOfBounds {
                    field: "gre_verbal",
                    value: verbal.to_string(),
                });
            }
        }
        if let Some(aw) = self.gre_aw {
            if !(GRE_AW_MIN..=GRE_AW_MAX).contains(&aw) {
                return Err(SchemaError::OutOfBounds { field: "gre_aw", value: aw.to_string() });
            }
        }

        Ok(())
    }
}

/// Canonical entry plus the two enrichment fields. The canon fields are
/// always serialized, null when enrichment declined or was rolled back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedApplicantEntry {
    #[serde(flatten)]
    pub entry: CanonicalApplicantEntry,
    #[serde(default)]
    pub program_canon: Option<String>,
    #[serde(default)]
    pub university_canon: Option<String>,
}

impl ExtendedApplicantEntry {
    /// Strict check over the base entry; canon fields, when present, must be
    /// non-empty after trimming.
    pub fn validate(&self, bounds: &CleanBounds) -> Result<(), SchemaError> {
        self.entry.validate(bounds)?;
        for (field, value) in [
            ("program_canon", &self.program_canon),
            ("university_canon", &self.university_canon),
        ] {
            if let Some(v) = value {
                if v.trim().is_empty() {
                    return Err(SchemaError::MissingRequired(field));
                }
            }
        }
        Ok(())
    }
}

impl From<CanonicalApplicantEntry> for ExtendedApplicantEntry {
    fn from(entry: CanonicalApplicantEntry) -> Self {
        Self { entry, program_canon: None, university_canon: None }
    }
}

/// Numeric bounds applied during cleaning and strict validation.
/// GRE bounds are fixed; GPA cap and the start-year window are tunable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanBounds {
    pub gpa_max: f64,
    pub year_min: i32,
    pub year_max: i32,
}

impl CleanBounds {
    pub fn new(gpa_max: f64, year_min: i32, year_max: i32) -> Result<Self, SchemaError> {
        if year_min > year_max {
            return Err(SchemaError::InvalidBounds { year_min, year_max });
        }
        Ok(Self { gpa_max, year_min, year_max })
    }
}

impl Default for CleanBounds {
    fn default() -> Self {
        Self {
            gpa_max: DEFAULT_GPA_MAX,
            year_min: DEFAULT_YEAR_MIN,
            year_max: DEFAULT_YEAR_MAX,
        }
    }
}

/// Schema-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    #[error("required field '{0}' is missing or empty")]
    MissingRequired(&'static str),

    #[error("field '{field}' out of bounds: {value}")]
    OutOfBounds { field: &'static str, value: String },

    #[error("year_min ({year_min}) cannot be greater than year_max ({year_max})")]
    InvalidBounds { year_min: i32, year_max: i32 },
}
