// * Field Normalizer
// * Pure functions turning raw scraped text into canonical typed values.
// * Every rule here is deterministic and stateless; range policy is
// * reject-to-null, never clamp.

use crate::config::constants::UI_CHATTER_TOKENS;
use crate::persistence::schema::{Citizenship, Degree, Status, Term};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid tag regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("Invalid ws regex"));

// * UI tails that leak into badge date text ("Jan 3 Total comments 2")
static CHATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?:{})\b", UI_CHATTER_TOKENS.join("|"))).expect("Invalid chatter regex")
});

// * Short decision dates without a year: "28 Aug" / "Aug 28", ordinals allowed
static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})(?:st|nd|rd|th)?\s+([A-Za-z]{3,})\s*$")
        .expect("Invalid day-month regex")
});
static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([A-Za-z]{3,})\s+(\d{1,2})(?:st|nd|rd|th)?\s*$")
        .expect("Invalid month-day regex")
});

// * Full date formats tried in order for both publish and decision dates
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"];

/// Strips embedded markup, decodes HTML entities, collapses whitespace.
/// Empty after trimming maps to None.
pub fn norm_str(input: &str) -> Option<String> {
    let without_tags = TAG_RE.replace_all(input, " ");
    let unescaped = html_escape::decode_html_entities(without_tags.as_ref()).to_string();
    let folded = WS_RE.replace_all(unescaped.trim(), " ").trim().to_string();
    if folded.is_empty() {
        None
    } else {
        Some(folded)
    }
}

/// Stringifies a loose JSON scalar, then applies `norm_str`.
pub fn norm_value(value: &Value) -> Option<String> {
    value_to_string(value).as_deref().and_then(norm_str)
}

/// Normalizes the primary publish date. Tries ISO, then `Month DD, YYYY`,
/// then `Mon DD, YYYY`. An unrecognized format is passed through unchanged
/// rather than nulled: the raw text is still primary data.
pub fn date_iso(raw: &str) -> Option<String> {
    let s = norm_str(raw)?;
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&s, fmt) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }
    Some(s)
}

/// Normalizes a decision badge date. Trims trailing UI chatter, tries the
/// full formats, then the short day-month / month-day forms combined with
/// `default_year`. Returns None when nothing parses; unlike `date_iso`,
/// badge text is derived data and not worth preserving raw.
pub fn badge_date(raw: &str, default_year: Option<i32>) -> Option<String> {
    let s = norm_str(raw)?;
    let s = match CHATTER_RE.find(&s) {
        Some(m) => s[..m.start()].trim().to_string(),
        None => s,
    };
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&s, fmt) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }

    let (day, month) = if let Some(c) = DAY_MONTH_RE.captures(&s) {
        (c[1].to_string(), c[2].to_string())
    } else if let Some(c) = MONTH_DAY_RE.captures(&s) {
        (c[2].to_string(), c[1].to_string())
    } else {
        return None;
    };

    let year = default_year?;
    let candidate = format!("{day} {month} {year}");
    for fmt in ["%d %b %Y", "%d %B %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(&candidate, fmt) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Canonicalizes decision status text. Any token containing "wait" becomes
/// Waitlisted; the four other canonical tokens match exactly; unknown
/// non-empty text falls back to Pending; empty maps to None.
pub fn status(raw: &str) -> Option<Status> {
    let s = norm_str(raw)?;
    let folded = s.to_lowercase().replace(' ', "");
    if folded.contains("wait") {
        return Some(Status::Waitlisted);
    }
    Some(match folded.as_str() {
        "accepted" => Status::Accepted,
        "rejected" => Status::Rejected,
        "interview" => Status::Interview,
        "pending" => Status::Pending,
        _ => Status::Pending,
    })
}

/// Maps degree text onto the closed degree set; unknown tokens map to None.
pub fn degree(raw: &str) -> Option<Degree> {
    let s = norm_str(raw)?;
    let key = s.to_lowercase().replace('.', "").replace('\u{2019}', "'");
    degree_token(&key).or_else(|| degree_token(&key.replace('\'', "")))
}

fn degree_token(key: &str) -> Option<Degree> {
    match key {
        "masters" | "master's" | "ms" => Some(Degree::Masters),
        "phd" => Some(Degree::PhD),
        "mfa" => Some(Degree::MFA),
        "mba" => Some(Degree::MBA),
        "jd" => Some(Degree::JD),
        "edd" => Some(Degree::EdD),
        "psyd" => Some(Degree::PsyD),
        "other" => Some(Degree::Other),
        _ => None,
    }
}

/// Folds start-term synonyms onto the three canonical terms. Winter and
/// quarter labels map per the established business rule: Winter and Q1 are
/// Spring intakes, Q2 is Summer, Q3/Q4 are Fall.
pub fn term(raw: &str) -> Option<Term> {
    let s = norm_str(raw)?;
    let t = s.to_lowercase();
    match t.as_str() {
        "fall" | "autumn" => Some(Term::Fall),
        "spring" => Some(Term::Spring),
        "winter" => Some(Term::Spring),
        "q1" | "quarter1" => Some(Term::Spring),
        "q2" | "quarter2" => Some(Term::Summer),
        "q3" | "quarter3" | "q4" | "quarter4" => Some(Term::Fall),
        _ if t.starts_with("summer") => Some(Term::Summer),
        _ => None,
    }
}

/// Prefix-matches citizenship text: "inter*" and "amer*", else None.
pub fn citizenship(raw: &str) -> Option<Citizenship> {
    let s = norm_str(raw)?;
    let c = s.to_lowercase();
    if c.starts_with("inter") {
        Some(Citizenship::International)
    } else if c.starts_with("amer") {
        Some(Citizenship::American)
    } else {
        None
    }
}

/// Integer parse with silent null on failure. Float-shaped text does not
/// round; it fails.
pub fn parse_int(value: &Value) -> Option<i64> {
    value_to_string(value)?.trim().parse::<i64>().ok()
}

/// Float parse with silent null on failure.
pub fn parse_float(value: &Value) -> Option<f64> {
    value_to_string(value)?.trim().parse::<f64>().ok()
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
