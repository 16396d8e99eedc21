// * Badge-blob scanning
// * Listing rows surface decision, term, citizenship, and score data as
// * badge/pill elements whose position is unstable across page layouts, so
// * extraction matches vocabulary over the row's concatenated text instead
// * of cell positions. Matchers run in a fixed order; GRE verbal and AW are
// * matched before GRE total so the bare "GRE" pattern never claims their
// * spans (the regex crate has no lookaround to guard this inline).

use regex::Regex;
use std::sync::LazyLock;

// * Decision status, optionally followed by "on <date>". The date capture is
// * bounded by shape (ISO, "Month D[, YYYY]", "D Month [YYYY]") so it stops
// * before unrelated badge text.
static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        \b(Accepted|Rejected|Interview|Wait\s*listed)\b
        (?:\s+on\s+(
            \d{4}-\d{2}-\d{2}
            | [A-Za-z]{3,9}\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}
            | \d{1,2}(?:st|nd|rd|th)?\s+[A-Za-z]{3,9}(?:\s+\d{4})?
            | [A-Za-z]{3,9}\s+\d{1,2}(?:st|nd|rd|th)?
        ))?",
    )
    .expect("Invalid status regex")
});

static TERM_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(Fall|Spring|Summer)\s+(\d{4})\b").expect("Invalid term regex")
});

static GPA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)gpa[^0-9]*([0-9]+(?:[.,][0-9]+)?)").expect("Invalid GPA regex")
});

static GRE_VERBAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bGRE\s*V[:\s]+(\d{2,3})\b").expect("Invalid GRE verbal regex")
});

static GRE_AW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bGRE\s*AWA?\s*([0-9]+(?:\.[0-9]+)?)").expect("Invalid GRE AW regex")
});

static GRE_TOTAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bGRE[:\s]+(\d{2,3})\b").expect("Invalid GRE total regex")
});

/// Everything the badge blob yields for one row. Values are raw-ish text and
/// unbounded numbers; the Field Normalizer owns canonicalization and ranges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BadgeFacts {
    pub status: Option<&'static str>,
    pub accept_date: Option<String>,
    pub reject_date: Option<String>,
    pub start_term: Option<String>,
    pub start_year: Option<i64>,
    pub citizenship: Option<&'static str>,
    pub gpa: Option<f64>,
    pub gre_total: Option<i64>,
    pub gre_verbal: Option<i64>,
    pub gre_aw: Option<f64>,
}

/// Runs the full matcher chain over one row's badge blob.
pub fn scan(blob: &str) -> BadgeFacts {
    let mut facts = BadgeFacts::default();
    let low = blob.to_lowercase();

    // * 1. Decision status and its date
    if let Some(caps) = STATUS_RE.captures(blob) {
        let token = caps[1].to_lowercase().replace(' ', "");
        let when = caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());
        if token.contains("wait") {
            // * Waitlisted rows never carry a decision date
            facts.status = Some("Waitlisted");
        } else if token == "accepted" {
            facts.status = Some("Accepted");
            facts.accept_date = when;
        } else if token == "rejected" {
            facts.status = Some("Rejected");
            facts.reject_date = when;
        } else if token == "interview" {
            facts.status = Some("Interview");
        }
    }

    // * 2. Start term and year, first match wins
    if let Some(caps) = TERM_YEAR_RE.captures(blob) {
        facts.start_term = Some(title_case(&caps[1]));
        facts.start_year = caps[2].parse::<i64>().ok();
    }

    // * 3. Citizenship by substring; "international" is checked first, so
    // * ambiguous blobs containing both tokens resolve to International
    if low.contains("international") {
        facts.citizenship = Some("International");
    } else if low.contains("american") {
        facts.citizenship = Some("American");
    }

    // * 4. GPA: first number following "gpa", comma decimals tolerated
    if let Some(caps) = GPA_RE.captures(blob) {
        facts.gpa = caps[1].replace(',', ".").parse::<f64>().ok();
    }

    // * 5 & 6. GRE verbal and AW, recording their spans
    let mut claimed: Vec<usize> = Vec::new();
    if let Some(caps) = GRE_VERBAL_RE.captures(blob) {
        claimed.push(caps.get(0).map(|m| m.start()).unwrap_or(0));
        facts.gre_verbal = caps[1].parse::<i64>().ok();
    }
    if let Some(caps) = GRE_AW_RE.captures(blob) {
        claimed.push(caps.get(0).map(|m| m.start()).unwrap_or(0));
        facts.gre_aw = caps[1].parse::<f64>().ok();
    }

    // * 7. GRE total: first bare "GRE <digits>" whose span was not already
    // * claimed by the verbal or AW matchers
    for caps in GRE_TOTAL_RE.captures_iter(blob) {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        if claimed.contains(&start) {
            continue;
        }
        facts.gre_total = caps[1].parse::<i64>().ok();
        break;
    }

    facts
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_with_short_date() {
        let facts = scan("Accepted on 3 Jan Fall 2024 International GPA 3.8");
        assert_eq!(facts.status, Some("Accepted"));
        assert_eq!(facts.accept_date.as_deref(), Some("3 Jan"));
        assert_eq!(facts.start_term.as_deref(), Some("Fall"));
        assert_eq!(facts.start_year, Some(2024));
        assert_eq!(facts.citizenship, Some("International"));
        assert_eq!(facts.gpa, Some(3.8));
    }

    #[test]
    fn test_rejected_with_full_date() {
        let facts = scan("Rejected on March 15, 2024 See More");
        assert_eq!(facts.status, Some("Rejected"));
        assert_eq!(facts.reject_date.as_deref(), Some("March 15, 2024"));
        assert_eq!(facts.accept_date, None);
    }

    #[test]
    fn test_waitlisted_never_captures_a_date() {
        let facts = scan("Wait listed on 4 Feb Fall 2025");
        assert_eq!(facts.status, Some("Waitlisted"));
        assert_eq!(facts.accept_date, None);
        assert_eq!(facts.reject_date, None);
    }

    #[test]
    fn test_interview_without_date() {
        let facts = scan("Interview Spring 2025 American");
        assert_eq!(facts.status, Some("Interview"));
        assert_eq!(facts.start_term.as_deref(), Some("Spring"));
        assert_eq!(facts.citizenship, Some("American"));
    }

    #[test]
    fn test_status_absent() {
        let facts = scan("Fall 2024 GPA 3.5");
        assert_eq!(facts.status, None);
        assert_eq!(facts.gpa, Some(3.5));
    }

    #[test]
    fn test_citizenship_ambiguity_resolves_to_international() {
        let facts = scan("American University International Fall 2024");
        assert_eq!(facts.citizenship, Some("International"));
    }

    #[test]
    fn test_gpa_comma_decimal() {
        let facts = scan("GPA: 3,75");
        assert_eq!(facts.gpa, Some(3.75));
    }

    #[test]
    fn test_gre_fields_do_not_bleed_into_each_other() {
        let facts = scan("GRE 328 GRE V 161 GRE AW 4.5");
        assert_eq!(facts.gre_total, Some(328));
        assert_eq!(facts.gre_verbal, Some(161));
        assert_eq!(facts.gre_aw, Some(4.5));
    }

    #[test]
    fn test_gre_verbal_alone_is_not_total() {
        let facts = scan("GRE V: 160");
        assert_eq!(facts.gre_verbal, Some(160));
        assert_eq!(facts.gre_total, None);
    }

    #[test]
    fn test_gre_awa_variant() {
        let facts = scan("GRE AWA 5.0");
        assert_eq!(facts.gre_aw, Some(5.0));
        assert_eq!(facts.gre_total, None);
    }

    #[test]
    fn test_term_case_folding() {
        let facts = scan("accepted FALL 2024");
        assert_eq!(facts.start_term.as_deref(), Some("Fall"));
    }

    #[test]
    fn test_empty_blob() {
        assert_eq!(scan(""), BadgeFacts::default());
    }
}
