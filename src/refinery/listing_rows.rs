// * Listing-row extraction
// * Turns one listings page's markup into loose RawRecords, one per detected
// * result row. Cell positions supply university, program/degree, and the
// * publish date; everything else comes from the badge blob (see badges.rs).
// * Malformed markup never raises: a page with no usable table yields an
// * empty batch.

use crate::engine::normalization;
use crate::persistence::schema::RawRecord;
use crate::refinery::badges;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;
use url::Url;

// * Precompiled CSS selectors
static SELECTOR_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("Invalid table selector"));
static SELECTOR_BODY_ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody > tr").expect("Invalid row selector"));
static SELECTOR_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("Invalid anchor selector"));
static SELECTOR_TD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("Invalid td selector"));

// * Degree token inside the program cell, tolerant of punctuation variants
static DEGREE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(Masters|Master['\u{2019}]?s|MS|PhD|MFA|MBA|JD|EdD|PsyD|Other)\b")
        .expect("Invalid degree regex")
});

// * Class hints marking badge/pill UI elements
static BADGE_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(tw-inline-flex|badge|rounded|tw-ring)").expect("Invalid badge class regex")
});

// * Per-row detail links
static ROW_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(survey|result)/").expect("Invalid row link regex"));

/// Extracts result rows from listings pages.
pub struct ListingExtractor;

impl ListingExtractor {
    /// Parses one page into RawRecords. `page_url` doubles as the join base
    /// for relative hrefs and the fallback row URL.
    pub fn extract_page(html: &str, page_url: &str) -> Vec<RawRecord> {
        let document = Html::parse_document(html);

        let table = match document.select(&SELECTOR_TABLE).next() {
            Some(t) => t,
            None => return Vec::new(),
        };

        let mut records = Vec::new();
        for row in table.select(&SELECTOR_BODY_ROWS) {
            // * Rows with fewer than four direct cells are layout noise
            let cells: Vec<ElementRef> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == "td")
                .collect();
            if cells.len() < 4 {
                continue;
            }

            records.push(Self::extract_row(&row, &cells, page_url));
        }

        records
    }

    fn extract_row(row: &ElementRef, cells: &[ElementRef], page_url: &str) -> RawRecord {
        let university = element_text(&cells[0]);

        // * Program cell carries an optional degree token; the program name
        // * is whatever precedes it
        let pd_text = element_text(&cells[1]).replace('\u{00b7}', " ").trim().to_string();
        let (program, degree) = match DEGREE_RE.find(&pd_text) {
            Some(m) => {
                let canon = normalization::degree(m.as_str()).map(|d| d.as_str().to_string());
                let prefix = pd_text[..m.start()]
                    .trim_matches(|c: char| c == ' ' || c == '.' || c == '\u{00b7}' || c == '-')
                    .to_string();
                (prefix, canon)
            }
            None => (pd_text.clone(), None),
        };

        let date_added = element_text(&cells[2]);

        let blob = Self::badge_blob(row);
        let facts = badges::scan(&blob);

        let url = Self::row_url(row, page_url);

        let mut record = RawRecord::new();
        record.insert("program".into(), Value::from(program));
        record.insert("university".into(), Value::from(university));
        record.insert("date_added".into(), Value::from(date_added));
        record.insert("url".into(), Value::from(url));
        record.insert("status".into(), opt_str(facts.status.map(str::to_string)));
        record.insert("comments".into(), Value::Null);
        record.insert("accept_date".into(), opt_str(facts.accept_date));
        record.insert("reject_date".into(), opt_str(facts.reject_date));
        record.insert("start_term".into(), opt_str(facts.start_term));
        record.insert("start_year".into(), facts.start_year.map(Value::from).unwrap_or(Value::Null));
        record.insert("citizenship".into(), opt_str(facts.citizenship.map(str::to_string)));
        record.insert("gre_total".into(), facts.gre_total.map(Value::from).unwrap_or(Value::Null));
        record.insert("gre_verbal".into(), facts.gre_verbal.map(Value::from).unwrap_or(Value::Null));
        record.insert("gre_aw".into(), facts.gre_aw.map(Value::from).unwrap_or(Value::Null));
        record.insert("degree".into(), opt_str(degree));
        record.insert("gpa".into(), facts.gpa.map(Value::from).unwrap_or(Value::Null));
        record
    }

    /// Concatenates badge-styled element text, the whole row's text, and a
    /// following detail/expansion row (a sibling with a colspan cell).
    fn badge_blob(row: &ElementRef) -> String {
        let mut parts: Vec<String> = Vec::new();

        for el in row.descendants().skip(1).filter_map(ElementRef::wrap) {
            if let Some(class) = el.value().attr("class") {
                if BADGE_CLASS_RE.is_match(class) {
                    let text = element_text(&el);
                    if !text.is_empty() {
                        parts.push(text);
                    }
                }
            }
        }

        parts.push(element_text(row));

        if let Some(next_row) = next_sibling_row(row) {
            let has_colspan_cell = next_row
                .select(&SELECTOR_TD)
                .any(|td| td.value().attr("colspan").is_some());
            if has_colspan_cell {
                parts.push(element_text(&next_row));
            }
        }

        parts.join(" ")
    }

    /// Per-row URL: a "See More" anchor wins, then any anchor pointing at a
    /// survey/result path, then the page URL itself. Rows without their own
    /// link can therefore share a URL with siblings; downstream dedupe
    /// resolves that degenerate case.
    fn row_url(row: &ElementRef, page_url: &str) -> String {
        let anchors: Vec<ElementRef> = row.select(&SELECTOR_ANCHOR).collect();

        let link = anchors
            .iter()
            .find(|a| element_text(a).eq_ignore_ascii_case("See More"))
            .or_else(|| {
                anchors.iter().find(|a| {
                    a.value().attr("href").is_some_and(|href| ROW_LINK_RE.is_match(href))
                })
            });

        match link.and_then(|a| a.value().attr("href")) {
            Some(href) => join_url(page_url, href),
            None => page_url.to_string(),
        }
    }
}

/// Element text with fragments trimmed and joined by single spaces.
fn element_text(el: &ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn next_sibling_row<'a>(row: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    row.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "tr")
}

fn join_url(base: &str, href: &str) -> String {
    match Url::parse(base).and_then(|b| b.join(href)) {
        Ok(joined) => joined.to_string(),
        Err(_) => href.to_string(),
    }
}

fn opt_str(value: Option<String>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}
