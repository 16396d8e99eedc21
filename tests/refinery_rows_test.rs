use admit_flow::refinery::ListingExtractor;
use serde_json::Value;

// * Test Suite for the Row Extractor

const PAGE_URL: &str = "https://listings.example.com/survey/?page=2";

fn page(rows: &str) -> String {
    format!("<html><body><table><tbody>{rows}</tbody></table></body></html>")
}

#[test]
fn test_reference_row() {
    // * One fully-populated listing row with badge pills and a detail row
    let html = page(
        r#"
        <tr>
            <td>MIT</td>
            <td>Computer Science PhD</td>
            <td>Jan 5, 2024</td>
            <td>
                <span class="tw-inline-flex tw-ring-1">Accepted on 3 Jan</span>
                <span class="badge">Fall 2024</span>
                <a href="/result/98765">See More</a>
            </td>
        </tr>
        <tr><td colspan="4">International GPA 3.8 GRE 325 GRE V 160 GRE AW 4.5</td></tr>
        "#,
    );

    let records = ListingExtractor::extract_page(&html, PAGE_URL);
    assert_eq!(records.len(), 1);

    let r = &records[0];
    assert_eq!(r["university"], "MIT");
    assert_eq!(r["program"], "Computer Science");
    assert_eq!(r["degree"], "PhD");
    assert_eq!(r["date_added"], "Jan 5, 2024");
    assert_eq!(r["status"], "Accepted");
    assert_eq!(r["accept_date"], "3 Jan");
    assert_eq!(r["start_term"], "Fall");
    assert_eq!(r["start_year"], 2024);
    assert_eq!(r["citizenship"], "International");
    assert_eq!(r["gpa"], 3.8);
    assert_eq!(r["gre_total"], 325);
    assert_eq!(r["gre_verbal"], 160);
    assert_eq!(r["gre_aw"], 4.5);
    assert_eq!(r["url"], "https://listings.example.com/result/98765");
}

#[test]
fn test_malformed_markup_never_raises() {
    for html in [
        "",
        "<table>",
        "<html><body>no table</body></html>",
        "<table><tbody><tr><td>only one cell</td></tr></tbody></table>",
        "<<<>>>",
    ] {
        // * Worst case is an empty batch
        let _ = ListingExtractor::extract_page(html, PAGE_URL);
    }
}

#[test]
fn test_rows_without_links_share_the_page_url() {
    let html = page(
        r#"
        <tr><td>A</td><td>X MS</td><td>2024-01-01</td><td>Accepted</td></tr>
        <tr><td>B</td><td>Y MS</td><td>2024-01-02</td><td>Rejected</td></tr>
        "#,
    );

    let records = ListingExtractor::extract_page(&html, PAGE_URL);
    assert_eq!(records.len(), 2);
    // * Accepted degenerate case, resolved downstream by dedupe
    assert_eq!(records[0]["url"], PAGE_URL);
    assert_eq!(records[1]["url"], PAGE_URL);
}

#[test]
fn test_waitlisted_rows_have_no_decision_date() {
    let html = page(
        r#"
        <tr>
            <td>Yale</td><td>History PhD</td><td>2024-02-02</td>
            <td><span class="badge">Waitlisted on 4 Feb</span></td>
        </tr>
        "#,
    );

    let records = ListingExtractor::extract_page(&html, PAGE_URL);
    assert_eq!(records[0]["status"], "Waitlisted");
    assert_eq!(records[0]["accept_date"], Value::Null);
    assert_eq!(records[0]["reject_date"], Value::Null);
}

#[test]
fn test_rejected_captures_reject_date() {
    let html = page(
        r#"
        <tr>
            <td>Brown</td><td>English MFA</td><td>2024-03-01</td>
            <td><span class="badge">Rejected on March 15, 2024</span></td>
        </tr>
        "#,
    );

    let records = ListingExtractor::extract_page(&html, PAGE_URL);
    assert_eq!(records[0]["status"], "Rejected");
    assert_eq!(records[0]["reject_date"], "March 15, 2024");
    assert_eq!(records[0]["accept_date"], Value::Null);
    assert_eq!(records[0]["degree"], "MFA");
}
