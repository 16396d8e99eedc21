// * HTTP canonicalization client
// * Speaks the batch contract of the locally-hosted labeling service:
// * request is a JSON collection of {"program": <text>} items, response is
// * line-delimited JSON. Lines may carry surrounding chatter, and each
// * object may use either the modern or the legacy hyphenated key names;
// * both must be accepted.

use crate::enrich::{AsyncResult, CanonLabel, Canonicalizer, EnrichmentError};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;

// * First {...} span on a line; tolerates log prefixes and suffixes
static JSON_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{.*\}").expect("Invalid JSON span regex"));

// * Accepted key aliases, modern name first
const PROGRAM_KEYS: [&str; 3] = ["llm-generated-program", "program_canon", "standardized_program"];
const UNIVERSITY_KEYS: [&str; 3] =
    ["llm-generated-university", "university_canon", "standardized_university"];

/// Canonicalizer backed by the labeling service's HTTP endpoint.
pub struct HttpCanonicalizer {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpCanonicalizer {
    /// `timeout` bounds the whole batch call.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, EnrichmentError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::Transport(e.to_string()))?;
        Ok(Self { http, endpoint: endpoint.into() })
    }
}

impl Canonicalizer for HttpCanonicalizer {
    fn canonize_batch(&self, texts: Vec<String>) -> AsyncResult<Vec<CanonLabel>> {
        let http = self.http.clone();
        let endpoint = self.endpoint.clone();

        Box::pin(async move {
            let rows: Vec<Value> =
                texts.iter().map(|t| serde_json::json!({ "program": t })).collect();
            let payload = serde_json::json!({ "rows": rows });

            let response = http
                .post(&endpoint)
                .json(&payload)
                .send()
                .await
                .map_err(|e| EnrichmentError::Transport(e.to_string()))?
                .error_for_status()
                .map_err(|e| EnrichmentError::Transport(e.to_string()))?;

            let body =
                response.text().await.map_err(|e| EnrichmentError::Transport(e.to_string()))?;

            Ok(parse_labels(&body))
        })
    }
}

/// Parses a line-delimited JSON body into labels. Unparsable lines are
/// skipped, not fatal; count reconciliation happens upstream.
pub fn parse_labels(body: &str) -> Vec<CanonLabel> {
    let mut labels = Vec::new();
    let mut parsed = 0usize;
    let mut failed = 0usize;

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let span = match JSON_SPAN_RE.find(line) {
            Some(m) => m.as_str(),
            None => {
                failed += 1;
                continue;
            }
        };

        match serde_json::from_str::<Value>(span) {
            Ok(value) => {
                labels.push(CanonLabel {
                    program_canon: string_field(&value, &PROGRAM_KEYS),
                    university_canon: string_field(&value, &UNIVERSITY_KEYS),
                });
                parsed += 1;
            }
            Err(_) => failed += 1,
        }
    }

    tracing::debug!(parsed, failed, "parsed label stream");
    labels
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_string))
}
