// * Listings HTTP client
// * One GET per page with a polite identity, bounded timeouts, and a small
// * retry/backoff loop for transient upstream errors. Only the 5xx codes in
// * the retry list are retried; any other non-success status surfaces
// * immediately and the crawl loop treats it as end-of-data.

use crate::config::constants::{
    CONNECT_TIMEOUT_MS, MAX_FETCH_RETRIES, READ_TIMEOUT_MS, RETRY_BACKOFF_FACTOR_MS,
    RETRY_STATUS_CODES, USER_AGENT,
};
use crate::network::errors::NetworkError;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

// * Existing page= query parameter, replaced when building page URLs
static PAGE_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?&]page=)\d+").expect("Invalid page param regex"));

pub struct ListingsClient {
    inner: reqwest::Client,
    base_url: String,
}

impl ListingsClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, NetworkError> {
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_millis(CONNECT_TIMEOUT_MS))
            .timeout(Duration::from_millis(READ_TIMEOUT_MS))
            .build()?;

        Ok(Self { inner, base_url: base_url.into() })
    }

    /// Builds the URL for one page: an existing `page=` parameter is
    /// replaced, otherwise one is appended.
    pub fn page_url(&self, page: u32) -> String {
        let replaced = PAGE_PARAM_RE.replace(&self.base_url, |caps: &regex::Captures| {
            format!("{}{}", &caps[1], page)
        });
        if let std::borrow::Cow::Owned(updated) = replaced {
            return updated;
        }

        let sep = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{}page={}", self.base_url, sep, page)
    }

    /// Fetches one page body. Retries the transient 5xx codes and transport
    /// errors with exponential backoff, then gives up.
    pub async fn fetch_page(&self, url: &str) -> Result<String, NetworkError> {
        let mut attempt = 0u32;

        loop {
            let outcome = self.inner.get(url).send().await;

            match outcome {
                Ok(resp) => {
                    let code = resp.status().as_u16();
                    if RETRY_STATUS_CODES.contains(&code) {
                        tracing::warn!(url, code, attempt, "transient upstream status");
                    } else if !resp.status().is_success() {
                        return Err(NetworkError::Status(code));
                    } else {
                        return Ok(resp.text().await?);
                    }
                }
                Err(error) => {
                    tracing::warn!(url, %error, attempt, "transport error");
                }
            }

            if attempt >= MAX_FETCH_RETRIES {
                return Err(NetworkError::RetriesExhausted(attempt));
            }
            tokio::time::sleep(backoff_delay(attempt)).await;
            attempt += 1;
        }
    }
}

// * 300ms, 600ms, 1200ms, ...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(RETRY_BACKOFF_FACTOR_MS * (1 << attempt.min(8)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_appended_without_query() {
        let client = ListingsClient::new("https://listings.example.com/survey/").unwrap();
        assert_eq!(client.page_url(3), "https://listings.example.com/survey/?page=3");
    }

    #[test]
    fn test_page_url_appended_with_existing_query() {
        let client = ListingsClient::new("https://listings.example.com/survey/?q=cs").unwrap();
        assert_eq!(client.page_url(2), "https://listings.example.com/survey/?q=cs&page=2");
    }

    #[test]
    fn test_page_url_replaces_existing_param() {
        let client =
            ListingsClient::new("https://listings.example.com/survey/?page=1&q=cs").unwrap();
        assert_eq!(client.page_url(7), "https://listings.example.com/survey/?page=7&q=cs");
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff_delay(0), Duration::from_millis(300));
        assert_eq!(backoff_delay(1), Duration::from_millis(600));
        assert_eq!(backoff_delay(2), Duration::from_millis(1200));
    }

    #[tokio::test]
    async fn test_unroutable_host_is_a_transport_error() {
        let client = ListingsClient::new("http://127.0.0.1:1/").unwrap();
        let result = client.fetch_page("http://127.0.0.1:1/?page=1").await;
        assert!(matches!(result, Err(NetworkError::RetriesExhausted(_))));
    }
}
