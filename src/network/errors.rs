use thiserror::Error;

// * Unified Error type for the Network Layer.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {0} from listings site")]
    Status(u16),

    #[error("retries exhausted after {0} attempts")]
    RetriesExhausted(u32),
}
