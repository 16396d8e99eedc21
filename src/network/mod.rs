// * Network layer
// * Sequential, polite page fetching for the crawl loop.

pub mod client;
pub mod errors;

// * Re-exports for convenient access
pub use client::ListingsClient;
pub use errors::NetworkError;
