//! HTTP module
//!
//! Provides the transport seam used by the polling client.
//!
//! # Features
//!
//! - **Fetcher trait**: swap the transport in tests or for custom clients
//! - **HttpFetcher**: reqwest GET with query-string parameters
//! - **Status mapping**: non-2xx responses become `Error::HttpStatus`

mod fetcher;

pub use fetcher::{Fetcher, HttpFetcher, HttpFetcherConfig, HttpFetcherConfigBuilder};

#[cfg(test)]
mod tests;
