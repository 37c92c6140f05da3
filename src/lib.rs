//! # pagepoll
//!
//! Polls a paginated REST endpoint on a fixed cadence and writes every page
//! to disk as a numbered file.
//!
//! ## Features
//!
//! - **Pagination**: cursor/offset or page-number parameters, with fixed extras
//! - **End Conditions**: stop after N queries, at a deadline, or both
//! - **Pacing**: fixed pause or a caller-supplied pause action
//! - **Output**: `{date}`/`{index}` templated folders and file names
//! - **Login**: merge session fields from a login response into every query
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagepoll::{Client, EndConditions, Output, OutputConfig, Pager, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut client = Client::builder("https://api.example.com/items")
//!         .query("q", "rust")
//!         .pager(Pager::page_number("page", 1)?)
//!         .end_conditions(EndConditions::new().with_max_queries(10))
//!         .output(Output::new(OutputConfig::default())?)
//!         .build()?;
//!
//!     while client.should_continue() {
//!         client.run().await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        Client::run                        │
//! │   pager → merge params → fetch → write → count → pause    │
//! └───────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────┬────────────┬─────┴──────┬───────────┬──────────┐
//! │  Pager   │  Fetcher   │   Output   │ EndConds  │ Timeout  │
//! ├──────────┼────────────┼────────────┼───────────┼──────────┤
//! │ Cursor   │ reqwest    │ {date}     │ max count │ sleep    │
//! │ Page     │ GET+query  │ {index}    │ deadline  │ action   │
//! └──────────┴────────────┴────────────┴───────────┴──────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Time source used by end conditions and output
pub mod clock;

/// Pagination parameter sequences
pub mod pagination;

/// Stop conditions
pub mod conditions;

/// Pacing between steps
pub mod timeout;

/// File output
pub mod output;

/// HTTP transport
pub mod http;

/// Polling client
pub mod client;

/// Poll definitions
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use client::{Client, ClientBuilder, StepOutcome};
pub use conditions::EndConditions;
pub use config::PollConfig;
pub use http::{Fetcher, HttpFetcher};
pub use output::{Output, OutputConfig};
pub use pagination::{EmptyPageRule, Pager, PagerConfig};
pub use timeout::{PauseAction, Timeout};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
