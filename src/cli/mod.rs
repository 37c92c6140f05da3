//! CLI module
//!
//! Command-line interface for running polls.
//!
//! # Commands
//!
//! - `run` - Poll an endpoint and write every page to disk
//! - `check` - Validate a poll definition

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
