//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Poll a paginated REST endpoint and save every page to disk
#[derive(Parser, Debug)]
#[command(name = "pagepoll")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the endpoint until an end condition or the pager stops it
    Run {
        /// Poll definition file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Override the maximum number of queries
        #[arg(long)]
        max_queries: Option<u64>,
    },

    /// Validate a poll definition without sending requests or creating directories
    Check {
        /// Poll definition file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
}
