//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::PollConfig;
use crate::error::Result;
use std::path::Path;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                config,
                max_queries,
            } => {
                let written = self.poll(config, *max_queries).await?;
                println!("Wrote {written} files");
                Ok(())
            }
            Commands::Check { config } => {
                let config = Self::check(config)?;
                println!("Configuration OK: {}", config.url);
                Ok(())
            }
        }
    }

    /// Load the definition, build a client and drive it to completion
    ///
    /// Returns the number of files written.
    pub async fn poll(&self, path: &Path, max_queries: Option<u64>) -> Result<u64> {
        let mut config = PollConfig::load_from_path(path)?;
        if let Some(max) = max_queries {
            config.end.max_queries = Some(max);
        }

        info!("Polling {}", config.url);
        let mut client = config.build_client().await?;
        client.run_until_done().await
    }

    /// Load and validate a definition
    pub fn check(path: &Path) -> Result<PollConfig> {
        let config = PollConfig::load_from_path(path)?;
        info!("Configuration {} is valid", path.display());
        Ok(config)
    }
}
