//! Configuration types for poll definitions
//!
//! A poll definition describes one endpoint to walk: where it lives, how to
//! page through it, when to stop and where the pages go. Definitions are
//! written in YAML or JSON.

use crate::client::Client;
use crate::conditions::EndConditions;
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpFetcher, HttpFetcherConfig};
use crate::output::{Output, OutputConfig};
use crate::pagination::{EmptyPageRule, PagerConfig};
use crate::timeout::{Timeout, DEFAULT_PAUSE_SECS};
use crate::types::{JsonValue, QueryParams};
use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

// ============================================================================
// Top-Level Poll Config
// ============================================================================

/// Complete poll configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Endpoint to poll
    pub url: String,

    /// Static query parameters sent with every request
    #[serde(default)]
    pub query: QueryParams,

    /// Request payload (not supported, every step fails when set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<JsonValue>,

    /// Pagination parameters
    pub pagination: PagerConfig,

    /// When to stop polling
    #[serde(default)]
    pub end: EndConfig,

    /// Pause after each step, in seconds
    #[serde(default = "default_pause_seconds")]
    pub pause_seconds: f64,

    /// Where the pages are written
    #[serde(default)]
    pub output: OutputConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Login performed before the first step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<LoginConfig>,

    /// Response shape that marks the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_page: Option<EmptyPageRule>,
}

#[allow(clippy::cast_precision_loss)]
fn default_pause_seconds() -> f64 {
    DEFAULT_PAUSE_SECS as f64
}

// ============================================================================
// End Config
// ============================================================================

/// Stop limits; all unset means poll until the pager stops
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndConfig {
    /// Maximum number of completed queries
    #[serde(default)]
    pub max_queries: Option<u64>,

    /// Absolute deadline (RFC 3339)
    #[serde(default)]
    pub deadline: Option<DateTime<FixedOffset>>,

    /// Relative deadline, counted from client construction
    #[serde(default)]
    pub run_for_secs: Option<u64>,
}

impl EndConfig {
    /// Build end conditions from these limits
    ///
    /// When both `deadline` and `run_for_secs` are set the earlier one wins.
    pub fn to_conditions(&self) -> EndConditions {
        let mut conditions = EndConditions::new();
        if let Some(max) = self.max_queries {
            conditions = conditions.with_max_queries(max);
        }
        if let Some(secs) = self.run_for_secs {
            conditions = conditions.with_time_limit(Duration::from_secs(secs));
        }
        if let Some(deadline) = self.deadline {
            let deadline = deadline.with_timezone(&Local);
            if conditions.deadline().map_or(true, |current| deadline < current) {
                conditions = conditions.with_deadline(deadline);
            }
        }
        conditions
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
            headers: HashMap::new(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl HttpConfig {
    /// Convert to fetcher configuration
    pub fn to_fetcher_config(&self) -> HttpFetcherConfig {
        let mut builder = HttpFetcherConfig::builder().timeout(Duration::from_secs(self.timeout_secs));
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        builder.build()
    }
}

// ============================================================================
// Login Config
// ============================================================================

/// Login request whose JSON response is merged into every later query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginConfig {
    /// Login endpoint
    pub url: String,

    /// Query parameters for the login request
    #[serde(default)]
    pub params: QueryParams,
}

// ============================================================================
// Loading
// ============================================================================

impl PollConfig {
    /// Load and validate a poll definition
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as YAML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse and validate a YAML poll definition
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON poll definition
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate everything that can be checked without touching the file system
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::config("url cannot be empty"));
        }
        url::Url::parse(&self.url)?;

        self.pagination.build()?;
        self.output.validate()?;
        self.timeout()?;

        if self.http.timeout_secs == 0 {
            return Err(Error::config("http.timeout_secs must be positive"));
        }
        self.http.to_fetcher_config().header_map()?;

        if let Some(login) = &self.login {
            url::Url::parse(&login.url)?;
        }

        Ok(())
    }

    /// Pacing described by `pause_seconds`
    pub fn timeout(&self) -> Result<Timeout> {
        Timeout::from_secs(self.pause_seconds)
    }

    /// Build a client, creating the output directory and logging in if configured
    pub async fn build_client(&self) -> Result<Client> {
        self.validate()?;

        let fetcher = HttpFetcher::with_config(self.http.to_fetcher_config())?;
        let mut builder = Client::builder(&self.url)
            .query_params(self.query.clone())
            .pager(self.pagination.build()?)
            .end_conditions(self.end.to_conditions())
            .timeout(self.timeout()?)
            .output(Output::new(self.output.clone())?)
            .fetcher(Arc::new(fetcher));
        if let Some(payload) = &self.payload {
            builder = builder.payload(payload.clone());
        }
        if let Some(rule) = &self.empty_page {
            builder = builder.empty_page(rule.clone());
        }
        let mut client = builder.build()?;

        if let Some(login) = &self.login {
            info!("Logging in at {}", login.url);
            client.login(&login.url, &login.params).await?;
        }

        Ok(client)
    }
}
