//! Polling client
//!
//! Runs one polling step at a time.
//!
//! # Overview
//!
//! Each [`Client::run`] call pulls the next page from the [`Pager`], fetches
//! it, writes the body through [`Output`], records the query against the
//! [`EndConditions`] and pauses via [`Timeout`]. The caller drives the loop:
//!
//! ```rust,ignore
//! while client.should_continue() {
//!     client.run().await?;
//! }
//! ```

use crate::conditions::EndConditions;
use crate::error::{Error, Result};
use crate::http::{Fetcher, HttpFetcher};
use crate::output::Output;
use crate::pagination::{EmptyPageRule, PageDescriptor, Pager};
use crate::timeout::Timeout;
use crate::types::{JsonValue, ParamValue, QueryParams};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a single polling step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The page was fetched and written to this path
    Written(PathBuf),
    /// The page was fetched but could not be written
    WriteFailed,
    /// The fetch failed; nothing was written, counted or paused
    FetchFailed,
    /// The page matched the empty-page rule and pagination was stopped
    EmptyPage,
    /// The pager had no more pages; nothing happened
    Exhausted,
}

impl StepOutcome {
    /// Check if a file was written
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

/// Polls a paginated endpoint and writes every page to disk
pub struct Client {
    url: String,
    query: QueryParams,
    payload: Option<JsonValue>,
    pager: Pager,
    end_conditions: EndConditions,
    timeout: Timeout,
    output: Output,
    fetcher: Arc<dyn Fetcher>,
    login_details: QueryParams,
    empty_page: Option<EmptyPageRule>,
}

impl Client {
    /// Start building a client for `url`
    pub fn builder(url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(url)
    }

    /// Check whether the end conditions allow another step
    pub fn should_continue(&self) -> bool {
        self.end_conditions.should_continue()
    }

    /// Check whether the pager has stopped
    pub fn is_exhausted(&self) -> bool {
        !self.pager.is_live()
    }

    /// Run one polling step
    ///
    /// Transport failures are logged and reported as
    /// [`StepOutcome::FetchFailed`]; only a configured payload or a
    /// non-transport fetcher error is returned as `Err`.
    pub async fn run(&mut self) -> Result<StepOutcome> {
        if self.payload.is_some() {
            return Err(Error::not_implemented("requests with a payload"));
        }

        let Some(page) = self.pager.next_page().into_descriptor() else {
            info!("Pagination finished, nothing left to fetch");
            return Ok(StepOutcome::Exhausted);
        };

        let params = self.merge_params(page);
        debug!("Fetching {} with {} parameters", self.url, params.len());

        let body = match self.fetcher.fetch(&self.url, &params).await {
            Ok(body) => body,
            Err(e) if e.is_transport() => {
                warn!("Fetching {} failed, skipping step: {e}", self.url);
                return Ok(StepOutcome::FetchFailed);
            }
            Err(e) => return Err(e),
        };

        if let Some(rule) = &self.empty_page {
            if rule.matches(&body) {
                info!("Received an empty page, stopping pagination");
                self.pager.stop();
                return Ok(StepOutcome::EmptyPage);
            }
        }

        let outcome = match self.output.write_to(&body) {
            Some(path) => StepOutcome::Written(path),
            None => StepOutcome::WriteFailed,
        };
        self.end_conditions.record_query();
        self.timeout.pause().await;

        Ok(outcome)
    }

    /// Drive [`Client::run`] until the end conditions or the pager stop it
    ///
    /// Failed fetches are paced like successful ones so a failing endpoint
    /// is not hammered. Returns the number of files written.
    pub async fn run_until_done(&mut self) -> Result<u64> {
        let mut written = 0;
        while self.should_continue() && !self.is_exhausted() {
            match self.run().await? {
                StepOutcome::Written(_) => written += 1,
                StepOutcome::FetchFailed => self.timeout.pause().await,
                _ => {}
            }
        }
        info!(
            "Polling finished after {} queries, {} files written",
            self.end_conditions.query_count(),
            written
        );
        Ok(written)
    }

    /// Log in and merge the returned fields into every later request
    ///
    /// The response must be a JSON object. Transport and status errors are
    /// returned unchanged.
    pub async fn login(&mut self, url: &str, extra_params: &QueryParams) -> Result<()> {
        let body = self.fetcher.fetch(url, extra_params).await?;

        let value: JsonValue = serde_json::from_slice(&body)
            .map_err(|e| Error::login(format!("response is not valid JSON: {e}")))?;
        let JsonValue::Object(fields) = value else {
            return Err(Error::login("response is not a JSON object"));
        };

        self.login_details = fields
            .iter()
            .map(|(key, value)| (key.clone(), ParamValue::from_json(value)))
            .collect();
        info!("Logged in with {} session parameters", self.login_details.len());
        Ok(())
    }

    /// Static query, then page parameters, then login details
    fn merge_params(&self, page: PageDescriptor) -> QueryParams {
        let mut params = self.query.clone();
        params.extend(page.into_params());
        params.extend(self.login_details.clone());
        params
    }

    /// Target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Static query parameters
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Parameters obtained from [`Client::login`]
    pub fn login_details(&self) -> &QueryParams {
        &self.login_details
    }

    /// Get the pager
    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Get the end conditions
    pub fn end_conditions(&self) -> &EndConditions {
        &self.end_conditions
    }

    /// Get the output
    pub fn output(&self) -> &Output {
        &self.output
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url)
            .field("query", &self.query)
            .field("has_payload", &self.payload.is_some())
            .field("pager", &self.pager)
            .field("end_conditions", &self.end_conditions)
            .field("output", &self.output)
            .field("empty_page", &self.empty_page)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    url: String,
    query: QueryParams,
    payload: Option<JsonValue>,
    pager: Option<Pager>,
    end_conditions: Option<EndConditions>,
    timeout: Option<Timeout>,
    output: Option<Output>,
    fetcher: Option<Arc<dyn Fetcher>>,
    empty_page: Option<EmptyPageRule>,
}

impl ClientBuilder {
    /// Create a builder for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: QueryParams::new(),
            payload: None,
            pager: None,
            end_conditions: None,
            timeout: None,
            output: None,
            fetcher: None,
            empty_page: None,
        }
    }

    /// Add a static query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Replace the static query parameters
    #[must_use]
    pub fn query_params(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Set a request payload
    ///
    /// Payload-bearing requests are not supported; every step will fail.
    #[must_use]
    pub fn payload(mut self, payload: JsonValue) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set the pager
    #[must_use]
    pub fn pager(mut self, pager: Pager) -> Self {
        self.pager = Some(pager);
        self
    }

    /// Set the end conditions
    #[must_use]
    pub fn end_conditions(mut self, end_conditions: EndConditions) -> Self {
        self.end_conditions = Some(end_conditions);
        self
    }

    /// Set the pacing (defaults to a fixed 15 second pause)
    #[must_use]
    pub fn timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the output
    #[must_use]
    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    /// Set the transport (defaults to [`HttpFetcher`])
    #[must_use]
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Stop pagination when a response matches `rule`
    #[must_use]
    pub fn empty_page(mut self, rule: EmptyPageRule) -> Self {
        self.empty_page = Some(rule);
        self
    }

    /// Validate and build the client
    pub fn build(self) -> Result<Client> {
        url::Url::parse(&self.url)?;

        let pager = self.pager.ok_or_else(|| Error::missing_field("pager"))?;
        let end_conditions = self
            .end_conditions
            .ok_or_else(|| Error::missing_field("end_conditions"))?;
        let output = self.output.ok_or_else(|| Error::missing_field("output"))?;
        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new()?),
        };

        if end_conditions.max_queries().is_none() && end_conditions.deadline().is_none() {
            debug!("No query limit or deadline set, polling until the pager stops");
        }

        Ok(Client {
            url: self.url,
            query: self.query,
            payload: self.payload,
            pager,
            end_conditions,
            timeout: self.timeout.unwrap_or_default(),
            output,
            fetcher,
            login_details: QueryParams::new(),
            empty_page: self.empty_page,
        })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("url", &self.url)
            .field("query", &self.query)
            .field("has_pager", &self.pager.is_some())
            .field("has_output", &self.output.is_some())
            .finish_non_exhaustive()
    }
}
