//! Pager implementation
//!
//! A pull-based state machine producing one [`PageDescriptor`] per request.
//! The sequence is infinite until [`Pager::stop`] is called and cannot be
//! restarted.

use super::types::{NextPage, PageDescriptor, PagerConfig, PagingMode};
use crate::error::{Error, Result};
use crate::types::{ParamValue, QueryParams};
use tracing::{debug, warn};

/// Produces successive page descriptors in cursor or page mode
#[derive(Debug, Clone)]
pub struct Pager {
    mode: PagingMode,
    param: String,
    current: i64,
    step: i64,
    fixed: QueryParams,
    live: bool,
}

impl Pager {
    /// Create a cursor-mode pager
    ///
    /// Emits `start`, `start + step`, `start + 2 * step`, ... under `param`.
    pub fn cursor(param: impl Into<String>, start: i64, step: i64) -> Result<Self> {
        PagerConfig::cursor(param, start, step).build()
    }

    /// Create a page-mode pager
    ///
    /// Emits `start`, `start + 1`, `start + 2`, ... under `param`.
    pub fn page_number(param: impl Into<String>, start: i64) -> Result<Self> {
        PagerConfig::page_number(param, start).build()
    }

    /// Send an extra fixed parameter with every page
    #[must_use]
    pub fn with_fixed(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.fixed.insert(key.into(), value.into());
        self
    }

    /// Get the paging mode
    pub fn mode(&self) -> PagingMode {
        self.mode
    }

    /// Get the name of the advancing parameter
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Get the value the next descriptor will carry
    pub fn current(&self) -> i64 {
        self.current
    }

    /// Check whether the pager can still produce descriptors
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Produce the next descriptor and advance
    pub fn next_page(&mut self) -> NextPage {
        if !self.live {
            return NextPage::Done;
        }

        let mut params = self.fixed.clone();
        params.insert(self.param.clone(), ParamValue::Int(self.current));
        debug!("Page {}={}", self.param, self.current);

        match self.current.checked_add(self.step) {
            Some(next) => self.current = next,
            None => {
                warn!(
                    "Pagination parameter '{}' overflowed after {}, stopping",
                    self.param, self.current
                );
                self.live = false;
            }
        }

        NextPage::Continue(PageDescriptor::new(params))
    }

    /// End the sequence
    ///
    /// Every later call to [`Pager::next_page`] returns [`NextPage::Done`].
    pub fn stop(&mut self) {
        if self.live {
            debug!("Pagination stopped at {}={}", self.param, self.current);
        }
        self.live = false;
    }
}

impl PagerConfig {
    /// Validate the configuration and build a pager
    pub fn build(&self) -> Result<Pager> {
        let cursor = pair(&self.cursor_param, self.cursor_value, "cursor_param", "cursor_value")?;
        let page = pair(&self.page_param, self.page_value, "page_param", "page_value")?;

        let mut fixed = self.fixed.clone();
        match (&self.limit_param, self.limit_value) {
            (Some(param), Some(value)) => {
                fixed.insert(param.clone(), ParamValue::Int(value));
            }
            (Some(param), None) => {
                return Err(Error::config(format!(
                    "limit_param '{param}' requires limit_value"
                )));
            }
            (None, _) => {}
        }

        let (mode, param, current, step) = match (cursor, page) {
            (Some(_), Some(_)) => {
                return Err(Error::config(
                    "Cannot specify both cursor and page parameters, choose one pagination mode",
                ));
            }
            (None, None) => {
                return Err(Error::config(
                    "Either cursor_param and cursor_value or page_param and page_value must be set",
                ));
            }
            (Some((param, start)), None) => {
                let step = self.step.or(self.limit_value).ok_or_else(|| {
                    Error::config("Cursor pagination requires a step or limit_value")
                })?;
                if step <= 0 {
                    return Err(Error::config(format!(
                        "Cursor step must be positive, got {step}"
                    )));
                }
                (PagingMode::Cursor, param, start, step)
            }
            (None, Some((param, start))) => (PagingMode::Page, param, start, 1),
        };

        if param.is_empty() {
            return Err(Error::config("Pagination parameter name must not be empty"));
        }

        Ok(Pager {
            mode,
            param,
            current,
            step,
            fixed,
            live: true,
        })
    }
}

/// Resolve an optional (name, value) pair, rejecting half-set pairs
fn pair(
    param: &Option<String>,
    value: Option<i64>,
    param_field: &str,
    value_field: &str,
) -> Result<Option<(String, i64)>> {
    match (param, value) {
        (Some(p), Some(v)) => Ok(Some((p.clone(), v))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(Error::config(format!(
            "{param_field} requires {value_field}"
        ))),
        (None, Some(_)) => Err(Error::config(format!(
            "{value_field} requires {param_field}"
        ))),
    }
}
