//! Pagination types
//!
//! Defines the descriptors a pager emits, its configuration, and the rules
//! used to recognise the empty page that ends a result set.

use crate::types::{JsonValue, ParamValue, QueryParams};
use serde::{Deserialize, Serialize};

/// Query parameters for one page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageDescriptor {
    params: QueryParams,
}

impl PageDescriptor {
    pub(crate) fn new(params: QueryParams) -> Self {
        Self { params }
    }

    /// Get a parameter by name
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Borrow all parameters
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Take the parameters
    pub fn into_params(self) -> QueryParams {
        self.params
    }
}

/// Result of asking a pager for the next page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Parameters for the next request
    Continue(PageDescriptor),
    /// The sequence has ended
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue(_))
    }

    /// Convert into the descriptor, if any
    pub fn into_descriptor(self) -> Option<PageDescriptor> {
        match self {
            Self::Continue(page) => Some(page),
            Self::Done => None,
        }
    }
}

/// Which parameter a pager advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingMode {
    /// An offset/cursor advanced by a fixed step
    Cursor,
    /// A page number advanced by one
    Page,
}

/// Declarative pager configuration
///
/// Exactly one of the cursor pair (`cursor_param`, `cursor_value`) or the page
/// pair (`page_param`, `page_value`) must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerConfig {
    /// Query parameter name for the cursor/offset (e.g. "offset")
    #[serde(default)]
    pub cursor_param: Option<String>,
    /// Initial cursor value
    #[serde(default)]
    pub cursor_value: Option<i64>,
    /// Cursor increment; defaults to `limit_value` when unset
    #[serde(default)]
    pub step: Option<i64>,
    /// Query parameter name for the page number (e.g. "page")
    #[serde(default)]
    pub page_param: Option<String>,
    /// First page number
    #[serde(default)]
    pub page_value: Option<i64>,
    /// Query parameter name for the page size (e.g. "limit")
    #[serde(default)]
    pub limit_param: Option<String>,
    /// Page size value
    #[serde(default)]
    pub limit_value: Option<i64>,
    /// Additional parameters sent with every page
    #[serde(default)]
    pub fixed: QueryParams,
}

impl PagerConfig {
    /// Cursor mode configuration
    pub fn cursor(param: impl Into<String>, start: i64, step: i64) -> Self {
        Self {
            cursor_param: Some(param.into()),
            cursor_value: Some(start),
            step: Some(step),
            ..Default::default()
        }
    }

    /// Page mode configuration
    pub fn page_number(param: impl Into<String>, start: i64) -> Self {
        Self {
            page_param: Some(param.into()),
            page_value: Some(start),
            ..Default::default()
        }
    }

    /// Send a page size parameter with every page
    #[must_use]
    pub fn with_limit(mut self, param: impl Into<String>, value: i64) -> Self {
        self.limit_param = Some(param.into());
        self.limit_value = Some(value);
        self
    }

    /// Send an extra fixed parameter with every page
    #[must_use]
    pub fn with_fixed(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.fixed.insert(key.into(), value.into());
        self
    }
}

/// Rule recognising a response that marks the end of the result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmptyPageRule {
    /// The body is empty or whitespace
    EmptyBody,

    /// The array at `path` is empty, missing or null
    EmptyArray {
        /// Dotted path to the array (empty for the root)
        #[serde(default)]
        path: String,
    },

    /// The value at `path` equals `value`
    FieldEquals {
        /// Dotted path to the field
        path: String,
        /// Value that marks the last page
        value: JsonValue,
    },
}

impl EmptyPageRule {
    /// Create an empty-array rule
    pub fn empty_array(path: impl Into<String>) -> Self {
        Self::EmptyArray { path: path.into() }
    }

    /// Create a field-equals rule
    pub fn field(path: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::FieldEquals {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Check a response body against this rule
    pub fn matches(&self, body: &[u8]) -> bool {
        match self {
            Self::EmptyBody => body.iter().all(u8::is_ascii_whitespace),
            Self::EmptyArray { path } => {
                let Ok(json) = serde_json::from_slice::<JsonValue>(body) else {
                    return false;
                };
                match extract_path(&json, path) {
                    None | Some(JsonValue::Null) => true,
                    Some(JsonValue::Array(items)) => items.is_empty(),
                    Some(_) => false,
                }
            }
            Self::FieldEquals { path, value } => {
                let Ok(json) = serde_json::from_slice::<JsonValue>(body) else {
                    return false;
                };
                extract_path(&json, path) == Some(value)
            }
        }
    }
}

/// Walk a dotted path (`$.` prefix optional) into a JSON value
fn extract_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let path = path.strip_prefix('$').unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        match current {
            JsonValue::Object(map) => {
                current = map.get(part)?;
            }
            JsonValue::Array(items) => {
                let index: usize = part.parse().ok()?;
                current = items.get(index)?;
            }
            _ => return None,
        }
    }

    Some(current)
}
