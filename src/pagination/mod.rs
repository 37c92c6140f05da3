//! Pagination module
//!
//! Supports: Cursor/offset and page number pagination
//!
//! # Overview
//!
//! A [`Pager`] hands out the query parameters for one page at a time. It does
//! not know when results run out; the caller ends it with [`Pager::stop`],
//! typically when an [`EmptyPageRule`] matches a response.

mod pager;
mod types;

pub use pager::Pager;
pub use types::{EmptyPageRule, NextPage, PageDescriptor, PagerConfig, PagingMode};

#[cfg(test)]
mod tests;
