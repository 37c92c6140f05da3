//! Output module
//!
//! Handles file naming and writing of response bodies.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Parsing `{date}`/`{index}` path templates
//! - Creating the destination directory once, with an optional safe mode
//! - Writing each payload to a fresh, exclusively created file

mod template;
mod writer;

pub use template::{pad_index, PathTemplate, Template};
pub use writer::{Output, OutputConfig};
