//! Path templates for output files
//!
//! Handles `{date}` and `{index}` placeholders in folder segments and file
//! names. Templates are parsed once; rendering only substitutes values.

use crate::error::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Regex for matching placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Date,
    Index,
}

/// A single parsed template string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

impl Template {
    /// Parse a template, rejecting unknown placeholders
    pub fn parse(source: &str) -> Result<Self> {
        let mut pieces = Vec::new();
        let mut last = 0;

        for cap in PLACEHOLDER_REGEX.captures_iter(source) {
            let Some(full) = cap.get(0) else {
                continue;
            };
            if full.start() > last {
                pieces.push(Piece::Literal(source[last..full.start()].to_string()));
            }
            let piece = match cap[1].trim() {
                "date" => Piece::Date,
                "index" => Piece::Index,
                other => {
                    return Err(Error::template(format!(
                        "Unknown placeholder '{{{other}}}' in '{source}'"
                    )));
                }
            };
            pieces.push(piece);
            last = full.end();
        }

        if last < source.len() {
            pieces.push(Piece::Literal(source[last..].to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }

    /// The unparsed template
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check for a `{date}` placeholder
    pub fn has_date(&self) -> bool {
        self.pieces.contains(&Piece::Date)
    }

    /// Check for an `{index}` placeholder
    pub fn has_index(&self) -> bool {
        self.pieces.contains(&Piece::Index)
    }

    /// Substitute placeholder values
    pub fn render(&self, date: &str, index: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + date.len());
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Date => out.push_str(date),
                Piece::Index => out.push_str(index),
            }
        }
        out
    }
}

/// Folder segments plus a file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    folder: Vec<Template>,
    file_name: Template,
}

impl PathTemplate {
    /// Parse and validate folder segments and a file name
    pub fn new(folder: &[String], file_name: &str) -> Result<Self> {
        if file_name.is_empty() {
            return Err(Error::config("Output file name must not be empty"));
        }
        if file_name.contains(['/', '\\']) {
            return Err(Error::config(format!(
                "Output file name '{file_name}' must not contain path separators, use folder segments"
            )));
        }

        let folder = folder
            .iter()
            .map(|segment| {
                let template = Template::parse(segment)?;
                if template.has_index() {
                    return Err(Error::config(format!(
                        "Folder segment '{segment}' cannot use {{index}}"
                    )));
                }
                Ok(template)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            folder,
            file_name: Template::parse(file_name)?,
        })
    }

    /// Check whether the file name advances the index
    pub fn uses_index(&self) -> bool {
        self.file_name.has_index()
    }

    /// Check that `{date}` in the file name cannot expand to a path separator
    pub fn check_date_format(&self, format: &str) -> Result<()> {
        if !self.file_name.has_date() {
            return Ok(());
        }
        let sample = Local::now().format(format).to_string();
        if sample.contains(['/', '\\']) {
            return Err(Error::config(format!(
                "Date format '{format}' expands to a path separator inside the file name, use folder segments"
            )));
        }
        Ok(())
    }

    /// Render the directory for a given date
    pub fn render_dir(&self, date: &str) -> PathBuf {
        self.folder
            .iter()
            .map(|segment| segment.render(date, ""))
            .collect()
    }

    /// Render the full file path for a given date and index
    pub fn render_file(&self, date: &str, index: &str) -> PathBuf {
        self.render_dir(date).join(self.file_name.render(date, index))
    }
}

/// Check that a strftime format string only holds valid specifiers
pub fn validate_date_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::config(format!("Invalid date format '{format}'")));
    }
    Ok(())
}

/// Zero-pad an index to `width`, widening when it needs more digits
pub fn pad_index(index: u64, width: usize) -> String {
    format!("{index:0width$}")
}
