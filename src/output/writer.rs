//! Response body writer
//!
//! Writes every payload to its own file under a templated directory.

use super::template::{pad_index, validate_date_format, PathTemplate};
use crate::clock::{system_clock, SharedClock};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Configuration for output files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory segments, joined in order; may contain `{date}`
    pub folder: Vec<String>,
    /// File name; may contain `{date}` and `{index}`
    pub file_name: String,
    /// Minimum number of digits for `{index}`
    pub index_width: usize,
    /// strftime format for `{date}`
    pub date_format: String,
    /// Refuse to reuse an existing directory
    pub overwrite_safe: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: vec!["downloads".to_string(), "{date}".to_string()],
            file_name: "download_{index}.json".to_string(),
            index_width: 5,
            date_format: "%Y-%m-%d".to_string(),
            overwrite_safe: true,
        }
    }
}

impl OutputConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the folder segments
    #[must_use]
    pub fn with_folder<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.folder = segments.into_iter().map(Into::into).collect();
        self
    }

    /// Set the file name template
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Set the index width
    #[must_use]
    pub fn with_index_width(mut self, width: usize) -> Self {
        self.index_width = width;
        self
    }

    /// Set the date format
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Enable or disable safe mode
    #[must_use]
    pub fn with_overwrite_safe(mut self, enabled: bool) -> Self {
        self.overwrite_safe = enabled;
        self
    }

    /// Check templates and the date format without touching the file system
    pub fn validate(&self) -> Result<()> {
        validate_date_format(&self.date_format)?;
        PathTemplate::new(&self.folder, &self.file_name)?.check_date_format(&self.date_format)
    }
}

/// Writes payloads to deterministic, numbered files
pub struct Output {
    config: OutputConfig,
    template: PathTemplate,
    file_index: u64,
    directory: PathBuf,
    clock: SharedClock,
}

impl Output {
    /// Create the output directory and a writer for it
    pub fn new(config: OutputConfig) -> Result<Self> {
        Self::with_clock(config, system_clock())
    }

    /// Like [`Output::new`], reading `{date}` from `clock`
    pub fn with_clock(config: OutputConfig, clock: SharedClock) -> Result<Self> {
        validate_date_format(&config.date_format)?;
        let template = PathTemplate::new(&config.folder, &config.file_name)?;
        template.check_date_format(&config.date_format)?;

        let date = clock.now().format(&config.date_format).to_string();
        let directory = template.render_dir(&date);

        if config.overwrite_safe && directory.exists() {
            return Err(Error::path_exists(directory.display().to_string()));
        }
        fs::create_dir_all(&directory)?;
        info!("Writing output to {}", directory.display());

        Ok(Self {
            config,
            template,
            file_index: 0,
            directory,
            clock,
        })
    }

    /// Write a payload to the next file
    ///
    /// Returns false, after logging, when the file cannot be written.
    pub fn write(&mut self, data: &[u8]) -> bool {
        self.write_to(data).is_some()
    }

    /// Write a payload to the next file and report where it went
    pub fn write_to(&mut self, data: &[u8]) -> Option<PathBuf> {
        let date = self.clock.now().format(&self.config.date_format).to_string();

        let directory = self.template.render_dir(&date);
        if directory != self.directory {
            if let Err(e) = fs::create_dir_all(&directory) {
                warn!("Error creating directory {}: {e}", directory.display());
                return None;
            }
            debug!("Output directory moved to {}", directory.display());
            self.directory = directory;
        }

        let path = self.next_path(&date);
        match write_new_file(&path, data) {
            Ok(()) => {
                debug!("Wrote {} bytes to {}", data.len(), path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Error writing to file {}: {e}", path.display());
                None
            }
        }
    }

    /// Render the path for `date` and advance the index
    fn next_path(&mut self, date: &str) -> PathBuf {
        let index = pad_index(self.file_index, self.config.index_width);
        if self.template.uses_index() {
            self.file_index += 1;
        }
        self.template.render_file(date, &index)
    }

    /// Directory the most recent file went to (initially the one created at construction)
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Index the next file will carry
    pub fn file_index(&self) -> u64 {
        self.file_index
    }

    /// Get the configuration
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("config", &self.config)
            .field("file_index", &self.file_index)
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}

fn write_new_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let file = OpenOptions::new().write(true).create_new(true).open(path)?;
    fill_new_file(path, file, data)
}

/// Write `data` into the freshly created `path`, removing it on failure
pub(super) fn fill_new_file<W: Write>(path: &Path, mut file: W, data: &[u8]) -> std::io::Result<()> {
    let result = file.write_all(data).and_then(|()| file.flush());
    if result.is_err() {
        drop(file);
        if let Err(e) = fs::remove_file(path) {
            warn!("Error removing partial file {}: {e}", path.display());
        }
    }
    result
}
