use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::gallery::GalleryLogEntry;
use crate::utils::{PixupError, Result};

/// Plain-text log that is opened, appended to and closed per line
#[derive(Debug, Clone)]
pub struct AppendLog {
    path: PathBuf,
}

impl AppendLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `line` plus a newline
    pub fn append_line(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PixupError::io(&self.path, e))?;

        writeln!(file, "{}", line).map_err(|e| PixupError::io(&self.path, e))
    }

    /// All lines written so far; a log that doesn't exist yet is empty
    pub fn read_lines(&self) -> Result<Vec<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(PixupError::io(&self.path, e)),
        }
    }
}

/// `<url>,<name>` per finalized gallery
#[derive(Debug, Clone)]
pub struct GalleriesLog(AppendLog);

impl GalleriesLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(AppendLog::new(path))
    }

    pub fn path(&self) -> &Path {
        self.0.path()
    }

    pub fn record(&self, entry: &GalleryLogEntry) -> Result<()> {
        self.0.append_line(&entry.to_line())
    }

    pub fn entries(&self) -> Result<Vec<GalleryLogEntry>> {
        Ok(self
            .0
            .read_lines()?
            .iter()
            .filter_map(|line| GalleryLogEntry::parse_line(line))
            .collect())
    }
}

/// `<show_url>` per uploaded image
#[derive(Debug, Clone)]
pub struct ImageLinksLog(AppendLog);

impl ImageLinksLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(AppendLog::new(path))
    }

    pub fn path(&self) -> &Path {
        self.0.path()
    }

    pub fn record(&self, show_url: &str) -> Result<()> {
        self.0.append_line(show_url)
    }

    pub fn links(&self) -> Result<Vec<String>> {
        Ok(self
            .0
            .read_lines()?
            .into_iter()
            .filter(|line| !line.is_empty())
            .collect())
    }
}
