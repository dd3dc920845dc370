use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{CONTENT_TYPE_ADULT, CONTENT_TYPE_SAFE};
use crate::utils::{PixupError, Result};

/// Content flag sent to the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    Safe,
    Adult,
}

impl ContentType {
    /// `false -> "0"`, `true -> "1"`
    pub fn from_public_flag(is_public: bool) -> Self {
        if is_public {
            Self::Adult
        } else {
            Self::Safe
        }
    }

    pub fn as_form_value(&self) -> &'static str {
        match self {
            Self::Safe => CONTENT_TYPE_SAFE,
            Self::Adult => CONTENT_TYPE_ADULT,
        }
    }
}

/// A gallery as assigned by the remote service at creation.
///
/// Fields are write-once: the only ways to obtain one are a successful
/// create call or rebuilding it from hashes the user already holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryDescriptor {
    name: String,
    is_public: bool,
    hash: String,
    upload_hash: String,
    url: String,
}

impl GalleryDescriptor {
    pub fn new(
        name: impl Into<String>,
        is_public: bool,
        hash: impl Into<String>,
        upload_hash: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            is_public,
            hash: hash.into(),
            upload_hash: upload_hash.into(),
            url: url.into(),
        }
    }

    /// Rebuild a descriptor for a gallery created in an earlier run.
    /// Name and URL are only used for the galleries log and may be empty.
    pub fn from_hashes(
        hash: impl Into<String>,
        upload_hash: impl Into<String>,
        url: Option<String>,
        name: Option<String>,
    ) -> Self {
        Self::new(
            name.unwrap_or_default(),
            false,
            hash,
            upload_hash,
            url.unwrap_or_default(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn content_type(&self) -> ContentType {
        ContentType::from_public_flag(self.is_public)
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn upload_hash(&self) -> &str {
        &self.upload_hash
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Upload and finalize both need the two hashes
    pub fn ensure_active(&self) -> Result<()> {
        if self.hash.trim().is_empty() || self.upload_hash.trim().is_empty() {
            return Err(PixupError::InvalidState(
                "gallery hash and upload hash are both required".to_string(),
            ));
        }
        Ok(())
    }
}

/// One successfully uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub source_path: PathBuf,
    pub display_url: String,
}

/// Per-item outcome of the upload batch
#[derive(Debug)]
pub enum UploadOutcome {
    Uploaded(UploadResult),
    Failed { source_path: PathBuf, error: PixupError },
}

impl UploadOutcome {
    pub fn source_path(&self) -> &Path {
        match self {
            Self::Uploaded(result) => &result.source_path,
            Self::Failed { source_path, .. } => source_path,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Uploaded(_))
    }
}

/// Emitted after every attempt, success or failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    pub completed: usize,
    pub total: usize,
}

impl UploadProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 * 100.0 / self.total as f64
    }
}

/// Everything the batch did, in source order
#[derive(Debug)]
pub struct UploadReport {
    pub outcomes: Vec<UploadOutcome>,
    pub total: usize,
    pub cancelled: bool,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl UploadReport {
    pub fn successes(&self) -> impl Iterator<Item = &UploadResult> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            UploadOutcome::Uploaded(result) => Some(result),
            UploadOutcome::Failed { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &PixupError)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            UploadOutcome::Failed { source_path, error } => Some((source_path.as_path(), error)),
            UploadOutcome::Uploaded(_) => None,
        })
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Paths never attempted because the batch was cancelled
    pub fn skipped(&self) -> usize {
        self.total - self.outcomes.len()
    }
}

/// One line of the galleries log: `<url>,<name>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryLogEntry {
    pub url: String,
    pub name: String,
}

impl GalleryLogEntry {
    pub fn to_line(&self) -> String {
        format!("{},{}", self.url, self.name)
    }

    /// Split on the first comma; gallery names may contain commas, URLs don't
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return None;
        }
        let (url, name) = line.split_once(',').unwrap_or((line, ""));
        Some(Self {
            url: url.to_string(),
            name: name.to_string(),
        })
    }
}

impl From<&GalleryDescriptor> for GalleryLogEntry {
    fn from(descriptor: &GalleryDescriptor) -> Self {
        Self {
            url: descriptor.url().to_string(),
            name: descriptor.name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(ContentType::from_public_flag(false).as_form_value(), "0");
        assert_eq!(ContentType::from_public_flag(true).as_form_value(), "1");
    }

    #[test]
    fn test_descriptor_requires_both_hashes() {
        let ok = GalleryDescriptor::new("g", false, "h1", "h2", "u");
        assert!(ok.ensure_active().is_ok());

        for (hash, upload_hash) in [("", "h2"), ("h1", ""), ("", ""), ("  ", "h2")] {
            let descriptor = GalleryDescriptor::from_hashes(hash, upload_hash, None, None);
            assert!(matches!(
                descriptor.ensure_active(),
                Err(PixupError::InvalidState(_))
            ));
        }
    }

    #[test]
    fn test_log_entry_line_format() {
        let entry = GalleryLogEntry::from(&GalleryDescriptor::new("g", false, "h1", "h2", "u"));
        assert_eq!(entry.to_line(), "u,g");
    }

    #[test]
    fn test_log_entry_parse_keeps_commas_in_name() {
        let entry = GalleryLogEntry::parse_line("https://pixhost.to/gallery/abc,cats, dogs\n").unwrap();
        assert_eq!(entry.url, "https://pixhost.to/gallery/abc");
        assert_eq!(entry.name, "cats, dogs");
        assert_eq!(GalleryLogEntry::parse_line(""), None);
    }

    #[test]
    fn test_progress_percent() {
        let progress = UploadProgress { completed: 1, total: 4 };
        assert_eq!(progress.percent(), 25.0);
        assert_eq!(UploadProgress { completed: 0, total: 0 }.percent(), 100.0);
    }
}
