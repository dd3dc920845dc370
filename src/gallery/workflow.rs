use chrono::Local;
use futures::{stream, Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use super::types::{
    GalleryDescriptor, GalleryLogEntry, UploadOutcome, UploadProgress, UploadReport, UploadResult,
};
use crate::api::{GalleryApi, ImageUpload};
use crate::app::{Config, UploadConfig};
use crate::clipboard::ClipboardSink;
use crate::storage::{GalleriesLog, ImageLinksLog};
use crate::utils::{log_error, log_info, log_warn, PixupError, Result};

/// Receives upload notifications while a batch runs
pub trait UploadObserver: Send + Sync {
    /// One path was attempted; called for successes and failures alike
    fn on_attempt(&self, _outcome: &UploadOutcome, _progress: UploadProgress) {}

    /// Every path was attempted, or the batch was cancelled
    fn on_finished(&self, _report: &UploadReport) {}
}

/// Drives create -> upload -> finalize against a [`GalleryApi`].
///
/// Ordering is not enforced here; see [`super::GallerySession`] for that.
pub struct GalleryWorkflow {
    api: Box<dyn GalleryApi>,
    clipboard: Box<dyn ClipboardSink>,
    galleries_log: GalleriesLog,
    image_links: ImageLinksLog,
    upload: UploadConfig,
}

impl GalleryWorkflow {
    pub fn new(
        api: Box<dyn GalleryApi>,
        clipboard: Box<dyn ClipboardSink>,
        galleries_log: GalleriesLog,
        image_links: ImageLinksLog,
        upload: UploadConfig,
    ) -> Self {
        Self {
            api,
            clipboard,
            galleries_log,
            image_links,
            upload,
        }
    }

    /// Wire a workflow from loaded configuration
    pub fn from_config(
        config: &Config,
        api: Box<dyn GalleryApi>,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        Self::new(
            api,
            clipboard,
            GalleriesLog::new(&config.storage.galleries_log),
            ImageLinksLog::new(&config.storage.image_links_log),
            config.upload.clone(),
        )
    }

    pub fn galleries_log(&self) -> &GalleriesLog {
        &self.galleries_log
    }

    pub fn image_links(&self) -> &ImageLinksLog {
        &self.image_links
    }

    /// Create a remote gallery. An empty name never reaches the network.
    pub async fn create_gallery(&self, name: &str, is_public: bool) -> Result<GalleryDescriptor> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PixupError::InvalidInput(
                "a gallery name is required".to_string(),
            ));
        }

        let created = self.api.create_gallery(name).await?;
        log_info("📁", format!("Created gallery '{}' at {}", created.gallery_name, created.gallery_url));

        Ok(GalleryDescriptor::new(
            created.gallery_name,
            is_public,
            created.gallery_hash,
            created.gallery_upload_hash,
            created.gallery_url,
        ))
    }

    /// Lazily upload `paths` in order, one outcome per attempted path.
    ///
    /// The pacing delay runs after every attempt. The token is checked
    /// between items and interrupts the delay; once it fires no further
    /// path is attempted.
    pub fn upload_stream<'a>(
        &'a self,
        descriptor: &'a GalleryDescriptor,
        paths: Vec<PathBuf>,
        cancel: CancellationToken,
    ) -> Result<impl Stream<Item = (UploadOutcome, UploadProgress)> + 'a> {
        descriptor.ensure_active()?;

        let total = paths.len();
        Ok(stream::unfold(
            (paths.into_iter(), 0usize),
            move |(mut remaining, completed)| {
                let cancel = cancel.clone();
                async move {
                    if completed > 0 {
                        self.pause(&cancel).await;
                    }
                    if cancel.is_cancelled() {
                        return None;
                    }

                    let path = remaining.next()?;
                    let outcome = self.upload_one(descriptor, path).await;
                    let progress = UploadProgress {
                        completed: completed + 1,
                        total,
                    };
                    Some(((outcome, progress), (remaining, completed + 1)))
                }
            },
        ))
    }

    /// Upload every path and collect the ordered outcomes.
    ///
    /// Per-item failures are reported to `observer` and kept in the
    /// report; they never abort the batch.
    pub async fn upload_images(
        &self,
        descriptor: &GalleryDescriptor,
        paths: Vec<PathBuf>,
        cancel: &CancellationToken,
        observer: Option<&dyn UploadObserver>,
    ) -> Result<UploadReport> {
        let started_at = Local::now();
        let total = paths.len();
        let mut uploads = Box::pin(self.upload_stream(descriptor, paths, cancel.clone())?);

        let mut outcomes = Vec::with_capacity(total);
        while let Some((outcome, progress)) = uploads.next().await {
            match &outcome {
                UploadOutcome::Uploaded(result) => log_info(
                    "📤",
                    format!("Uploaded {} -> {}", result.source_path.display(), result.display_url),
                ),
                UploadOutcome::Failed { source_path, error } => log_warn(
                    "⚠️",
                    format!("Failed to upload {}: {}", source_path.display(), error),
                ),
            }
            if let Some(observer) = observer {
                observer.on_attempt(&outcome, progress);
            }
            outcomes.push(outcome);
        }

        let report = UploadReport {
            cancelled: outcomes.len() < total,
            outcomes,
            total,
            started_at,
            finished_at: Local::now(),
        };

        if let Some(observer) = observer {
            observer.on_finished(&report);
        }
        Ok(report)
    }

    /// Seal the gallery, record it in the galleries log and copy its URL.
    ///
    /// Not guarded against repeats: finalizing twice appends twice.
    pub async fn finalize_gallery(&self, descriptor: &GalleryDescriptor) -> Result<GalleryLogEntry> {
        descriptor.ensure_active()?;
        if descriptor.url().trim().is_empty() {
            return Err(PixupError::InvalidInput(
                "a gallery URL is required to finalize".to_string(),
            ));
        }

        self.api
            .finalize_gallery(descriptor.hash(), descriptor.upload_hash())
            .await?;

        let entry = GalleryLogEntry::from(descriptor);
        if let Err(e) = self.galleries_log.record(&entry) {
            // The remote side is already sealed; keep the URL visible somewhere
            log_error("❌", format!("Gallery {} finalized but not logged: {}", entry.url, e));
            return Err(e);
        }

        if let Err(e) = self.clipboard.copy_text(descriptor.url()) {
            log_warn("📋", format!("Could not copy gallery URL to clipboard: {}", e));
        }

        log_info("✅", format!("Finalized gallery {}", entry.url));
        Ok(entry)
    }

    async fn upload_one(&self, descriptor: &GalleryDescriptor, path: PathBuf) -> UploadOutcome {
        match self.try_upload(descriptor, &path).await {
            Ok(display_url) => UploadOutcome::Uploaded(UploadResult {
                source_path: path,
                display_url,
            }),
            Err(error) => UploadOutcome::Failed {
                source_path: path,
                error,
            },
        }
    }

    async fn try_upload(&self, descriptor: &GalleryDescriptor, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PixupError::io(path, e))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let uploaded = self
            .api
            .upload_image(ImageUpload {
                file_name,
                bytes,
                content_type: self.upload.content_type.clone(),
                gallery_hash: descriptor.hash().to_string(),
                gallery_upload_hash: descriptor.upload_hash().to_string(),
                max_th_size: self.upload.max_th_size.clone(),
            })
            .await?;

        // The image is hosted either way; a missing log line is not a failed upload
        if let Err(e) = self.image_links.record(&uploaded.show_url) {
            log_warn("📝", format!("Could not log {}: {}", uploaded.show_url, e));
        }

        Ok(uploaded.show_url)
    }

    async fn pause(&self, cancel: &CancellationToken) {
        if self.upload.pace_ms == 0 {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.upload.pace()) => {}
            _ = cancel.cancelled() => {}
        }
    }
}
