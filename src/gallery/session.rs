use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use super::types::{GalleryDescriptor, GalleryLogEntry, UploadReport};
use super::workflow::{GalleryWorkflow, UploadObserver};
use crate::utils::{PixupError, Result};

/// Where a gallery is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryState {
    /// Nothing exists remotely yet
    Created,
    /// Hashes assigned; images can be added
    Active(GalleryDescriptor),
    /// Sealed; no further uploads or finalize calls
    Finalized {
        descriptor: GalleryDescriptor,
        entry: GalleryLogEntry,
    },
}

impl GalleryState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Active(_) => "active",
            Self::Finalized { .. } => "finalized",
        }
    }
}

/// One gallery taken through `Created -> Active -> Finalized`.
///
/// Each call is only accepted from the state it belongs to, so a session
/// never uploads before creation and never finalizes twice.
pub struct GallerySession<'w> {
    workflow: &'w GalleryWorkflow,
    state: GalleryState,
}

impl<'w> GallerySession<'w> {
    pub fn new(workflow: &'w GalleryWorkflow) -> Self {
        Self {
            workflow,
            state: GalleryState::Created,
        }
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn descriptor(&self) -> Option<&GalleryDescriptor> {
        match &self.state {
            GalleryState::Created => None,
            GalleryState::Active(descriptor) => Some(descriptor),
            GalleryState::Finalized { descriptor, .. } => Some(descriptor),
        }
    }

    /// `Created -> Active` through the remote create call
    pub async fn create(&mut self, name: &str, is_public: bool) -> Result<&GalleryDescriptor> {
        self.expect_created("create")?;
        let descriptor = self.workflow.create_gallery(name, is_public).await?;
        self.state = GalleryState::Active(descriptor);
        self.active_descriptor("create")
    }

    /// `Created -> Active` for a gallery created in an earlier run
    pub fn resume(&mut self, descriptor: GalleryDescriptor) -> Result<&GalleryDescriptor> {
        self.expect_created("resume")?;
        descriptor.ensure_active()?;
        self.state = GalleryState::Active(descriptor);
        self.active_descriptor("resume")
    }

    /// Only valid while `Active`; the state does not change
    pub async fn upload(
        &self,
        paths: Vec<PathBuf>,
        cancel: &CancellationToken,
        observer: Option<&dyn UploadObserver>,
    ) -> Result<UploadReport> {
        let descriptor = self.active_descriptor("upload")?;
        self.workflow
            .upload_images(descriptor, paths, cancel, observer)
            .await
    }

    /// `Active -> Finalized`; rejected from every other state
    pub async fn finalize(&mut self) -> Result<&GalleryLogEntry> {
        let descriptor = self.active_descriptor("finalize")?.clone();
        let entry = self.workflow.finalize_gallery(&descriptor).await?;
        self.state = GalleryState::Finalized { descriptor, entry };

        match &self.state {
            GalleryState::Finalized { entry, .. } => Ok(entry),
            _ => Err(self.wrong_state("finalize")),
        }
    }

    fn expect_created(&self, operation: &str) -> Result<()> {
        match self.state {
            GalleryState::Created => Ok(()),
            _ => Err(self.wrong_state(operation)),
        }
    }

    fn active_descriptor(&self, operation: &str) -> Result<&GalleryDescriptor> {
        match &self.state {
            GalleryState::Active(descriptor) => Ok(descriptor),
            _ => Err(self.wrong_state(operation)),
        }
    }

    fn wrong_state(&self, operation: &str) -> PixupError {
        PixupError::InvalidState(format!(
            "cannot {} a gallery that is {}",
            operation,
            self.state.label()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CreatedGallery, MockGalleryApi};
    use crate::app::UploadConfig;
    use crate::clipboard::NoClipboard;
    use crate::storage::{GalleriesLog, ImageLinksLog};
    use tempfile::TempDir;

    fn workflow(dir: &TempDir, api: MockGalleryApi) -> GalleryWorkflow {
        GalleryWorkflow::new(
            Box::new(api),
            Box::new(NoClipboard),
            GalleriesLog::new(dir.path().join("galleries_info.txt")),
            ImageLinksLog::new(dir.path().join("image_links.txt")),
            UploadConfig {
                pace_ms: 0,
                ..UploadConfig::default()
            },
        )
    }

    fn created() -> CreatedGallery {
        CreatedGallery {
            gallery_name: "g".to_string(),
            gallery_hash: "h1".to_string(),
            gallery_upload_hash: "h2".to_string(),
            gallery_url: "u".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_and_finalize_rejected_before_create() {
        let dir = TempDir::new().unwrap();
        let mut api = MockGalleryApi::new();
        api.expect_upload_image().times(0);
        api.expect_finalize_gallery().times(0);
        let workflow = workflow(&dir, api);
        let mut session = GallerySession::new(&workflow);

        let err = session
            .upload(vec![dir.path().join("a.png")], &CancellationToken::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PixupError::InvalidState(_)));

        let err = session.finalize().await.unwrap_err();
        assert!(matches!(err, PixupError::InvalidState(_)));
        assert_eq!(session.state(), &GalleryState::Created);
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let dir = TempDir::new().unwrap();
        let mut api = MockGalleryApi::new();
        api.expect_create_gallery()
            .times(1)
            .returning(|_| Ok(created()));
        api.expect_finalize_gallery()
            .times(1)
            .returning(|_, _| Ok(()));
        let workflow = workflow(&dir, api);
        let mut session = GallerySession::new(&workflow);

        let descriptor = session.create("g", false).await.unwrap();
        assert_eq!(descriptor.hash(), "h1");
        assert_eq!(session.state().label(), "active");

        let report = session
            .upload(Vec::new(), &CancellationToken::new(), None)
            .await
            .unwrap();
        assert_eq!(report.total, 0);

        let entry = session.finalize().await.unwrap().clone();
        assert_eq!(entry.to_line(), "u,g");
        assert_eq!(session.state().label(), "finalized");

        // A sealed gallery is never finalized a second time
        let err = session.finalize().await.unwrap_err();
        assert!(matches!(err, PixupError::InvalidState(_)));
        assert!(session.create("again", false).await.is_err());

        let logged = std::fs::read_to_string(dir.path().join("galleries_info.txt")).unwrap();
        assert_eq!(logged, "u,g\n");
    }

    #[tokio::test]
    async fn test_failed_create_stays_created() {
        let dir = TempDir::new().unwrap();
        let mut api = MockGalleryApi::new();
        api.expect_create_gallery().times(1).returning(|_| {
            Err(PixupError::RemoteError {
                operation: "create gallery",
                status: 500,
            })
        });
        let workflow = workflow(&dir, api);
        let mut session = GallerySession::new(&workflow);

        assert!(session.create("g", false).await.is_err());
        assert_eq!(session.state(), &GalleryState::Created);
        assert!(session.descriptor().is_none());
    }

    #[test]
    fn test_resume_requires_hashes() {
        let dir = TempDir::new().unwrap();
        let workflow = workflow(&dir, MockGalleryApi::new());
        let mut session = GallerySession::new(&workflow);

        let incomplete = GalleryDescriptor::from_hashes("h1", "", None, None);
        assert!(session.resume(incomplete).is_err());
        assert_eq!(session.state(), &GalleryState::Created);

        let complete = GalleryDescriptor::from_hashes("h1", "h2", Some("u".to_string()), None);
        session.resume(complete).unwrap();
        assert_eq!(session.descriptor().map(|d| d.url()), Some("u"));
    }
}
