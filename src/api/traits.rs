use async_trait::async_trait;

use super::types::{CreatedGallery, ImageUpload, UploadedImage};
use crate::utils::Result;

/// The three calls the gallery workflow makes against the image host
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GalleryApi: Send + Sync {
    /// `POST /galleries`
    async fn create_gallery(&self, name: &str) -> Result<CreatedGallery>;

    /// `POST /images`
    async fn upload_image(&self, upload: ImageUpload) -> Result<UploadedImage>;

    /// `POST /galleries/{gallery_hash}/finalize`
    async fn finalize_gallery(&self, gallery_hash: &str, upload_hash: &str) -> Result<()>;
}
