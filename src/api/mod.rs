// Gateway module for the remote API - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod client;
mod traits;
mod types;

// Public re-exports - the ONLY way to access api functionality
pub use client::PixhostClient;
pub use traits::GalleryApi;
#[cfg(test)]
pub use traits::MockGalleryApi;
pub use types::{CreatedGallery, ImageUpload, UploadedImage};
