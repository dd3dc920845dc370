// Gateway module for the gallery workflow - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod selection;
mod session;
mod types;
mod workflow;

// Public re-exports - the ONLY way to access gallery functionality
pub use selection::{collect_image_paths, is_image_path};
pub use session::{GallerySession, GalleryState};
pub use types::{
    ContentType, GalleryDescriptor, GalleryLogEntry, UploadOutcome, UploadProgress, UploadReport,
    UploadResult,
};
pub use workflow::{GalleryWorkflow, UploadObserver};
