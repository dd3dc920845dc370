pub mod api;
pub mod app;
pub mod cli;
pub mod clipboard;
pub mod constants;
pub mod gallery;
pub mod storage;
pub mod utils;

pub use app::{load_config, Config};
pub use gallery::{GalleryDescriptor, GallerySession, GalleryWorkflow};
pub use utils::PixupError;
