/// Constants module to avoid magic numbers in the codebase

// Remote API
pub const DEFAULT_API_BASE_URL: &str = "https://api.pixhost.to";
pub const GALLERIES_ENDPOINT: &str = "/galleries";
pub const IMAGES_ENDPOINT: &str = "/images";
pub const ACCEPT_JSON: &str = "application/json";
pub const DEFAULT_USER_AGENT: &str = concat!("pixup/", env!("CARGO_PKG_VERSION"));

// Upload form values
pub const CONTENT_TYPE_SAFE: &str = "0";
pub const CONTENT_TYPE_ADULT: &str = "1";
pub const DEFAULT_MAX_TH_SIZE: &str = "420";
pub const IMAGE_FIELD: &str = "img";

// Pacing between upload attempts
pub const DEFAULT_UPLOAD_PACE_MS: u64 = 1000;

// Local logs, relative to the working directory
pub const DEFAULT_GALLERIES_LOG: &str = "galleries_info.txt";
pub const DEFAULT_IMAGE_LINKS_LOG: &str = "image_links.txt";

// Clipboard
// How long a Linux clipboard owner keeps serving the URL after finalize
pub const DEFAULT_CLIPBOARD_HAND_OFF_SECS: u64 = 10;

// Image Selection
pub const IMAGE_EXTENSIONS: &[&str] = &["webp", "gif", "jpg", "jpeg", "png"];

// Configuration
pub const ENV_PREFIX: &str = "PIXUP_";
pub const LOCAL_CONFIG_PATH: &str = ".pixup/config.toml";
