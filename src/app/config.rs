use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    CONTENT_TYPE_SAFE, DEFAULT_API_BASE_URL, DEFAULT_CLIPBOARD_HAND_OFF_SECS,
    DEFAULT_GALLERIES_LOG, DEFAULT_IMAGE_LINKS_LOG, DEFAULT_MAX_TH_SIZE, DEFAULT_UPLOAD_PACE_MS, DEFAULT_USER_AGENT, ENV_PREFIX,
    LOCAL_CONFIG_PATH,
};
use crate::utils::PixupError;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Upload batch settings
    #[serde(default)]
    pub upload: UploadConfig,

    /// Local log files
    #[serde(default)]
    pub storage: StorageConfig,

    /// Clipboard settings
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the image host API
    pub base_url: String,
    /// Request timeout; unset means the HTTP client default
    pub timeout_secs: Option<u64>,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Upload batch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Pause after every upload attempt, in milliseconds
    pub pace_ms: u64,
    /// `content_type` form value sent with each image
    pub content_type: String,
    /// Thumbnail size requested from the host
    pub max_th_size: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            pace_ms: DEFAULT_UPLOAD_PACE_MS,
            content_type: CONTENT_TYPE_SAFE.to_string(),
            max_th_size: DEFAULT_MAX_TH_SIZE.to_string(),
        }
    }
}

impl UploadConfig {
    pub fn pace(&self) -> Duration {
        Duration::from_millis(self.pace_ms)
    }
}

/// Local log file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `<url>,<name>` per finalized gallery
    pub galleries_log: PathBuf,
    /// `<show_url>` per uploaded image
    pub image_links_log: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            galleries_log: PathBuf::from(DEFAULT_GALLERIES_LOG),
            image_links_log: PathBuf::from(DEFAULT_IMAGE_LINKS_LOG),
        }
    }
}

/// Clipboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Copy the finalized gallery URL to the system clipboard
    pub enabled: bool,
    /// On Linux the copying process owns the selection; keep serving it this
    /// long, or until a clipboard manager takes it over. 0 disables the wait.
    pub hand_off_secs: u64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hand_off_secs: DEFAULT_CLIPBOARD_HAND_OFF_SECS,
        }
    }
}

impl ClipboardConfig {
    pub fn hand_off(&self) -> Duration {
        Duration::from_secs(self.hand_off_secs)
    }
}

impl Config {
    /// Reject values the remote service or the upload loop can't work with
    pub fn validate(&self) -> crate::utils::Result<()> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(PixupError::ConfigError(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.upload.max_th_size.parse::<u32>().is_err() {
            return Err(PixupError::ConfigError(format!(
                "upload.max_th_size must be a number, got '{}'",
                self.upload.max_th_size
            )));
        }
        if self.upload.content_type != "0" && self.upload.content_type != "1" {
            return Err(PixupError::ConfigError(format!(
                "upload.content_type must be \"0\" or \"1\", got '{}'",
                self.upload.content_type
            )));
        }
        Ok(())
    }
}

/// Layer defaults, config files (later files win) and `PIXUP_` env vars
fn build_figment(files: &[PathBuf]) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for file in files {
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }
    }

    // PIXUP_UPLOAD__PACE_MS=0 -> upload.pace_ms
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load configuration from multiple sources
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut files = vec![get_config_dir()?.join("config.toml"), PathBuf::from(LOCAL_CONFIG_PATH)];

    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        files.push(path.to_path_buf());
    }

    let config: Config = build_figment(&files)
        .extract()
        .context("Failed to load configuration")?;
    config.validate()?;
    Ok(config)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "pixup") {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join("pixup"))
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist.
/// Returns the path when a file was written.
pub fn init_config() -> Result<Option<PathBuf>> {
    let config_file = get_config_dir()?.join("config.toml");

    if config_file.exists() {
        return Ok(None);
    }

    save_config(&Config::default(), Some(config_file.clone()))?;
    Ok(Some(config_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_original_tool() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.pixhost.to");
        assert_eq!(config.api.timeout(), None);
        assert_eq!(config.upload.pace(), Duration::from_secs(1));
        assert_eq!(config.upload.content_type, "0");
        assert_eq!(config.upload.max_th_size, "420");
        assert_eq!(config.storage.galleries_log, PathBuf::from("galleries_info.txt"));
        assert_eq!(config.storage.image_links_log, PathBuf::from("image_links.txt"));
        assert!(config.clipboard.enabled);
        assert_eq!(config.clipboard.hand_off(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_layer_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("config.toml");
        std::fs::write(
            &file,
            "[upload]\npace_ms = 250\n\n[api]\ntimeout_secs = 30\n",
        )
        .unwrap();

        let config: Config = build_figment(&[file]).extract().unwrap();
        assert_eq!(config.upload.pace_ms, 250);
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(30)));
        // Untouched keys keep their defaults
        assert_eq!(config.upload.max_th_size, "420");
        assert_eq!(config.api.base_url, "https://api.pixhost.to");
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let config: Config = build_figment(&[PathBuf::from("/nonexistent/pixup.toml")])
            .extract()
            .unwrap();
        assert_eq!(config.upload.pace_ms, 1000);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.clipboard.enabled = false;
        config.clipboard.hand_off_secs = 0;
        save_config(&config, Some(file.clone())).unwrap();

        let loaded: Config = build_figment(&[file]).extract().unwrap();
        assert!(!loaded.clipboard.enabled);
        assert_eq!(loaded.clipboard.hand_off_secs, 0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.api.base_url = "api.pixhost.to".to_string();
        assert!(matches!(config.validate(), Err(PixupError::ConfigError(_))));

        let mut config = Config::default();
        config.upload.max_th_size = "big".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.upload.content_type = "2".to_string();
        assert!(config.validate().is_err());
    }
}
