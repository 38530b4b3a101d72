//! Configuration management for Chronopage.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "Chronopage";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page fetch settings.
    pub fetch: FetchConfig,

    /// Search query defaults.
    pub search: SearchConfig,

    /// File paths.
    pub paths: PathsConfig,
}

/// Which transport retrieves rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchBackend {
    /// Plain HTTP requests.
    Direct,
    /// A FlareSolverr instance that renders the page in a browser.
    Flaresolverr,
}

/// Page fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Transport used to retrieve pages.
    pub backend: FetchBackend,

    /// FlareSolverr endpoint.
    pub flaresolverr_url: String,

    /// Render timeout handed to FlareSolverr, in milliseconds.
    pub max_timeout_ms: u64,

    /// Client-side request timeout in seconds.
    pub timeout_sec: u64,

    /// Delay between web requests in seconds.
    pub delay_between_requests_sec: f64,

    /// Total attempts per page (1 disables retrying).
    pub retries: u32,

    /// Base delay for exponential backoff between attempts, in seconds.
    pub retry_base_delay_sec: f64,

    /// Enable fetch and resolver debug logging.
    pub debug: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            backend: FetchBackend::Flaresolverr,
            flaresolverr_url: "http://localhost:8191/v1".to_string(),
            max_timeout_ms: 60_000,
            timeout_sec: 30,
            delay_between_requests_sec: 1.0,
            retries: 3,
            retry_base_delay_sec: 1.0,
            debug: false,
        }
    }
}

/// Search defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Site origin that relative pagination links are joined against.
    pub base_url: String,

    /// Listings per results page.
    pub page_size: u32,

    /// Sort order code (5 = newest listings first).
    pub sort_order: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.chrono24.com".to_string(),
            page_size: 120,
            sort_order: 5,
        }
    }
}

/// File path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory for extracted listings.
    pub output_directory: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("json_results"),
        }
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.page_size == 0 {
            return Err(invalid("search.page_size", "must be greater than 0"));
        }

        if url::Url::parse(&self.search.base_url).is_err() {
            return Err(invalid("search.base_url", "must be an absolute URL"));
        }

        if self.fetch.backend == FetchBackend::Flaresolverr
            && url::Url::parse(&self.fetch.flaresolverr_url).is_err()
        {
            return Err(invalid("fetch.flaresolverr_url", "must be an absolute URL"));
        }

        if self.fetch.retries == 0 {
            return Err(invalid("fetch.retries", "must be at least 1"));
        }

        if self.fetch.delay_between_requests_sec < 0.0 || self.fetch.retry_base_delay_sec < 0.0 {
            return Err(invalid("fetch", "delays cannot be negative"));
        }

        Ok(())
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.page_size, 120);
        assert_eq!(config.search.sort_order, 5);
        assert_eq!(config.fetch.backend, FetchBackend::Flaresolverr);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.search.base_url, "https://www.chrono24.com");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[fetch]\nbackend = \"direct\"\nretries = 5\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.fetch.backend, FetchBackend::Direct);
        assert_eq!(config.fetch.retries, 5);
        assert_eq!(config.fetch.timeout_sec, 30);
        assert_eq!(config.search.page_size, 120);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[fetch\nbackend = ").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_zero_page_size() {
        let mut config = Config::default();
        config.search.page_size = 0;

        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "search.page_size"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_zero_retries() {
        let mut config = Config::default();
        config.fetch.retries = 0;
        assert!(config.validate().is_err());
    }
}
