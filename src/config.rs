//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Wiki endpoints and HTTP behavior
    #[serde(default)]
    pub wiki: WikiConfig,

    /// Persistent cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Rate limiting between uncached requests
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Generated artifact settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        if !path.as_ref().exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if !self.wiki.base_url.starts_with("http") {
            return Err(AppError::config("wiki.base_url must be an http(s) URL"));
        }
        if self.wiki.user_agent.trim().is_empty() {
            return Err(AppError::config("wiki.user_agent is empty"));
        }
        if self.wiki.timeout_secs == 0 {
            return Err(AppError::config("wiki.timeout_secs must be > 0"));
        }
        if self.cache.ttl_hours == 0 {
            return Err(AppError::config("cache.ttl_hours must be > 0"));
        }
        if self.fetch.sleep_secs < FetchConfig::MIN_SLEEP_SECS {
            return Err(AppError::config(format!(
                "fetch.sleep_secs {} < {}s! Please be gentle with zdoom.org :-(",
                self.fetch.sleep_secs,
                FetchConfig::MIN_SLEEP_SECS
            )));
        }
        if self.output.base.trim().is_empty() {
            return Err(AppError::config("output.base is empty"));
        }
        Ok(())
    }
}

/// Wiki endpoints and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    /// Origin of the wiki, used to resolve relative links
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Path of the page listing categories by type
    #[serde(default = "defaults::spawnable_path")]
    pub spawnable_path: String,

    /// Path of the canonical class index page
    #[serde(default = "defaults::classes_path")]
    pub classes_path: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl WikiConfig {
    /// Absolute URL of the categories-by-type index page.
    pub fn spawnable_url(&self) -> String {
        format!("{}{}", self.base_url, self.spawnable_path)
    }

    /// Absolute URL of the canonical class index page.
    pub fn classes_url(&self) -> String {
        format!("{}{}", self.base_url, self.classes_path)
    }

    /// Absolute URL of an individual class page.
    pub fn class_url(&self, class_name: &str) -> String {
        format!("{}/wiki/Classes:{}", self.base_url, class_name)
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            spawnable_path: defaults::spawnable_path(),
            classes_path: defaults::classes_path(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Persistent cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory to store cache files
    #[serde(default = "defaults::cache_dir")]
    pub dir: String,

    /// Cache time-to-live in hours. The source dataset changes rarely,
    /// so the default is about one year to minimize server load.
    #[serde(default = "defaults::cache_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: defaults::cache_dir(),
            ttl_hours: defaults::cache_ttl_hours(),
        }
    }
}

/// Rate limiting settings for uncached per-class fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Delay in seconds before each uncached class-page request
    #[serde(default = "defaults::sleep_secs")]
    pub sleep_secs: f64,
}

impl FetchConfig {
    /// Hard floor on the per-request delay, required by the source policy.
    pub const MIN_SLEEP_SECS: f64 = 0.75;
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            sleep_secs: defaults::sleep_secs(),
        }
    }
}

/// Generated artifact settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base name for the output file, without extension
    #[serde(default = "defaults::output_base")]
    pub base: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base: defaults::output_base(),
        }
    }
}

mod defaults {
    pub fn base_url() -> String {
        "https://zdoom.org".into()
    }
    pub fn spawnable_path() -> String {
        "/wiki/Category:Spawnable".into()
    }
    pub fn classes_path() -> String {
        "/wiki/Classes:Doom".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; classfetch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn cache_dir() -> String {
        ".cache".into()
    }
    pub fn cache_ttl_hours() -> u64 {
        8766 // one year
    }
    pub fn sleep_secs() -> f64 {
        5.0
    }
    pub fn output_base() -> String {
        "doom_classes".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.wiki.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_subfloor_sleep() {
        let mut config = Config::default();
        config.fetch.sleep_secs = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_ttl() {
        let mut config = Config::default();
        config.cache.ttl_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn class_url_formats_wiki_path() {
        let wiki = WikiConfig::default();
        assert_eq!(
            wiki.class_url("ZombieMan"),
            "https://zdoom.org/wiki/Classes:ZombieMan"
        );
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let config = Config::load_or_default("does_not_exist.toml");
        assert_eq!(config.cache.ttl_hours, 8766);
    }
}
