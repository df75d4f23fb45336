//! Configuration management for marketscout using the prefer crate.

pub mod browser;
pub mod pacing;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::Platform;

pub use browser::{BrowserEngineConfig, BrowserEngineType, Viewport, DEFAULT_USER_AGENT};
pub use pacing::{DelayRange, PacingConfig, ScrollProfile};

/// Default store document filename.
pub const DEFAULT_STORE_FILENAME: &str = "market_db.json";

/// Default bulk output filename.
pub const DEFAULT_OUTPUT_FILENAME: &str = "results.json";

/// Default number of listings kept per keyword discovery.
pub const DEFAULT_DISCOVERY_LIMIT: usize = 5;

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Marketplace used when a command does not name one.
    #[serde(default)]
    pub platform: Platform,
    /// Path of the market store document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    /// Where bulk runs write their results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    /// Listings kept per keyword during discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_limit: Option<usize>,
    #[serde(default)]
    pub browser: BrowserEngineConfig,
    /// Pacing overrides keyed by platform name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub pacing: HashMap<String, PacingConfig>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover and load the config file, falling back to defaults.
    pub async fn load() -> Self {
        // Use prefer for file discovery, then parse with serde
        match prefer::load("marketscout").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}; using defaults", e);
                            Self::default_with_env()
                        }
                    }
                } else {
                    Self::default_with_env()
                }
            }
            Err(_) => {
                // No config file found, use defaults with env overrides
                Self::default_with_env()
            }
        }
    }

    /// Defaults with environment overrides applied.
    pub fn default_with_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load from an explicit path; the format follows the file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config.with_env_overrides())
    }

    fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        match ext {
            "toml" => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e)),
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        self.browser = self.browser.with_env_overrides();
        if let Ok(val) = std::env::var("MSCOUT_STORE") {
            if !val.is_empty() {
                self.store_path = Some(PathBuf::from(val));
            }
        }
        self
    }

    /// Directory relative paths resolve against: the config file's directory, else the CWD.
    pub fn base_dir(&self) -> PathBuf {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        let path = expand_home(path);
        if path.is_absolute() {
            path
        } else {
            self.base_dir().join(path)
        }
    }

    pub fn store_path(&self) -> PathBuf {
        let path = self
            .store_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILENAME));
        self.resolve(&path)
    }

    pub fn output_file(&self) -> PathBuf {
        let path = self
            .output_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILENAME));
        self.resolve(&path)
    }

    pub fn discovery_limit(&self) -> usize {
        self.discovery_limit.unwrap_or(DEFAULT_DISCOVERY_LIMIT)
    }

    /// Pacing for a marketplace: configured entry or built-in defaults, then env overrides.
    pub fn pacing_for(&self, platform: Platform) -> PacingConfig {
        self.pacing
            .get(platform.as_str())
            .cloned()
            .unwrap_or_else(|| PacingConfig::defaults_for(platform))
            .with_env_overrides()
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_toml_config() {
        let src = r#"
            platform = "domeggook"
            store_path = "data/market.json"
            discovery_limit = 8

            [browser]
            headless = false

            [pacing.gmarket]
            detail_concurrency = 2
        "#;
        let config = Config::parse(src, "toml").unwrap();
        assert_eq!(config.platform, Platform::Domeggook);
        assert_eq!(config.discovery_limit(), 8);
        assert!(!config.browser.headless);
        assert_eq!(config.pacing["gmarket"].detail_concurrency, 2);
    }

    #[test]
    fn parse_json_config() {
        let config = Config::parse(r#"{"platform": "aliexpress"}"#, "json").unwrap();
        assert_eq!(config.platform, Platform::Aliexpress);
        assert_eq!(config.discovery_limit(), DEFAULT_DISCOVERY_LIMIT);
    }

    #[test]
    fn parse_rejects_unknown_platform() {
        assert!(Config::parse(r#"platform = "ebay""#, "toml").is_err());
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let config = Config {
            store_path: Some(PathBuf::from("db.json")),
            source_path: Some(PathBuf::from("/etc/marketscout/marketscout.toml")),
            ..Default::default()
        };
        assert_eq!(
            config.store_path(),
            PathBuf::from("/etc/marketscout/db.json")
        );
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/m.json")), home.join("m.json"));
        }
        assert_eq!(expand_home(Path::new("a/~")), PathBuf::from("a/~"));
    }

    #[test]
    fn pacing_falls_back_to_platform_defaults() {
        let config = Config::default();
        assert_eq!(
            config.pacing_for(Platform::Aliexpress).scroll,
            PacingConfig::defaults_for(Platform::Aliexpress).scroll
        );
    }

    #[tokio::test]
    async fn load_from_path_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marketscout.yaml");
        std::fs::write(&path, "platform: gmarket\noutput_file: out.json\n").unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.output_file(), dir.path().join("out.json"));
    }
}
