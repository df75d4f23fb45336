//! Browser engine configuration types.
//!
//! These types live here (always compiled) rather than behind
//! `#[cfg(feature = "browser")]` so config parsing works without the browser feature.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default user agent for browser sessions.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Browser engine types.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BrowserEngineType {
    /// Chromium with fingerprint-suppression scripts (default).
    #[default]
    Stealth,

    /// No stealth patches (for debugging).
    Standard,
}

/// Page viewport in CSS pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Browser engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserEngineConfig {
    /// Browser engine type.
    #[serde(default)]
    pub engine: BrowserEngineType,

    /// Run in headless mode (default: true).
    /// Set to false when a marketplace keeps serving challenge pages, to watch what happens.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080").
    #[serde(default)]
    pub proxy: Option<String>,

    /// Navigation timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Explicit Chrome/Chromium executable.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, sessions connect to an existing browser instead of launching one.
    /// Can also be set via BROWSER_URL environment variable.
    #[serde(default)]
    pub remote_url: Option<String>,

    #[serde(default)]
    pub viewport: Viewport,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            engine: BrowserEngineType::default(),
            headless: default_headless(),
            proxy: None,
            timeout: default_timeout(),
            chrome_args: Vec::new(),
            executable: None,
            remote_url: None,
            viewport: Viewport::default(),
            user_agent: default_user_agent(),
        }
    }
}

impl BrowserEngineConfig {
    /// Apply environment variable overrides.
    ///
    /// - `BROWSER_URL` - Remote Chrome DevTools URL
    /// - `CHROME_PATH` - Chrome/Chromium executable
    /// - `SOCKS_PROXY` - Proxy for browser traffic (e.g., "socks5://127.0.0.1:9050")
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("BROWSER_URL") {
            if !val.is_empty() {
                self.remote_url = Some(val);
            }
        }

        if let Ok(val) = std::env::var("CHROME_PATH") {
            if !val.is_empty() {
                self.executable = Some(PathBuf::from(val));
            }
        }

        // Set proxy from SOCKS_PROXY if not already configured
        if self.proxy.is_none() {
            if let Ok(val) = std::env::var("SOCKS_PROXY") {
                if !val.is_empty() {
                    self.proxy = Some(val);
                }
            }
        }

        self
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.saturating_mul(1000)
    }
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
