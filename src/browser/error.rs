//! Fetch session errors.

use thiserror::Error;

/// Why a page could not be rendered.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The browser could not be launched, reached, or driven.
    #[error("Browser session failed: {0}")]
    Session(String),

    #[error("Navigation timed out after {timeout_ms}ms for {url}")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    /// Navigation was refused or landed on a challenge page.
    #[error("Navigation blocked for {url}: {reason}")]
    NavigationBlocked { url: String, reason: String },
}

impl FetchError {
    pub fn session(message: impl std::fmt::Display) -> Self {
        Self::Session(message.to_string())
    }

    pub fn blocked(url: &str, reason: impl Into<String>) -> Self {
        Self::NavigationBlocked {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}
