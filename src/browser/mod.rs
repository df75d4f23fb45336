//! Fetch sessions.
//!
//! Each target gets one isolated browser session: pace, navigate, scroll,
//! settle, capture the rendered document, then tear the session down. Any
//! supplementary same-item pages (option popups) are rendered in the same
//! session before teardown.

mod block;
mod error;
#[cfg(feature = "browser")]
mod session;
mod stealth;

pub use block::{check_status, detect_block};
pub use error::FetchError;
#[cfg(feature = "browser")]
pub use session::ChromeSessionSource;
pub use stealth::{STEALTH_ARGS, STEALTH_SCRIPTS};

use async_trait::async_trait;

use crate::pacing::FetchKind;

/// What to render.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    /// Same-item pages rendered after the primary page.
    pub supplementary: Vec<String>,
    pub kind: FetchKind,
}

impl FetchRequest {
    pub fn detail(url: impl Into<String>, supplementary: Vec<String>) -> Self {
        Self {
            url: url.into(),
            supplementary,
            kind: FetchKind::Detail,
        }
    }

    pub fn discovery(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            supplementary: Vec::new(),
            kind: FetchKind::Discovery,
        }
    }
}

/// One rendered document.
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    pub url: String,
    pub final_url: String,
    pub html: String,
}

impl RenderedPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            html: html.into(),
        }
    }
}

/// Everything a session captured before teardown.
#[derive(Debug, Clone, Default)]
pub struct RenderedContent {
    pub page: RenderedPage,
    /// Supplementary pages that rendered; failed ones are absent.
    pub supplements: Vec<RenderedPage>,
}

impl RenderedContent {
    pub fn html(&self) -> &str {
        &self.page.html
    }

    /// Supplementary page whose requested URL contains `needle`.
    pub fn supplement(&self, needle: &str) -> Option<&RenderedPage> {
        self.supplements.iter().find(|p| p.url.contains(needle))
    }
}

/// Something that can render pages. The browser session in production, canned HTML in tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn render(&self, request: &FetchRequest) -> Result<RenderedContent, FetchError>;
}

/// Stand-in used when the crate is built without the `browser` feature.
#[cfg(not(feature = "browser"))]
pub struct ChromeSessionSource;

#[cfg(not(feature = "browser"))]
impl ChromeSessionSource {
    pub fn new(
        _config: crate::config::BrowserEngineConfig,
        _pacing: crate::pacing::PacingPolicy,
    ) -> Self {
        Self
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl PageSource for ChromeSessionSource {
    async fn render(&self, _request: &FetchRequest) -> Result<RenderedContent, FetchError> {
        Err(FetchError::session(
            "Browser support not compiled. Rebuild with: cargo build --features browser",
        ))
    }
}
