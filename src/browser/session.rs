//! Chromium-backed fetch sessions over CDP.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, NavigateParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{
    check_status, detect_block, FetchError, FetchRequest, PageSource, RenderedContent, RenderedPage,
    STEALTH_ARGS, STEALTH_SCRIPTS,
};
use crate::config::{BrowserEngineConfig, BrowserEngineType};
use crate::pacing::{PacingPolicy, ScrollPlan};

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

const CHROME_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// JavaScript to wait for page ready state.
const WAIT_FOR_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

/// A browser held for exactly one target.
struct Session {
    browser: Browser,
    handler: JoinHandle<()>,
    /// Launched by us, so closing it is ours to do.
    owned: bool,
}

impl Session {
    async fn teardown(mut self) {
        if self.owned {
            if let Err(e) = self.browser.close().await {
                debug!("Browser close failed: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                debug!("Browser process wait failed: {}", e);
            }
        }
        self.handler.abort();
    }
}

/// Renders each request in a fresh Chromium session.
pub struct ChromeSessionSource {
    config: BrowserEngineConfig,
    pacing: PacingPolicy,
}

impl ChromeSessionSource {
    pub fn new(config: BrowserEngineConfig, pacing: PacingPolicy) -> Self {
        Self { config, pacing }
    }

    fn find_chrome(&self) -> Result<PathBuf, FetchError> {
        if let Some(path) = &self.config.executable {
            if path.exists() {
                return Ok(path.clone());
            }
            warn!("Configured Chrome {} not found, searching", path.display());
        }

        for path in CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                debug!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in CHROME_COMMANDS {
            if let Ok(path) = which::which(cmd) {
                debug!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(FetchError::session(
            "Chrome/Chromium not found. Install it or set CHROME_PATH:\n\
             - Ubuntu/Debian: sudo apt install chromium-browser\n\
             - Fedora: sudo dnf install chromium\n\
             - Or download from: https://www.google.com/chrome/",
        ))
    }

    async fn open_session(&self) -> Result<Session, FetchError> {
        match self.config.remote_url.clone() {
            Some(url) => self.connect_remote(&url).await,
            None => self.launch().await,
        }
    }

    async fn launch(&self) -> Result<Session, FetchError> {
        debug!("Launching browser (headless={})", self.config.headless);
        let chrome_path = self.find_chrome()?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(self.config.viewport.width, self.config.viewport.height)
            .request_timeout(Duration::from_secs(self.config.timeout));

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(ref proxy) = self.config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }
        for arg in STEALTH_ARGS {
            builder = builder.arg(*arg);
        }
        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| FetchError::session(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::session(format!("Failed to launch browser: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Session {
            browser,
            handler,
            owned: true,
        })
    }

    async fn connect_remote(&self, url: &str) -> Result<Session, FetchError> {
        info!("Connecting to remote browser at {}", url);

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await
            .map_err(|e| FetchError::session(format!("Failed to reach remote browser: {}", e)))?
            .json()
            .await
            .map_err(|e| FetchError::session(format!("Bad browser version info: {}", e)))?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| FetchError::session("No webSocketDebuggerUrl in response"))?;

        let handler_config = chromiumoxide::handler::HandlerConfig {
            request_timeout: Duration::from_secs(self.config.timeout),
            ..Default::default()
        };

        let (browser, mut handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .map_err(|e| FetchError::session(format!("Failed to connect to browser: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Session {
            browser,
            handler,
            owned: false,
        })
    }

    /// Identity and fingerprint setup, all before the first navigation.
    async fn prepare_page(&self, page: &Page) -> Result<(), FetchError> {
        page.execute(SetUserAgentOverrideParams::new(
            self.config.user_agent.clone(),
        ))
        .await
        .map_err(FetchError::session)?;

        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(self.config.viewport.width),
            i64::from(self.config.viewport.height),
            1.0,
            false,
        ))
        .await
        .map_err(FetchError::session)?;

        if self.config.engine == BrowserEngineType::Stealth {
            debug!("Registering stealth scripts");
            for script in STEALTH_SCRIPTS {
                page.execute(AddScriptToEvaluateOnNewDocumentParams::new(
                    script.to_string(),
                ))
                .await
                .map_err(FetchError::session)?;
            }
        }
        Ok(())
    }

    async fn navigate(&self, page: &Page, url: &str) -> Result<(), FetchError> {
        debug!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| FetchError::session(format!("Invalid URL {}: {}", url, e)))?;

        let navigation = async {
            let response = page.execute(nav_params).await?;
            let document = page.wait_for_navigation_response().await?;
            Ok::<_, chromiumoxide::error::CdpError>((response, document))
        };
        let (response, document) = tokio::time::timeout(
            Duration::from_millis(self.config.timeout_ms()),
            navigation,
        )
        .await
        .map_err(|_| FetchError::NavigationTimeout {
            url: url.to_string(),
            timeout_ms: self.config.timeout_ms(),
        })?
        .map_err(|e| FetchError::session(format!("Navigation failed for {}: {}", url, e)))?;

        if let Some(error_text) = response.result.error_text.as_deref() {
            if !error_text.is_empty() {
                return Err(FetchError::blocked(url, error_text));
            }
        }

        // Main-document status; absent for cached or about: loads
        if let Some(status) = document
            .as_ref()
            .and_then(|request| request.response.as_ref())
            .map(|response| response.status)
        {
            debug!("Document status {} for {}", status, url);
            check_status(url, status)?;
        }
        Ok(())
    }

    async fn wait_for_ready(&self, page: &Page) {
        match tokio::time::timeout(
            Duration::from_secs(self.config.timeout),
            page.evaluate(WAIT_FOR_READY_SCRIPT.to_string()),
        )
        .await
        {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => debug!("Could not check ready state: {}", e),
            Err(_) => warn!("Timeout waiting for page ready state"),
        }
    }

    async fn scroll(&self, page: &Page, plan: ScrollPlan) {
        for _ in 0..plan.steps {
            if let Err(e) = page
                .evaluate(format!("window.scrollBy(0, {})", plan.step_px))
                .await
            {
                debug!("Scroll step failed: {}", e);
                break;
            }
            tokio::time::sleep(plan.interval).await;
        }
    }

    async fn capture(&self, page: &Page, url: &str) -> Result<RenderedPage, FetchError> {
        let final_url = page
            .url()
            .await
            .map_err(FetchError::session)?
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());
        let html = page.content().await.map_err(FetchError::session)?;

        if let Some(reason) = detect_block(&html) {
            return Err(FetchError::blocked(url, reason));
        }

        Ok(RenderedPage {
            url: url.to_string(),
            final_url,
            html,
        })
    }

    async fn render_supplement(&self, page: &Page, url: &str) -> Result<RenderedPage, FetchError> {
        self.navigate(page, url).await?;
        self.wait_for_ready(page).await;
        self.pacing.settle().await;
        self.capture(page, url).await
    }

    async fn render_on_page(
        &self,
        page: &Page,
        request: &FetchRequest,
    ) -> Result<RenderedContent, FetchError> {
        self.prepare_page(page).await?;

        self.pacing.before_navigation().await;
        self.navigate(page, &request.url).await?;
        self.wait_for_ready(page).await;
        self.scroll(page, self.pacing.scroll_plan(request.kind)).await;
        self.pacing.settle().await;

        let primary = self.capture(page, &request.url).await?;

        let mut supplements = Vec::with_capacity(request.supplementary.len());
        for url in &request.supplementary {
            match self.render_supplement(page, url).await {
                Ok(rendered) => supplements.push(rendered),
                Err(e) => warn!("Supplementary page {} unavailable: {}", url, e),
            }
        }

        Ok(RenderedContent {
            page: primary,
            supplements,
        })
    }

    async fn render_in(
        &self,
        browser: &Browser,
        request: &FetchRequest,
    ) -> Result<RenderedContent, FetchError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(FetchError::session)?;

        let result = self.render_on_page(&page, request).await;
        if let Err(e) = page.close().await {
            debug!("Page close failed: {}", e);
        }
        result
    }
}

#[async_trait]
impl PageSource for ChromeSessionSource {
    async fn render(&self, request: &FetchRequest) -> Result<RenderedContent, FetchError> {
        let session = self.open_session().await?;
        let result = self.render_in(&session.browser, request).await;
        // Teardown runs on success and failure alike
        session.teardown().await;
        result
    }
}
