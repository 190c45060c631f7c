//! One Chrome session per site worker.
//!
//! [`BrowserSession`] owns the browser process, the CDP handler task, and a
//! single page. It is not shared between workers; each worker opens its own
//! and must call [`BrowserSession::close`] on every exit path.

mod challenge;
mod elements;
mod stealth;

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::dom::MenuPage;
use crate::error::ScraperError;

pub use challenge::{await_stable, is_challenge, PageProbe, CHALLENGE_MARKERS};
pub use stealth::{pick_user_agent, STEALTH_ARGS, STEALTH_SCRIPTS, USER_AGENTS};

/// Common Chrome executable locations, checked when no path is configured.
const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub headless: bool,
    /// Explicit Chrome binary; otherwise [`CHROME_PATHS`] are searched and
    /// then chromiumoxide's own detection is used.
    pub chrome_path: Option<PathBuf>,
    /// Hide automation markers and inject [`STEALTH_SCRIPTS`].
    pub stealth: bool,
    pub navigation_timeout: Duration,
    /// Fixed wait after each navigation for client-side rendering.
    pub settle: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            stealth: true,
            navigation_timeout: Duration::from_secs(60),
            settle: Duration::from_secs(15),
        }
    }
}

pub struct BrowserSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    user_agent: &'static str,
    navigation_timeout: Duration,
    settle: Duration,
    probe_seq: AtomicU64,
}

impl BrowserSession {
    /// Launch Chrome and prepare a blank page.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Browser`] if Chrome cannot be launched or the
    /// page cannot be configured. The browser is closed before returning.
    pub async fn open(options: &SessionOptions) -> Result<Self, ScraperError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1920, 1080);

        if let Some(path) = resolve_chrome(options.chrome_path.as_deref()) {
            builder = builder.chrome_executable(path);
        }
        if !options.headless {
            builder = builder.with_head();
        }
        if options.stealth {
            for arg in STEALTH_ARGS {
                builder = builder.arg(*arg);
            }
        }

        let config = builder
            .build()
            .map_err(|e| ScraperError::Browser(format!("invalid browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::Browser(format!("failed to launch Chrome: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "CDP handler event error");
                }
            }
        });

        let mut session = Self {
            browser: Some(browser),
            page: None,
            handler: Some(handler),
            user_agent: pick_user_agent(),
            navigation_timeout: options.navigation_timeout,
            settle: options.settle,
            probe_seq: AtomicU64::new(0),
        };

        match session.prepare_page(options.stealth).await {
            Ok(page) => {
                session.page = Some(page);
                tracing::info!(
                    headless = options.headless,
                    stealth = options.stealth,
                    user_agent = session.user_agent,
                    "browser session opened"
                );
                Ok(session)
            }
            Err(e) => {
                session.close().await;
                Err(e)
            }
        }
    }

    async fn prepare_page(&self, stealth: bool) -> Result<Page, ScraperError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| ScraperError::Browser("session is closed".to_string()))?;

        let page = browser.new_page("about:blank").await?;
        page.execute(SetUserAgentOverrideParams::new(self.user_agent))
            .await?;

        if stealth {
            for script in STEALTH_SCRIPTS {
                page.execute(AddScriptToEvaluateOnNewDocumentParams::new(*script))
                    .await?;
            }
        }

        Ok(page)
    }

    /// The user agent this session presents.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        self.user_agent
    }

    pub(crate) fn page(&self) -> Result<&Page, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::Browser("session is closed".to_string()))
    }

    pub(crate) fn next_probe_tag(&self) -> u64 {
        self.probe_seq
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    }

    /// Run a script in the page and return its JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Script`] if the script throws or its result is
    /// not JSON-representable.
    pub async fn evaluate(&self, js: &str) -> Result<serde_json::Value, ScraperError> {
        self.page()?
            .evaluate(js)
            .await
            .map_err(|e| ScraperError::Script(e.to_string()))?
            .into_value::<serde_json::Value>()
            .map_err(|e| ScraperError::Script(e.to_string()))
    }

    /// Close the browser and stop the CDP handler. Safe to call repeatedly
    /// and after any earlier failure.
    pub async fn close(&mut self) {
        self.page = None;
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                tracing::debug!(error = %e, "browser close reported an error");
            }
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
            tracing::debug!("browser session closed");
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

impl PageProbe for BrowserSession {
    async fn title(&self) -> Result<String, ScraperError> {
        Ok(self.page()?.get_title().await?.unwrap_or_default())
    }

    async fn markup(&self) -> Result<String, ScraperError> {
        Ok(self.page()?.content().await?)
    }
}

impl MenuPage for BrowserSession {
    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        let page = self.page()?;
        tracing::debug!(url, "navigating");

        match tokio::time::timeout(self.navigation_timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(ScraperError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(ScraperError::Navigation {
                    url: url.to_string(),
                    reason: format!(
                        "timed out after {}s",
                        self.navigation_timeout.as_secs()
                    ),
                });
            }
        }

        tokio::time::sleep(self.settle).await;
        Ok(())
    }
}

fn resolve_chrome(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        return Some(path.to_path_buf());
    }
    CHROME_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}
