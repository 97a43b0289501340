//! Rendered-mode page fetching through a headless Chrome session.
//!
//! Every page gets its own browser process. The session is closed before
//! `render` returns, whether the capture succeeded, failed or timed out.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures_util::StreamExt;
use notice_logging::{notice_debug, notice_warn};
use tokio::task::JoinHandle;

use crate::render::PageRenderer;
use crate::{FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Wait after navigation so client-side scripts can fill the listing.
    pub settle_delay: Duration,
    /// Upper bound for navigation, settle and capture together.
    pub page_timeout: Duration,
    /// Graceful shutdown budget; the process is killed past it.
    pub close_timeout: Duration,
    pub chrome_executable: Option<PathBuf>,
    pub extra_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(2),
            page_timeout: Duration::from_secs(45),
            close_timeout: Duration::from_secs(5),
            chrome_executable: None,
            extra_args: vec!["--disable-dev-shm-usage".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BrowserRenderer {
    settings: BrowserSettings,
}

impl BrowserRenderer {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl PageRenderer for BrowserRenderer {
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let session = BrowserSession::open(&self.settings).await?;
        let captured = tokio::time::timeout(
            self.settings.page_timeout,
            session.capture(url, self.settings.settle_delay),
        )
        .await;
        session.close(self.settings.close_timeout).await;

        match captured {
            Ok(result) => result,
            Err(_) => Err(FetchError::new(
                FailureKind::Timeout,
                format!("page not rendered within {:?}", self.settings.page_timeout),
            )),
        }
    }
}

struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    async fn open(settings: &BrowserSettings) -> Result<Self, FetchError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(settings.page_timeout);
        for arg in &settings.extra_args {
            builder = builder.arg(arg.clone());
        }
        if let Some(path) = &settings.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|err| FetchError::new(FailureKind::Browser, err))?;

        let (browser, mut events) = Browser::launch(config).await.map_err(browser_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        notice_debug!("Browser session opened");

        Ok(Self { browser, handler })
    }

    async fn capture(&self, url: &str, settle_delay: Duration) -> Result<String, FetchError> {
        let page = self.browser.new_page(url).await.map_err(browser_error)?;
        tokio::time::sleep(settle_delay).await;
        let html = page.content().await.map_err(browser_error);
        if let Err(err) = page.close().await {
            notice_debug!("Closing tab for {} failed: {}", url, err);
        }
        html
    }

    async fn close(mut self, limit: Duration) {
        let browser = &mut self.browser;
        let graceful = finish_within(limit, async {
            if let Err(err) = browser.close().await {
                notice_warn!("Browser close failed: {}", err);
            }
            if let Err(err) = browser.wait().await {
                notice_warn!("Waiting for browser exit failed: {}", err);
            }
        })
        .await;

        if !graceful {
            notice_warn!("Browser still running after {:?}; killing it", limit);
            if let Some(Err(err)) = self.browser.kill().await {
                notice_warn!("Killing browser failed: {}", err);
            }
        }
        self.handler.abort();
        notice_debug!("Browser session closed");
    }
}

/// Runs `work` for at most `limit`; false when it had to be abandoned.
async fn finish_within(limit: Duration, work: impl Future<Output = ()>) -> bool {
    tokio::time::timeout(limit, work).await.is_ok()
}

fn browser_error(err: chromiumoxide::error::CdpError) -> FetchError {
    FetchError::new(FailureKind::Browser, err.to_string())
}
