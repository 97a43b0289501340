use std::sync::Arc;

use notice_core::RenderMode;

use crate::browser::{BrowserRenderer, BrowserSettings};
use crate::fetch::{FetchSettings, HttpFetcher};
use crate::FetchError;

/// Turns a page URL into markup.
///
/// Failures are per page; callers log them and move on.
#[async_trait::async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, FetchError>;
}

/// One renderer per [`RenderMode`], picked by the source configuration.
#[derive(Clone)]
pub struct Renderers {
    static_renderer: Arc<dyn PageRenderer>,
    browser_renderer: Arc<dyn PageRenderer>,
}

impl Renderers {
    pub fn new(
        static_renderer: Arc<dyn PageRenderer>,
        browser_renderer: Arc<dyn PageRenderer>,
    ) -> Self {
        Self {
            static_renderer,
            browser_renderer,
        }
    }

    /// The same renderer for both modes; handy when a test serves canned markup.
    pub fn uniform(renderer: Arc<dyn PageRenderer>) -> Self {
        Self::new(renderer.clone(), renderer)
    }

    pub fn with_settings(
        fetch: FetchSettings,
        browser: BrowserSettings,
    ) -> Result<Self, FetchError> {
        Ok(Self::new(
            Arc::new(HttpFetcher::new(fetch)?),
            Arc::new(BrowserRenderer::new(browser)),
        ))
    }

    pub fn for_mode(&self, mode: RenderMode) -> &dyn PageRenderer {
        match mode {
            RenderMode::Static => self.static_renderer.as_ref(),
            RenderMode::Browser => self.browser_renderer.as_ref(),
        }
    }
}
