#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use notice_engine::{
    FailureKind, FetchError, Notification, NotificationChannel, NotifyError, PageRenderer,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(notice_logging::initialize_for_tests);
}

/// Serves fixed markup per URL; unknown URLs fail like a 404.
#[derive(Default)]
pub struct CannedPages {
    pages: HashMap<String, Result<String, FetchError>>,
    requests: Mutex<Vec<String>>,
}

impl CannedPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), Ok(html.into()));
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            Err(FetchError::new(FailureKind::Network, "connection reset")),
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PageRenderer for CannedPages {
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::new(FailureKind::Status(404), "not found")))
    }
}

/// Channel that records what it was given and succeeds or fails on demand.
#[derive(Clone)]
pub struct RecordingChannel {
    name: String,
    fail: bool,
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingChannel {
    pub fn succeeding(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::succeeding(name)
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            Err(NotifyError::HttpStatus(502))
        } else {
            Ok(())
        }
    }
}

/// Listing page in the shape most boards use: a table of titled anchors.
pub fn listing(rows: &[(&str, &str)]) -> String {
    let rows = rows
        .iter()
        .map(|(title, href)| {
            format!(r#"<tr><td class="subject"><a href="{href}" title="{title}">{title}</a></td></tr>"#)
        })
        .collect::<String>();
    format!("<html><body><table>{rows}</table></body></html>")
}
