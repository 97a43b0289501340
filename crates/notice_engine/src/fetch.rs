use std::time::Duration;

use futures_util::StreamExt;
use notice_logging::notice_debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;

use crate::decode::decode_markup;
use crate::render::PageRenderer;
use crate::{FailureKind, FetchError, FetchedPage};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    /// Whole-request budget, body included.
    pub request_timeout: Duration,
    pub max_redirects: usize,
    pub max_bytes: u64,
    /// Media types accepted as listing markup. A missing header is accepted.
    pub markup_types: Vec<String>,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(20),
            max_redirects: 5,
            max_bytes: 5 * 1024 * 1024,
            markup_types: vec!["text/html".to_string(), "application/xhtml+xml".to_string()],
            user_agent: concat!("notice_watch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Static-mode renderer: one GET per page over a shared client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: u64,
    markup_types: Vec<String>,
}

impl HttpFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent)
            .redirect(Policy::limited(settings.max_redirects))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            client,
            max_bytes: settings.max_bytes,
            markup_types: settings.markup_types,
        })
    }

    /// Downloads one page. Non-2xx answers, non-markup media types and bodies
    /// over the size cap are errors.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let target = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::BadUrl, err.to_string()))?;

        let response = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::Status(status.as_u16()),
                response.url().as_str(),
            ));
        }

        if let Some(declared_len) = response.content_length() {
            self.check_size(declared_len)?;
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if let Some(declared) = content_type.as_deref() {
            self.accept_media_type(declared)?;
        }

        let final_url = response.url().clone();
        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(classify)?;
            self.check_size(body.len() as u64 + chunk.len() as u64)?;
            body.extend_from_slice(&chunk);
        }

        Ok(FetchedPage {
            redirected: final_url != target,
            url: final_url.into(),
            content_type,
            body,
        })
    }

    fn accept_media_type(&self, declared: &str) -> Result<(), FetchError> {
        let essence = declared.split(';').next().unwrap_or_default().trim();
        if self
            .markup_types
            .iter()
            .any(|known| known.eq_ignore_ascii_case(essence))
        {
            return Ok(());
        }
        Err(FetchError::new(
            FailureKind::NotMarkup {
                content_type: essence.to_string(),
            },
            "",
        ))
    }

    fn check_size(&self, received: u64) -> Result<(), FetchError> {
        if received <= self.max_bytes {
            return Ok(());
        }
        Err(FetchError::new(
            FailureKind::TooLarge {
                limit: self.max_bytes,
                received,
            },
            "",
        ))
    }
}

#[async_trait::async_trait]
impl PageRenderer for HttpFetcher {
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let page = self.fetch(url).await?;
        let decoded = decode_markup(&page.body, page.content_type.as_deref());
        notice_debug!(
            "Fetched {} ({} bytes as {}{})",
            page.url,
            page.body.len(),
            decoded.encoding_label,
            if page.redirected { ", redirected" } else { "" }
        );
        Ok(decoded.html)
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_redirect() {
        FailureKind::TooManyRedirects
    } else {
        FailureKind::Network
    };
    FetchError::new(kind, err.to_string())
}
