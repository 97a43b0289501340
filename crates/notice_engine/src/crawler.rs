use std::time::Duration;

use notice_core::{
    DedupState, KeywordFilter, NormalizedEntry, ScanVerdict, SourceConfig, SourceScan,
};
use notice_logging::{notice_debug, notice_info, notice_warn};

use crate::extract::{EntrySelector, SelectorError};
use crate::render::Renderers;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CrawlError {
    #[error("source '{source_name}': {error}")]
    InvalidSelector {
        source_name: String,
        #[source]
        error: SelectorError,
    },
}

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Pause between two page fetches of the same source.
    pub page_delay: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(200),
        }
    }
}

/// Walks the pages of one source and keeps the new, keyword-matching entries.
#[derive(Clone)]
pub struct SourceCrawler {
    renderers: Renderers,
    settings: CrawlSettings,
}

impl SourceCrawler {
    pub fn new(renderers: Renderers, settings: CrawlSettings) -> Self {
        Self {
            renderers,
            settings,
        }
    }

    /// Entries of `source` that match `keywords` and are absent from `known`,
    /// in discovery order. Page failures are logged and skipped.
    pub async fn crawl(
        &self,
        source: &SourceConfig,
        keywords: &KeywordFilter,
        known: &DedupState,
    ) -> Result<Vec<NormalizedEntry>, CrawlError> {
        let selector =
            EntrySelector::parse(&source.selector).map_err(|error| CrawlError::InvalidSelector {
                source_name: source.name.clone(),
                error,
            })?;
        let renderer = self.renderers.for_mode(source.render_mode);
        let mut scan = SourceScan::new(source, keywords, known);

        for page in 1..=source.page_count() {
            if page > 1 && !self.settings.page_delay.is_zero() {
                tokio::time::sleep(self.settings.page_delay).await;
            }

            let url = source.page_url(page);
            notice_info!("[{}] Fetching URL: {}", source.name, url);
            let html = match renderer.render(&url).await {
                Ok(html) => html,
                Err(err) => {
                    notice_warn!("[{}] error fetching page {}: {}", source.name, page, err);
                    continue;
                }
            };

            let candidates = selector.extract(&html);
            notice_debug!(
                "[{}] page {}: {} candidates",
                source.name,
                page,
                candidates.len()
            );
            for raw in &candidates {
                let verdict = scan.offer(raw);
                notice_debug!(
                    "[{}] {:?}: {} ({})",
                    source.name,
                    verdict,
                    raw.text,
                    raw.link
                );
                if verdict == ScanVerdict::Accepted {
                    notice_info!("[{}] New notice: {}", source.name, raw.text.trim());
                }
            }
        }

        let found = scan.finish();
        notice_info!("[{}] {} new matching entries", source.name, found.len());
        Ok(found)
    }
}
