use std::panic::AssertUnwindSafe;

use futures_util::future::join_all;
use futures_util::FutureExt;
use notice_core::{DedupState, Digest, DigestStyle, KeywordFilter, SourceConfig};
use notice_logging::{notice_error, notice_info};

use crate::crawler::SourceCrawler;
use crate::notify::{Notification, NotificationChannel};
use crate::persist::PersistError;
use crate::store::DedupStore;
use crate::{ChannelFailure, RunOutcome};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("no notification channel configured")]
    NoChannels,
    #[error("digest was sent but the dedup state could not be saved: {0}")]
    Commit(#[from] PersistError),
}

/// One batch pass: crawl every source, send one digest, then commit.
pub struct NoticeWatcher {
    crawler: SourceCrawler,
    store: Box<dyn DedupStore>,
    channels: Vec<Box<dyn NotificationChannel>>,
    style: DigestStyle,
}

impl NoticeWatcher {
    pub fn new(crawler: SourceCrawler, store: Box<dyn DedupStore>) -> Self {
        Self {
            crawler,
            store,
            channels: Vec::new(),
            style: DigestStyle::default(),
        }
    }

    pub fn with_channel(mut self, channel: Box<dyn NotificationChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn with_style(mut self, style: DigestStyle) -> Self {
        self.style = style;
        self
    }

    /// Runs the pass. The store is written only after every channel accepted
    /// the digest; any dispatch failure leaves it exactly as loaded.
    pub async fn run(
        &self,
        sources: &[SourceConfig],
        keywords: &KeywordFilter,
    ) -> Result<RunOutcome, RunError> {
        if self.channels.is_empty() {
            return Err(RunError::NoChannels);
        }

        let mut state = self.store.load();
        let digest = self.collect(sources, keywords, &state).await;
        if digest.is_empty() {
            notice_info!("새로운 공고 없음 (no new notices)");
            return Ok(RunOutcome::NothingNew);
        }

        let notification = Notification {
            subject: self.style.subject.clone(),
            body: digest.render(&self.style),
        };
        let failures = self.dispatch(&notification).await;
        if !failures.is_empty() {
            notice_error!(
                "Dispatch failed on {} channel(s); {} entries stay eligible for the next run",
                failures.len(),
                digest.entry_count()
            );
            return Ok(RunOutcome::DispatchFailed { failures });
        }

        let counts = digest.counts();
        notice_info!("Digest sent. Entries per source:");
        for (source, count) in &counts {
            notice_info!(" - {}: {}", source, count);
        }

        digest.merge_into(&mut state);
        self.store.commit(&state)?;
        Ok(RunOutcome::Notified { counts })
    }

    /// Crawls all sources concurrently and groups their results in
    /// configuration order. A failing source contributes nothing.
    pub async fn collect(
        &self,
        sources: &[SourceConfig],
        keywords: &KeywordFilter,
        known: &DedupState,
    ) -> Digest {
        let crawls = sources.iter().map(|source| {
            AssertUnwindSafe(self.crawler.crawl(source, keywords, known)).catch_unwind()
        });
        let results = join_all(crawls).await;

        let mut digest = Digest::new();
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(Ok(entries)) => digest.push(source.name.clone(), entries),
                Ok(Err(err)) => notice_error!("[{}] crawl failed: {}", source.name, err),
                Err(_) => notice_error!("[{}] crawl panicked; source skipped", source.name),
            }
        }
        digest
    }

    async fn dispatch(&self, notification: &Notification) -> Vec<ChannelFailure> {
        let mut failures = Vec::new();
        for channel in &self.channels {
            match channel.send(notification).await {
                Ok(()) => notice_info!("Digest delivered via {}", channel.name()),
                Err(err) => {
                    notice_error!("Digest delivery via {} failed: {}", channel.name(), err);
                    failures.push(ChannelFailure {
                        channel: channel.name().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }
        failures
    }
}
