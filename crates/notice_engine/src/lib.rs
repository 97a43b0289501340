//! Notice watcher engine: page rendering, crawling, persistence and dispatch.
mod browser;
mod config;
mod crawler;
mod decode;
mod driver;
mod extract;
mod fetch;
mod notify;
mod persist;
mod render;
mod store;
mod types;

pub use browser::{BrowserRenderer, BrowserSettings};
pub use config::{load_sources, parse_sources, ConfigError};
pub use crawler::{CrawlError, CrawlSettings, SourceCrawler};
pub use decode::{decode_markup, DecodedPage};
pub use driver::{NoticeWatcher, RunError};
pub use extract::{EntrySelector, SelectorError};
pub use fetch::{FetchSettings, HttpFetcher};
pub use notify::{
    EmailChannel, EmailSettings, Notification, NotificationChannel, NotifyError, WebhookChannel,
};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use render::{PageRenderer, Renderers};
pub use store::{DedupStore, JsonFileStore};
pub use types::{ChannelFailure, FailureKind, FetchError, FetchedPage, RunOutcome};
