//! Notice watcher core: pure source model, identity rules, filtering and digest helpers.
mod digest;
mod entry;
mod identity;
mod keywords;
mod scan;
mod source;
mod state;

pub use digest::{Digest, DigestGroup, DigestStyle};
pub use entry::{NormalizedEntry, RawEntry};
pub use identity::{normalize_title, resolve_identity, DEFAULT_ID_PARAMS};
pub use keywords::KeywordFilter;
pub use scan::{ScanVerdict, SourceScan};
pub use source::{resolve_link, IdentityStrategy, RenderMode, SourceConfig, MAX_PAGES};
pub use state::DedupState;
