use url::Url;

use crate::source::{IdentityStrategy, SourceConfig};

/// Identifier query parameters, checked in order. `roRndUid` (NTIS) comes first.
pub const DEFAULT_ID_PARAMS: &[&str] = &[
    "roRndUid",
    "pblancId",
    "id",
    "noticeId",
    "seq",
    "article_seq",
    "idx",
];

// Only used to read the query string of relative links.
const PLACEHOLDER_BASE: &str = "http://placeholder.invalid/";

/// Collapses whitespace runs to single spaces and trims.
pub fn normalize_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derives the identity token of an entry using the source's strategy.
///
/// Never fails: link-derived identity falls back to the raw link when no
/// identifier parameter carries a value.
pub fn resolve_identity(source: &SourceConfig, raw_link: &str, raw_title: &str) -> String {
    match source.identity {
        IdentityStrategy::Title => {
            let title = normalize_title(raw_title);
            if title.is_empty() {
                raw_link.trim().to_string()
            } else {
                title
            }
        }
        IdentityStrategy::Link => link_identifier(raw_link, &source.id_params())
            .unwrap_or_else(|| raw_link.trim().to_string()),
    }
}

fn link_identifier(raw_link: &str, params: &[&str]) -> Option<String> {
    let link = raw_link.trim();
    let parsed = Url::parse(link)
        .or_else(|_| Url::parse(PLACEHOLDER_BASE).and_then(|base| base.join(link)))
        .ok()?;

    params.iter().find_map(|param| {
        parsed
            .query_pairs()
            .filter(|(key, _)| key.as_ref() == *param)
            .map(|(_, value)| value.trim().to_string())
            .find(|value| !value.is_empty())
    })
}
