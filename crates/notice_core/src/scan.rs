use std::collections::HashSet;

use crate::{
    normalize_title, resolve_identity, DedupState, KeywordFilter, NormalizedEntry, RawEntry,
    SourceConfig,
};

/// What happened to one candidate offered to a [`SourceScan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanVerdict {
    Accepted,
    /// Empty display text or empty link.
    MissingField,
    /// Same title and link already offered earlier in this run.
    RepeatedListing,
    /// Same identity token already offered earlier in this run.
    RepeatedToken,
    NoKeyword,
    AlreadyNotified,
}

/// Filtering state of one source during one run.
///
/// Owns the two intra-run sets: listings (normalized title plus absolute link)
/// and identity tokens. They are checked independently, before the keyword
/// and cross-run filters, so a filtered candidate still marks its listing
/// and token as seen.
pub struct SourceScan<'a> {
    source: &'a SourceConfig,
    keywords: &'a KeywordFilter,
    known: &'a DedupState,
    seen_listings: HashSet<(String, String)>,
    seen_tokens: HashSet<String>,
    accepted: Vec<NormalizedEntry>,
}

impl<'a> SourceScan<'a> {
    pub fn new(
        source: &'a SourceConfig,
        keywords: &'a KeywordFilter,
        known: &'a DedupState,
    ) -> Self {
        Self {
            source,
            keywords,
            known,
            seen_listings: HashSet::new(),
            seen_tokens: HashSet::new(),
            accepted: Vec::new(),
        }
    }

    pub fn offer(&mut self, raw: &RawEntry) -> ScanVerdict {
        let title = normalize_title(&raw.text);
        let href = raw.link.trim();
        if title.is_empty() || href.is_empty() {
            return ScanVerdict::MissingField;
        }

        let link = self.source.resolve_link(href);
        if !self.seen_listings.insert((title.clone(), link.clone())) {
            return ScanVerdict::RepeatedListing;
        }

        let token = resolve_identity(self.source, href, &title);
        if !self.seen_tokens.insert(token.clone()) {
            return ScanVerdict::RepeatedToken;
        }

        if !self.keywords.matches(&title) {
            return ScanVerdict::NoKeyword;
        }

        if self.known.contains(&self.source.name, &token) {
            return ScanVerdict::AlreadyNotified;
        }

        self.accepted.push(NormalizedEntry {
            source: self.source.name.clone(),
            token,
            title,
            link,
        });
        ScanVerdict::Accepted
    }

    pub fn accepted(&self) -> &[NormalizedEntry] {
        &self.accepted
    }

    pub fn finish(self) -> Vec<NormalizedEntry> {
        self.accepted
    }
}
