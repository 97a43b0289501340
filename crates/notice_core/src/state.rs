use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::NormalizedEntry;

/// Source name to the identity tokens already notified for it.
///
/// Append-only: tokens are recorded after a confirmed dispatch and never removed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupState {
    sources: BTreeMap<String, BTreeSet<String>>,
}

impl DedupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, source: &str, token: &str) -> bool {
        self.sources
            .get(source)
            .is_some_and(|tokens| tokens.contains(token))
    }

    /// Records a token; returns `false` when it was already present.
    pub fn record(&mut self, source: &str, token: &str) -> bool {
        self.sources
            .entry(source.to_string())
            .or_default()
            .insert(token.to_string())
    }

    pub fn record_entries<'a>(&mut self, entries: impl IntoIterator<Item = &'a NormalizedEntry>) {
        for entry in entries {
            self.record(&entry.source, &entry.token);
        }
    }

    pub fn tokens(&self, source: &str) -> Vec<&str> {
        self.sources
            .get(source)
            .map(|tokens| tokens.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn token_count(&self) -> usize {
        self.sources.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.token_count() == 0
    }
}

impl<S, I> FromIterator<(S, I)> for DedupState
where
    S: Into<String>,
    I: IntoIterator,
    I::Item: Into<String>,
{
    fn from_iter<It: IntoIterator<Item = (S, I)>>(iter: It) -> Self {
        let mut state = Self::default();
        for (source, tokens) in iter {
            let set = state.sources.entry(source.into()).or_default();
            set.extend(tokens.into_iter().map(Into::into));
        }
        state
    }
}
