use crate::{DedupState, NormalizedEntry};

/// Wording of the digest message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestStyle {
    pub subject: String,
    pub heading: String,
}

impl Default for DigestStyle {
    fn default() -> Self {
        Self {
            subject: "[공고 알림] 새로운 공고 요약".to_string(),
            heading: "새로운 공고가 등록되었습니다.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestGroup {
    pub source: String,
    pub entries: Vec<NormalizedEntry>,
}

/// All new entries of one run, grouped by source in configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Digest {
    groups: Vec<DigestGroup>,
}

impl Digest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source's entries; empty contributions are dropped and a
    /// repeated source name extends its existing group.
    pub fn push(&mut self, source: impl Into<String>, entries: Vec<NormalizedEntry>) {
        if entries.is_empty() {
            return;
        }
        let source = source.into();
        match self.groups.iter_mut().find(|group| group.source == source) {
            Some(group) => group.entries.extend(entries),
            None => self.groups.push(DigestGroup { source, entries }),
        }
    }

    pub fn groups(&self) -> &[DigestGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|group| group.entries.len()).sum()
    }

    pub fn counts(&self) -> Vec<(String, usize)> {
        self.groups
            .iter()
            .map(|group| (group.source.clone(), group.entries.len()))
            .collect()
    }

    /// Plain-text body: heading, then one numbered block per source.
    pub fn render(&self, style: &DigestStyle) -> String {
        let mut lines = Vec::new();
        for group in &self.groups {
            lines.push(group.source.clone());
            for (idx, entry) in group.entries.iter().enumerate() {
                lines.push(format!("{}) {}\n {}", idx + 1, entry.title, entry.link));
            }
            lines.push(String::new());
        }
        format!("{}\n\n{}", style.heading, lines.join("\n"))
    }

    /// Copies every entry's token into `state`.
    pub fn merge_into(&self, state: &mut DedupState) {
        for group in &self.groups {
            state.record_entries(&group.entries);
        }
    }
}
