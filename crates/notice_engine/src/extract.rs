use std::collections::HashMap;

use notice_core::{normalize_title, RawEntry};
use scraper::{ElementRef, Html, Selector};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid selector '{selector}': {message}")]
pub struct SelectorError {
    pub selector: String,
    pub message: String,
}

/// Compiled selection rule of a source.
#[derive(Debug, Clone)]
pub struct EntrySelector {
    selector: Selector,
}

impl EntrySelector {
    pub fn parse(rule: &str) -> Result<Self, SelectorError> {
        let selector = Selector::parse(rule).map_err(|err| SelectorError {
            selector: rule.to_string(),
            message: err.to_string(),
        })?;
        Ok(Self { selector })
    }

    /// Selected elements of one page, deduplicated by raw `href`.
    ///
    /// On a repeated `href` the later element replaces the earlier one but
    /// keeps the position where that link was first seen.
    pub fn extract(&self, html: &str) -> Vec<RawEntry> {
        let doc = Html::parse_document(html);
        let mut entries: Vec<RawEntry> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for element in doc.select(&self.selector) {
            let entry = to_raw_entry(element);
            match positions.get(&entry.link) {
                Some(&idx) => entries[idx] = entry,
                None => {
                    positions.insert(entry.link.clone(), entries.len());
                    entries.push(entry);
                }
            }
        }
        entries
    }
}

fn to_raw_entry(element: ElementRef) -> RawEntry {
    let link = element.value().attr("href").unwrap_or_default().trim();
    let text = normalize_title(&element.text().collect::<String>());
    RawEntry::new(text, link)
}
