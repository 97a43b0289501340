/// Anchor-like element as selected from one page: display text plus raw `href`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub text: String,
    pub link: String,
}

impl RawEntry {
    pub fn new(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: link.into(),
        }
    }
}

/// An entry that passed every filter of a source scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEntry {
    pub source: String,
    pub token: String,
    pub title: String,
    pub link: String,
}
