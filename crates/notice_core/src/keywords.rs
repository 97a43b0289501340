/// Case-insensitive, OR-combined substring filter over entry titles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeywordFilter {
    keywords: Vec<String>,
    lowered: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::default();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim();
            if keyword.is_empty() {
                continue;
            }
            let lowered = keyword.to_lowercase();
            if filter.lowered.contains(&lowered) {
                continue;
            }
            filter.keywords.push(keyword.to_string());
            filter.lowered.push(lowered);
        }
        filter
    }

    /// Parses a comma-separated list such as `바이오,헬스,임상`.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// True when any keyword occurs in `title`. An empty filter matches nothing.
    pub fn matches(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.lowered.iter().any(|keyword| title.contains(keyword.as_str()))
    }
}
