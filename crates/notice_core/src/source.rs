use serde::{Deserialize, Serialize};
use url::Url;

use crate::identity::DEFAULT_ID_PARAMS;

/// Hard cap on pages scanned per source in one run.
pub const MAX_PAGES: u32 = 10;

const PAGE_PLACEHOLDER: &str = "{page}";

/// How a source's markup has to be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Plain HTTP GET.
    #[default]
    Static,
    /// Headless browser, for listings built client-side.
    Browser,
}

/// How a notice is recognised across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStrategy {
    /// Identifier query parameter of the link, or the link itself.
    #[default]
    Link,
    /// Whitespace-normalised title, for sites whose links rotate per request.
    Title,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(rename = "list_url_template")]
    pub url_template: String,
    #[serde(rename = "link_prefix", default)]
    pub link_prefix: String,
    #[serde(rename = "item_selector", default = "default_selector")]
    pub selector: String,
    #[serde(rename = "pages_to_check", default = "default_pages")]
    pub pages: u32,
    #[serde(default)]
    pub render_mode: RenderMode,
    #[serde(default)]
    pub identity: IdentityStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_params: Option<Vec<String>>,
}

fn default_selector() -> String {
    "a[title]".to_string()
}

fn default_pages() -> u32 {
    1
}

impl SourceConfig {
    /// Minimal static, link-identified source; remaining fields take their defaults.
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            link_prefix: String::new(),
            selector: default_selector(),
            pages: default_pages(),
            render_mode: RenderMode::default(),
            identity: IdentityStrategy::default(),
            id_params: None,
        }
    }

    /// Number of pages actually scanned: the configured count, capped at [`MAX_PAGES`].
    pub fn page_count(&self) -> u32 {
        self.pages.min(MAX_PAGES)
    }

    pub fn page_url(&self, page: u32) -> String {
        self.url_template.replace(PAGE_PLACEHOLDER, &page.to_string())
    }

    /// Identifier parameter names checked in order for link-derived identity.
    pub fn id_params(&self) -> Vec<&str> {
        match &self.id_params {
            Some(params) => params.iter().map(String::as_str).collect(),
            None => DEFAULT_ID_PARAMS.to_vec(),
        }
    }

    pub fn resolve_link(&self, href: &str) -> String {
        resolve_link(&self.link_prefix, href)
    }
}

/// Turns a possibly relative `href` into an absolute link using `prefix`.
///
/// Links already starting with `http` are returned untouched. When the prefix
/// is empty or not a valid base, the trimmed `href` is returned as is.
pub fn resolve_link(prefix: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http") {
        return href.to_string();
    }
    Url::parse(prefix.trim())
        .and_then(|base| base.join(href))
        .map(String::from)
        .unwrap_or_else(|_| href.to_string())
}
