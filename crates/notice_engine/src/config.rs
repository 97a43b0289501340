use std::collections::HashSet;
use std::fs;
use std::path::Path;

use notice_core::SourceConfig;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to parse site configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("source #{index} has an empty name")]
    EmptyName { index: usize },
    #[error("source '{name}' is configured more than once")]
    DuplicateName { name: String },
    #[error("source '{name}' has an empty list_url_template")]
    EmptyTemplate { name: String },
}

#[derive(Debug, Deserialize)]
struct SiteFile {
    #[serde(default)]
    sites: Vec<SourceConfig>,
}

/// Reads `{"sites": [...]}` from `path`.
pub fn load_sources(path: &Path) -> Result<Vec<SourceConfig>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|err| ConfigError::Read {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    parse_sources(&content)
}

pub fn parse_sources(content: &str) -> Result<Vec<SourceConfig>, ConfigError> {
    let file: SiteFile = serde_json::from_str(content)?;
    validate(&file.sites)?;
    Ok(file.sites)
}

fn validate(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    for (index, source) in sources.iter().enumerate() {
        if source.name.trim().is_empty() {
            return Err(ConfigError::EmptyName { index });
        }
        if source.url_template.trim().is_empty() {
            return Err(ConfigError::EmptyTemplate {
                name: source.name.clone(),
            });
        }
        if !names.insert(source.name.as_str()) {
            return Err(ConfigError::DuplicateName {
                name: source.name.clone(),
            });
        }
    }
    Ok(())
}
