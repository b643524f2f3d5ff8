//! The catalog of feed sources.
//!
//! The registry is either the built-in list or a YAML file of the form:
//!
//! ```yaml
//! sources:
//!   - category: General
//!     name: JoongAng Ilbo
//!     endpoint: https://rss.joins.com/joins_news_list.xml
//! ```
//!
//! Iteration order of the returned `Vec` is the registry order every later
//! stage follows.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

use crate::error::ConfigError;
use crate::models::FeedSource;

const DEFAULT_SOURCES: &[(&str, &str, &str)] = &[
    (
        "General",
        "JoongAng Ilbo",
        "https://rss.joins.com/joins_news_list.xml",
    ),
    ("Economy", "Hankyung", "https://www.hankyung.com/feed"),
    ("General", "Dong-A Ilbo", "https://rss.donga.com/total.xml"),
];

#[derive(Debug, Deserialize)]
struct RegistryFile {
    sources: Vec<FeedSource>,
}

/// The built-in source list.
pub fn default_sources() -> Result<Vec<FeedSource>, ConfigError> {
    let sources = DEFAULT_SOURCES
        .iter()
        .map(|(category, name, endpoint)| {
            Url::parse(endpoint)
                .map(|url| FeedSource::new(category, name, url))
                .map_err(|e| ConfigError::registry(format!("{name}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    validate(&sources)?;
    Ok(sources)
}

/// Load and validate a registry file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_sources(path: &Path) -> Result<Vec<FeedSource>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let sources = parse_sources(&raw)?;
    info!(count = sources.len(), "Loaded source registry");
    Ok(sources)
}

/// Parse and validate registry YAML.
pub fn parse_sources(yaml: &str) -> Result<Vec<FeedSource>, ConfigError> {
    let file: RegistryFile = serde_yaml::from_str(yaml)?;
    validate(&file.sources)?;
    Ok(file.sources)
}

fn validate(sources: &[FeedSource]) -> Result<(), ConfigError> {
    if sources.is_empty() {
        return Err(ConfigError::registry("no sources defined"));
    }

    let mut seen = HashSet::new();
    for source in sources {
        if source.category.trim().is_empty() {
            return Err(ConfigError::registry(format!(
                "source '{}' has an empty category",
                source.source_name
            )));
        }
        if source.source_name.trim().is_empty() {
            return Err(ConfigError::registry(format!(
                "a source in category '{}' has an empty name",
                source.category
            )));
        }
        if !matches!(source.endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::registry(format!(
                "{}: endpoint must be http(s), got '{}'",
                source.label(),
                source.endpoint
            )));
        }
        if !seen.insert((source.category.as_str(), source.source_name.as_str())) {
            return Err(ConfigError::registry(format!(
                "duplicate source '{}'",
                source.label()
            )));
        }
    }
    Ok(())
}
