use crate::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// The site list file: an array of site objects under `base_urls`
#[derive(Debug, Clone, Deserialize)]
pub struct SiteList {
    pub base_urls: Vec<SiteEntry>,
}

/// One site to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Base URL of the site
    pub url: String,

    /// Re-crawl interval in seconds; absent means one-shot
    #[serde(default)]
    pub daemonize: Option<u64>,
}

impl SiteEntry {
    pub fn is_daemonized(&self) -> bool {
        self.daemonize.is_some()
    }
}

/// Loads the JSON site list from the given path
pub fn load_site_list(path: &Path) -> Result<SiteList, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let sites: SiteList = serde_json::from_str(&content)?;

    for entry in &sites.base_urls {
        if entry.url.is_empty() {
            return Err(ConfigError::Validation(
                "site list entries must have a non-empty url".to_string(),
            ));
        }
        if let Some(interval) = entry.daemonize {
            if interval == 0 {
                return Err(ConfigError::Validation(format!(
                    "site '{}' has daemonize = 0; omit the key for one-shot crawls",
                    entry.url
                )));
            }
        }
    }

    Ok(sites)
}
