//! Remote archive index

use crate::{Result, WarcflowError};
use async_trait::async_trait;

/// Lists the archive paths published by the archive host
#[async_trait]
pub trait ArchiveIndex: Send + Sync {
    /// Returns all archive paths whose name matches `date_filter`
    /// (a substring, typically a year or year-month prefix).
    async fn list(&self, date_filter: &str) -> Result<Vec<String>>;
}

/// Index backed by a plain-text listing, one archive path per line
pub struct HttpArchiveIndex {
    client: reqwest::Client,
    index_url: String,
}

impl HttpArchiveIndex {
    pub fn new(client: reqwest::Client, index_url: impl Into<String>) -> Self {
        Self {
            client,
            index_url: index_url.into(),
        }
    }
}

#[async_trait]
impl ArchiveIndex for HttpArchiveIndex {
    async fn list(&self, date_filter: &str) -> Result<Vec<String>> {
        tracing::debug!("fetching archive index from {}", self.index_url);

        let response = self
            .client
            .get(&self.index_url)
            .send()
            .await
            .map_err(|e| WarcflowError::Http {
                url: self.index_url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(WarcflowError::Index(format!(
                "index request to {} returned {}",
                self.index_url,
                response.status()
            )));
        }

        let body = response.text().await.map_err(|e| WarcflowError::Http {
            url: self.index_url.clone(),
            source: e,
        })?;

        let paths: Vec<String> = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && line.contains(date_filter))
            .map(str::to_string)
            .collect();

        tracing::info!(
            "archive index lists {} archives matching \"{}\"",
            paths.len(),
            date_filter
        );
        Ok(paths)
    }
}
