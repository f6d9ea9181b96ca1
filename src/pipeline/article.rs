//! The extraction collaborator boundary
//!
//! Warcflow never inspects record payloads itself. An [`ArticleExtractor`]
//! turns a raw record into an [`Article`]; an [`ArticleSink`] receives every
//! article that passed the filter. Real extraction heuristics (date, title,
//! text detection) live behind the trait, outside this crate.

use crate::archive::RawRecord;
use crate::{Result, WarcflowError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use url::Url;

use super::PipelineStats;

/// An extracted article, the unit handed to sinks
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    /// Host the record was captured from
    pub source_host: String,

    /// Filesystem-safe identifier, usable as a file name
    pub filename: String,

    /// Original record URL
    pub url: String,

    /// Publish date, when the extractor could determine one
    pub publish_date: Option<DateTime<Utc>>,

    pub title: Option<String>,

    pub text: Option<String>,
}

/// Turns raw archive records into articles
pub trait ArticleExtractor: Send + Sync {
    /// Extracts an article from one record. Called at most once per accepted
    /// record; a failure is treated as a per-record error by the pipeline.
    fn extract(&self, record: &RawRecord) -> Result<Article>;
}

/// Receives extracted articles and archive completion notices
pub trait ArticleSink: Send + Sync {
    fn on_article(&self, article: &Article) -> Result<()>;

    /// Invoked once per archive after its last record was processed
    fn on_archive_completed(&self, _archive_url: &str, _stats: &PipelineStats) {}
}

/// Minimal extractor building articles from record headers only.
///
/// Uses the target URL for host and filename and the declared record
/// timestamp as the publish date. No payload parsing; a real extractor
/// replaces this when titles and text are wanted.
pub struct RecordHeaderExtractor;

impl ArticleExtractor for RecordHeaderExtractor {
    fn extract(&self, record: &RawRecord) -> Result<Article> {
        let uri = record
            .target_uri
            .as_deref()
            .ok_or_else(|| WarcflowError::Extraction("record has no target URI".to_string()))?;
        let url = Url::parse(uri)?;
        let host = url
            .host_str()
            .ok_or_else(|| WarcflowError::Extraction(format!("no host in record URI {}", uri)))?
            .to_string();

        Ok(Article {
            source_host: host,
            filename: sanitize_filename(uri),
            url: uri.to_string(),
            publish_date: record.date,
            title: None,
            text: None,
        })
    }
}

/// Sink writing one pretty-printed JSON file per article under
/// `article_dir/<source_host>/<filename>.json`
pub struct JsonDirSink {
    article_dir: PathBuf,
}

impl JsonDirSink {
    pub fn new(article_dir: &Path) -> Self {
        Self {
            article_dir: article_dir.to_path_buf(),
        }
    }

    fn article_path(&self, article: &Article) -> PathBuf {
        self.article_dir
            .join(&article.source_host)
            .join(format!("{}.json", article.filename))
    }
}

impl ArticleSink for JsonDirSink {
    fn on_article(&self, article: &Article) -> Result<()> {
        let path = self.article_path(article);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(article)?;
        std::fs::write(&path, json)?;
        Ok(())
    }

    fn on_archive_completed(&self, archive_url: &str, stats: &PipelineStats) {
        tracing::info!(
            "archive completed: {} (pass = {}, discard = {}, error = {}, total = {})",
            archive_url,
            stats.passed,
            stats.discarded,
            stats.errored,
            stats.total
        );
    }
}

/// Replaces everything outside `[A-Za-z0-9._-]` with underscores and bounds
/// the length so the result is safe as a file name on common filesystems.
fn sanitize_filename(input: &str) -> String {
    let mut name: String = input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    name.truncate(200);
    name
}
