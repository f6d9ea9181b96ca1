//! Warcflow: a resumable WARC extraction and crawl-job orchestrator
//!
//! This crate downloads web archive (WARC) files, streams their records
//! through filter criteria to an article-extraction collaborator, and runs
//! one-shot and recurring per-site crawl jobs on bounded worker pools with
//! cooperative shutdown. Fully processed archives are checkpointed so a
//! restarted run never reprocesses them.

pub mod archive;
pub mod checkpoint;
pub mod config;
pub mod filter;
pub mod orchestrator;
pub mod pipeline;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for warcflow operations
#[derive(Debug, Error)]
pub enum WarcflowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    #[error("Archive index error: {0}")]
    Index(String),

    #[error("Failed to read archive {path}: {message}")]
    ArchiveRead { path: PathBuf, message: String },

    #[error("Record extraction failed: {0}")]
    Extraction(String),

    #[error("Article sink error: {0}")]
    Sink(String),

    #[error("Checkpoint write failed for {path}: {source}")]
    Checkpoint {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Job {job_id} failed: {message}")]
    Job { job_id: usize, message: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse site list: {0}")]
    SiteList(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for warcflow operations
pub type Result<T> = std::result::Result<T, WarcflowError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use checkpoint::CheckpointLog;
pub use config::Config;
pub use filter::{FilterCriteria, RecordFilter};
pub use orchestrator::ShutdownCoordinator;
pub use pipeline::{ExtractionPipeline, PipelineStats};
