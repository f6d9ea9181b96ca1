use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Main configuration structure for warcflow
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    pub output: OutputConfig,
}

/// Orchestrator behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of workers draining the one-shot site job queue
    pub number_of_parallel_crawlers: usize,

    /// Maximum number of daemonized site jobs running at once
    pub number_of_parallel_daemons: usize,

    /// Path to the JSON site list
    pub site_list_path: String,

    /// Command invoked once per site job (receives config path, site list
    /// path, site index, resume flag and daemonize flag as arguments)
    #[serde(default)]
    pub job_command: Option<String>,
}

/// Archive download and extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArchiveConfig {
    /// Base URL prepended to archive names from the index listing
    pub base_url: String,

    /// URL of the plain-text archive index listing (one name per line)
    pub index_url: String,

    /// Substring an archive name must contain to be a candidate,
    /// e.g. "2019/08" or "20190801". Empty matches everything.
    #[serde(default)]
    pub date_filter: String,

    /// Local directory archives are downloaded to
    pub download_dir: String,

    /// Path of the fully-extracted-archives checkpoint log
    pub checkpoint_path: String,

    /// Number of archives downloaded and extracted in parallel
    pub parallel_archives: usize,

    /// Keep iterating an archive when a single record fails
    #[serde(default = "default_true")]
    pub continue_after_error: bool,

    /// Remove the local archive file once fully extracted
    #[serde(default = "default_true")]
    pub delete_after_extraction: bool,
}

/// Record filter criteria, read-only during extraction
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FilterConfig {
    /// Hostnames to keep; empty accepts any host
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Earliest accepted publish date (inclusive)
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,

    /// Latest accepted publish date (inclusive)
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,

    /// Discard records whose date cannot be determined
    #[serde(default = "default_true")]
    pub strict_date: bool,

    /// Legacy behavior: match a configured host anywhere in the record URL
    /// instead of comparing hostnames for equality. Known to over-match
    /// (a query parameter containing the host would pass); off by default.
    #[serde(default)]
    pub substring_hosts: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory extracted articles are written to, one JSON file per
    /// article under a per-host subdirectory
    pub article_dir: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            start_date: None,
            end_date: None,
            strict_date: true,
            substring_hosts: false,
        }
    }
}

fn default_true() -> bool {
    true
}
