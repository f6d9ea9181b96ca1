//! Configuration loading and validation
//!
//! The main configuration is TOML; the site list is a separate JSON file
//! (an array of site objects under `base_urls`, recurring sites carry a
//! `daemonize` interval in seconds).

mod parser;
mod sites;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use sites::{load_site_list, SiteEntry, SiteList};
pub use types::{ArchiveConfig, Config, CrawlerConfig, FilterConfig, OutputConfig};
pub use validation::validate;
