use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use warcflow::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Archive workers: {}", config.archive.parallel_archives);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The checkpoint log only records which archives completed, not under which
/// filter criteria. The hash is logged at startup so a resumed run with a
/// changed configuration can be spotted.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_CONFIG: &str = r#"
[crawler]
number-of-parallel-crawlers = 3
number-of-parallel-daemons = 2
site-list-path = "./sites.json"

[archive]
base-url = "https://commoncrawl.s3.amazonaws.com/"
index-url = "https://data.commoncrawl.org/crawl-data/CC-NEWS/warc.paths"
date-filter = "20190801"
download-dir = "./cc_warc"
checkpoint-path = "./fullyextractedwarcs.list"
parallel-archives = 4

[filter]
hosts = ["example.com"]
start-date = "2019-08-01T00:00:00Z"
end-date = "2019-08-02T00:00:00Z"
strict-date = true

[output]
article-dir = "./cc_articles"
"#;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.number_of_parallel_crawlers, 3);
        assert_eq!(config.archive.parallel_archives, 4);
        assert_eq!(config.filter.hosts, vec!["example.com"]);
        assert!(config.filter.strict_date);
        assert!(config.archive.continue_after_error);
        assert!(config.archive.delete_after_extraction);
    }

    #[test]
    fn test_filter_section_is_optional() {
        let without_filter = VALID_CONFIG
            .lines()
            .take_while(|line| !line.starts_with("[filter]"))
            .chain(["[output]", r#"article-dir = "./cc_articles""#])
            .collect::<Vec<_>>()
            .join("\n");

        let file = create_temp_config(&without_filter);
        let config = load_config(file.path()).unwrap();

        assert!(config.filter.hosts.is_empty());
        assert!(config.filter.start_date.is_none());
        assert!(config.filter.strict_date);
        assert!(!config.filter.substring_hosts);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
