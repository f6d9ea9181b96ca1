use crate::config::types::{ArchiveConfig, Config, CrawlerConfig, FilterConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_archive_config(&config.archive)?;
    validate_filter_config(&config.filter)?;

    if config.output.article_dir.is_empty() {
        return Err(ConfigError::Validation(
            "article_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.number_of_parallel_crawlers < 1 {
        return Err(ConfigError::Validation(format!(
            "number_of_parallel_crawlers must be >= 1, got {}",
            config.number_of_parallel_crawlers
        )));
    }

    if config.number_of_parallel_daemons < 1 {
        return Err(ConfigError::Validation(format!(
            "number_of_parallel_daemons must be >= 1, got {}",
            config.number_of_parallel_daemons
        )));
    }

    if config.site_list_path.is_empty() {
        return Err(ConfigError::Validation(
            "site_list_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_archive_config(config: &ArchiveConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;
    Url::parse(&config.index_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid index_url: {}", e)))?;

    if config.parallel_archives < 1 || config.parallel_archives > 64 {
        return Err(ConfigError::Validation(format!(
            "parallel_archives must be between 1 and 64, got {}",
            config.parallel_archives
        )));
    }

    if config.download_dir.is_empty() {
        return Err(ConfigError::Validation(
            "download_dir cannot be empty".to_string(),
        ));
    }

    if config.checkpoint_path.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    for host in &config.hosts {
        if host.is_empty() {
            return Err(ConfigError::Validation(
                "filter hosts cannot contain empty strings".to_string(),
            ));
        }
        if host.contains('/') {
            return Err(ConfigError::Validation(format!(
                "filter host '{}' must be a bare hostname, not a URL",
                host
            )));
        }
    }

    if let (Some(start), Some(end)) = (config.start_date, config.end_date) {
        if start > end {
            return Err(ConfigError::Validation(format!(
                "start_date {} is after end_date {}",
                start, end
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::OutputConfig;
    use chrono::{TimeZone, Utc};

    fn base_config() -> Config {
        Config {
            crawler: CrawlerConfig {
                number_of_parallel_crawlers: 2,
                number_of_parallel_daemons: 1,
                site_list_path: "./sites.json".to_string(),
                job_command: None,
            },
            archive: ArchiveConfig {
                base_url: "https://commoncrawl.s3.amazonaws.com/".to_string(),
                index_url: "https://data.commoncrawl.org/warc.paths".to_string(),
                date_filter: String::new(),
                download_dir: "./cc_warc".to_string(),
                checkpoint_path: "./done.list".to_string(),
                parallel_archives: 4,
                continue_after_error: true,
                delete_after_extraction: true,
            },
            filter: FilterConfig::default(),
            output: OutputConfig {
                article_dir: "./cc_articles".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_zero_crawlers_rejected() {
        let mut config = base_config();
        config.crawler.number_of_parallel_crawlers = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = base_config();
        config.archive.base_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_host_with_path_rejected() {
        let mut config = base_config();
        config.filter.hosts = vec!["example.com/news".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_inverted_date_range_rejected() {
        let mut config = base_config();
        config.filter.start_date = Some(Utc.with_ymd_and_hms(2019, 8, 2, 0, 0, 0).unwrap());
        config.filter.end_date = Some(Utc.with_ymd_and_hms(2019, 8, 1, 0, 0, 0).unwrap());
        assert!(validate(&config).is_err());
    }
}
