//! Record filtering against host and date criteria
//!
//! The filter is a pure predicate except for one lazy extractor call: the
//! publish date is only obtainable from the extraction collaborator, so when
//! a date bound is configured the article is extracted during filtering and
//! handed back to the caller to avoid extracting twice.

use crate::archive::RawRecord;
use crate::config::FilterConfig;
use crate::pipeline::{Article, ArticleExtractor};
use crate::Result;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use url::Url;

/// Filter criteria, configured once per run
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    /// Hostnames to keep; empty accepts any host
    pub hosts: HashSet<String>,
    /// Earliest accepted date (inclusive)
    pub start_date: Option<DateTime<Utc>>,
    /// Latest accepted date (inclusive)
    pub end_date: Option<DateTime<Utc>>,
    /// Reject records whose date cannot be determined
    pub strict_date: bool,
    /// Legacy contains-matching of hosts against the whole record URL
    pub substring_hosts: bool,
}

impl FilterCriteria {
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            hosts: config.hosts.iter().cloned().collect(),
            start_date: config.start_date,
            end_date: config.end_date,
            strict_date: config.strict_date,
            substring_hosts: config.substring_hosts,
        }
    }

    fn has_date_bounds(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

/// Outcome of filtering one record.
///
/// When the date check forced an extraction, the article rides along so the
/// pipeline does not extract the same record twice.
pub struct FilterDecision {
    pub accepted: bool,
    pub article: Option<Article>,
}

impl FilterDecision {
    fn reject(article: Option<Article>) -> Self {
        Self {
            accepted: false,
            article,
        }
    }

    fn accept(article: Option<Article>) -> Self {
        Self {
            accepted: true,
            article,
        }
    }
}

/// Applies [`FilterCriteria`] to archive records
pub struct RecordFilter {
    criteria: FilterCriteria,
}

impl RecordFilter {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self { criteria }
    }

    /// Evaluates a record against the criteria.
    ///
    /// Host check first (no extraction needed), then the date check, which
    /// lazily extracts the article only when a date bound is configured.
    /// An extractor failure propagates as an error; the pipeline decides
    /// whether to abort or count it.
    pub fn evaluate(
        &self,
        record: &RawRecord,
        extractor: &dyn ArticleExtractor,
    ) -> Result<FilterDecision> {
        if !self.host_accepted(record) {
            return Ok(FilterDecision::reject(None));
        }

        if !self.criteria.has_date_bounds() {
            return Ok(FilterDecision::accept(None));
        }

        let article = extractor.extract(record)?;
        let date = article.publish_date.or(record.date);

        let Some(date) = date else {
            return Ok(if self.criteria.strict_date {
                FilterDecision::reject(Some(article))
            } else {
                FilterDecision::accept(Some(article))
            });
        };

        if let Some(start) = self.criteria.start_date {
            if date < start {
                return Ok(FilterDecision::reject(Some(article)));
            }
        }
        if let Some(end) = self.criteria.end_date {
            if date > end {
                return Ok(FilterDecision::reject(Some(article)));
            }
        }

        Ok(FilterDecision::accept(Some(article)))
    }

    fn host_accepted(&self, record: &RawRecord) -> bool {
        if self.criteria.hosts.is_empty() {
            return true;
        }

        let Some(uri) = record.target_uri.as_deref() else {
            return false;
        };

        if self.criteria.substring_hosts {
            // Legacy behavior: a configured host anywhere in the URL passes.
            // Over-matches URLs that merely mention the host.
            return self.criteria.hosts.iter().any(|host| uri.contains(host));
        }

        match Url::parse(uri).ok().and_then(|u| u.host_str().map(str::to_string)) {
            Some(host) => self.criteria.hosts.contains(&host),
            None => false,
        }
    }
}
