//! The archive extraction pipeline
//!
//! One [`ExtractionPipeline`] run iterates every record of a local archive,
//! applies the configured filter, forwards passing articles to the sink, and
//! on normal completion deletes the local file (if configured), appends the
//! archive URL to the checkpoint log and fires the completion callback.
//! Per-record failures are isolated when `continue_after_error` is set;
//! otherwise the first failure aborts the run and nothing is checkpointed.
//! Source-level read errors always abort: a corrupt or truncated archive
//! cannot yield further records, so the run ends unfinished and the archive
//! stays out of the checkpoint log for the next run to retry.

mod article;
mod stats;

pub use article::{Article, ArticleExtractor, ArticleSink, JsonDirSink, RecordHeaderExtractor};
pub use stats::PipelineStats;

use crate::archive::{ArchiveOpener, RawRecord};
use crate::checkpoint::CheckpointLog;
use crate::filter::RecordFilter;
use crate::{Result, WarcflowError};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Per-run pipeline flags
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Count per-record failures and keep iterating instead of aborting
    pub continue_after_error: bool,

    /// Remove the local archive file after full extraction
    pub delete_after_extraction: bool,
}

/// Streams records from one local archive through filter, extractor and sink
pub struct ExtractionPipeline {
    opener: Box<dyn ArchiveOpener>,
    extractor: Arc<dyn ArticleExtractor>,
    sink: Arc<dyn ArticleSink>,
    filter: RecordFilter,
    checkpoint: Arc<CheckpointLog>,
    settings: PipelineSettings,
}

impl ExtractionPipeline {
    pub fn new(
        opener: Box<dyn ArchiveOpener>,
        extractor: Arc<dyn ArticleExtractor>,
        sink: Arc<dyn ArticleSink>,
        filter: RecordFilter,
        checkpoint: Arc<CheckpointLog>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            opener,
            extractor,
            sink,
            filter,
            checkpoint,
            settings,
        }
    }

    /// Processes one downloaded archive to completion.
    ///
    /// Blocking (disk-bound); run it on a blocking task from async contexts.
    pub fn run(&self, archive_url: &str, local_path: &Path) -> Result<PipelineStats> {
        let start = Instant::now();
        let mut stats = PipelineStats::default();
        let mut source = self.opener.open(local_path)?;

        while let Some(next) = source.next_record() {
            let record = match next {
                Ok(record) => record,
                Err(e) => {
                    // The stream cannot advance past a read error; retrying
                    // would yield the same error forever
                    tracing::error!("archive read failed, aborting this archive: {}", e);
                    return Err(e);
                }
            };

            if record.record_type != "response" {
                continue;
            }
            stats.total += 1;

            match self.process_record(&record) {
                Ok(true) => stats.passed += 1,
                Ok(false) => stats.discarded += 1,
                Err(e) => self.record_failure(&mut stats, e)?,
            }

            if stats.total % 100 == 0 {
                tracing::info!(
                    "pass = {}, discard = {}, error = {}, total = {}",
                    stats.passed,
                    stats.discarded,
                    stats.errored,
                    stats.total
                );
            }
        }

        let elapsed = start.elapsed();
        match stats.secs_per_record(elapsed) {
            Some(secs) => tracing::info!(
                "extracted {} records from {} in {:.1?} ({:.4} s/record)",
                stats.total,
                archive_url,
                elapsed,
                secs
            ),
            None => tracing::info!("archive {} contained no response records", archive_url),
        }

        if self.settings.delete_after_extraction {
            std::fs::remove_file(local_path)?;
        }

        self.checkpoint.append(archive_url)?;
        self.sink.on_archive_completed(archive_url, &stats);

        Ok(stats)
    }

    /// Filter, extract (at most once) and deliver a single response record.
    /// Returns whether the record passed.
    fn process_record(&self, record: &RawRecord) -> Result<bool> {
        let decision = self.filter.evaluate(record, self.extractor.as_ref())?;

        if !decision.accepted {
            tracing::debug!(
                "record discarded ({})",
                record.target_uri.as_deref().unwrap_or("<no target uri>")
            );
            return Ok(false);
        }

        // The filter only extracts when a date bound forces it
        let article = match decision.article {
            Some(article) => article,
            None => self.extractor.extract(record)?,
        };

        tracing::debug!(
            "article passed filter ({}; {:?}; {:?})",
            article.source_host,
            article.publish_date,
            article.title
        );

        self.sink.on_article(&article)?;
        Ok(true)
    }

    fn record_failure(&self, stats: &mut PipelineStats, error: WarcflowError) -> Result<()> {
        if !self.settings.continue_after_error {
            return Err(error);
        }
        stats.errored += 1;
        tracing::error!("record error (continuing): {}", error);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::RecordSource;
    use crate::filter::FilterCriteria;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// In-memory record source standing in for a parsed archive
    struct VecSource {
        records: std::vec::IntoIter<Result<RawRecord>>,
    }

    impl RecordSource for VecSource {
        fn next_record(&mut self) -> Option<Result<RawRecord>> {
            self.records.next()
        }
    }

    struct VecOpener {
        records: Mutex<Option<Vec<Result<RawRecord>>>>,
    }

    impl VecOpener {
        fn new(records: Vec<Result<RawRecord>>) -> Box<Self> {
            Box::new(Self {
                records: Mutex::new(Some(records)),
            })
        }
    }

    impl ArchiveOpener for VecOpener {
        fn open(&self, _path: &Path) -> Result<Box<dyn RecordSource>> {
            let records = self.records.lock().unwrap().take().unwrap_or_default();
            Ok(Box::new(VecSource {
                records: records.into_iter(),
            }))
        }
    }

    /// Sink collecting article URLs and the completion payload
    #[derive(Default)]
    struct CollectingSink {
        urls: Mutex<Vec<String>>,
        completed: Mutex<Option<(String, PipelineStats)>>,
    }

    impl ArticleSink for CollectingSink {
        fn on_article(&self, article: &Article) -> Result<()> {
            self.urls.lock().unwrap().push(article.url.clone());
            Ok(())
        }

        fn on_archive_completed(&self, archive_url: &str, stats: &PipelineStats) {
            *self.completed.lock().unwrap() = Some((archive_url.to_string(), *stats));
        }
    }

    /// Extractor failing for URLs containing a marker
    struct MarkerFailExtractor;

    impl ArticleExtractor for MarkerFailExtractor {
        fn extract(&self, record: &RawRecord) -> Result<Article> {
            let uri = record.target_uri.clone().unwrap_or_default();
            if uri.contains("broken") {
                return Err(WarcflowError::Extraction(format!("cannot parse {}", uri)));
            }
            RecordHeaderExtractor.extract(record)
        }
    }

    fn response(uri: &str) -> Result<RawRecord> {
        Ok(RawRecord {
            record_type: "response".to_string(),
            target_uri: Some(uri.to_string()),
            date: None,
            body: Vec::new(),
        })
    }

    fn request(uri: &str) -> Result<RawRecord> {
        Ok(RawRecord {
            record_type: "request".to_string(),
            target_uri: Some(uri.to_string()),
            date: None,
            body: Vec::new(),
        })
    }

    fn open_filter() -> RecordFilter {
        RecordFilter::new(FilterCriteria {
            hosts: HashSet::new(),
            start_date: None,
            end_date: None,
            strict_date: true,
            substring_hosts: false,
        })
    }

    fn pipeline_with(
        records: Vec<Result<RawRecord>>,
        sink: Arc<CollectingSink>,
        checkpoint: Arc<CheckpointLog>,
        continue_after_error: bool,
    ) -> ExtractionPipeline {
        ExtractionPipeline::new(
            VecOpener::new(records),
            Arc::new(MarkerFailExtractor),
            sink,
            open_filter(),
            checkpoint,
            PipelineSettings {
                continue_after_error,
                delete_after_extraction: false,
            },
        )
    }

    fn temp_checkpoint(dir: &TempDir) -> Arc<CheckpointLog> {
        Arc::new(CheckpointLog::open(&dir.path().join("done.list")).unwrap())
    }

    #[test]
    fn test_counts_and_completion_callback() {
        let dir = TempDir::new().unwrap();
        let checkpoint = temp_checkpoint(&dir);
        let sink = Arc::new(CollectingSink::default());
        let pipeline = pipeline_with(
            vec![
                response("https://example.com/a"),
                request("https://example.com/a"),
                response("https://example.com/b"),
            ],
            sink.clone(),
            checkpoint.clone(),
            true,
        );

        let stats = pipeline
            .run("https://archive.example/a.warc.gz", Path::new("unused"))
            .unwrap();

        // Non-response records are skipped entirely
        assert_eq!(stats.total, 2);
        assert_eq!(stats.passed, 2);
        assert_eq!(stats.errored, 0);
        assert_eq!(sink.urls.lock().unwrap().len(), 2);

        let completed = sink.completed.lock().unwrap().clone().unwrap();
        assert_eq!(completed.0, "https://archive.example/a.warc.gz");
        assert_eq!(completed.1, stats);
        assert!(checkpoint.contains("https://archive.example/a.warc.gz"));
    }

    #[test]
    fn test_continue_after_error_counts_and_proceeds() {
        let dir = TempDir::new().unwrap();
        let checkpoint = temp_checkpoint(&dir);
        let sink = Arc::new(CollectingSink::default());
        let pipeline = pipeline_with(
            vec![
                response("https://example.com/ok1"),
                response("https://example.com/broken"),
                response("https://example.com/ok2"),
            ],
            sink.clone(),
            checkpoint.clone(),
            true,
        );

        let stats = pipeline
            .run("https://archive.example/b.warc.gz", Path::new("unused"))
            .unwrap();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.passed, 2);
        assert_eq!(stats.errored, 1);
        assert!(checkpoint.contains("https://archive.example/b.warc.gz"));
    }

    #[test]
    fn test_abort_on_error_leaves_no_checkpoint() {
        let dir = TempDir::new().unwrap();
        let checkpoint = temp_checkpoint(&dir);
        let sink = Arc::new(CollectingSink::default());
        let pipeline = pipeline_with(
            vec![
                response("https://example.com/ok1"),
                response("https://example.com/broken"),
                response("https://example.com/never-reached"),
            ],
            sink.clone(),
            checkpoint.clone(),
            false,
        );

        let result = pipeline.run("https://archive.example/c.warc.gz", Path::new("unused"));

        assert!(result.is_err());
        assert!(!checkpoint.contains("https://archive.example/c.warc.gz"));
        // The record before the failure was still delivered
        assert_eq!(sink.urls.lock().unwrap().len(), 1);
        assert!(sink.completed.lock().unwrap().is_none());
    }

    #[test]
    fn test_empty_archive_checkpointed_without_throughput() {
        let dir = TempDir::new().unwrap();
        let checkpoint = temp_checkpoint(&dir);
        let sink = Arc::new(CollectingSink::default());
        let pipeline = pipeline_with(vec![], sink, checkpoint.clone(), true);

        let stats = pipeline
            .run("https://archive.example/empty.warc.gz", Path::new("unused"))
            .unwrap();

        assert_eq!(stats.total, 0);
        assert_eq!(stats.secs_per_record(std::time::Duration::from_secs(1)), None);
        assert!(checkpoint.contains("https://archive.example/empty.warc.gz"));
    }

    #[test]
    fn test_truncated_archive_aborts_despite_continue_after_error() {
        use crate::archive::WarcGzOpener;
        use std::io::Write;

        let dir = TempDir::new().unwrap();
        let checkpoint = temp_checkpoint(&dir);

        let record = "WARC/1.0\r\n\
            WARC-Type: response\r\n\
            WARC-Record-ID: <urn:uuid:33333333-3333-3333-3333-333333333333>\r\n\
            WARC-Target-URI: https://example.com/a\r\n\
            WARC-Date: 2019-08-02T10:00:00Z\r\n\
            Content-Length: 4\r\n\
            \r\n\
            body\r\n\
            \r\n";
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(record.as_bytes()).unwrap();
        let gz = encoder.finish().unwrap();

        // A download interrupted mid-stream leaves exactly this on disk
        let local = dir.path().join("truncated.warc.gz");
        std::fs::write(&local, &gz[..gz.len() / 2]).unwrap();

        let pipeline = ExtractionPipeline::new(
            Box::new(WarcGzOpener::new()),
            Arc::new(MarkerFailExtractor),
            Arc::new(CollectingSink::default()),
            open_filter(),
            checkpoint.clone(),
            PipelineSettings {
                continue_after_error: true,
                delete_after_extraction: false,
            },
        );

        // The read error aborts the run even though per-record errors are
        // tolerated, so the archive is retried next run instead of spinning
        let result = pipeline.run("https://archive.example/truncated.warc.gz", &local);
        assert!(result.is_err());
        assert!(!checkpoint.contains("https://archive.example/truncated.warc.gz"));
    }

    #[test]
    fn test_delete_after_extraction_removes_local_file() {
        let dir = TempDir::new().unwrap();
        let checkpoint = temp_checkpoint(&dir);
        let local = dir.path().join("archive.warc.gz");
        std::fs::write(&local, b"payload").unwrap();

        let pipeline = ExtractionPipeline::new(
            VecOpener::new(vec![response("https://example.com/a")]),
            Arc::new(MarkerFailExtractor),
            Arc::new(CollectingSink::default()),
            open_filter(),
            checkpoint,
            PipelineSettings {
                continue_after_error: true,
                delete_after_extraction: true,
            },
        );

        pipeline
            .run("https://archive.example/d.warc.gz", &local)
            .unwrap();
        assert!(!local.exists());
    }
}
