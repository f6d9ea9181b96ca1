//! Archive discovery, download and crawl loop
//!
//! An archive crawl is: list archives from the remote index, drop the ones
//! the checkpoint log already records as fully extracted, then drain the
//! remainder on a bounded worker pool. Each worker downloads its archive and
//! runs the extraction pipeline over it on a blocking task. A failed archive
//! is logged and left out of the checkpoint log so the next run retries it.

mod downloader;
mod index;
mod reader;

pub use downloader::ArchiveDownloader;
pub use index::{ArchiveIndex, HttpArchiveIndex};
pub use reader::{ArchiveOpener, RawRecord, RecordSource, WarcGzOpener};

use crate::checkpoint::CheckpointLog;
use crate::orchestrator::{run_worker_pool, ShutdownCoordinator, WorkQueue};
use crate::pipeline::ExtractionPipeline;
use crate::{Result, WarcflowError};
use std::path::PathBuf;
use std::sync::Arc;

/// One archive awaiting download and extraction
#[derive(Debug, Clone)]
pub struct ArchiveReference {
    pub remote_url: String,
    pub local_path: PathBuf,
}

/// Drives a full archive crawl for one date filter
pub struct ArchiveCrawler {
    index: Arc<dyn ArchiveIndex>,
    downloader: Arc<ArchiveDownloader>,
    pipeline: Arc<ExtractionPipeline>,
    checkpoint: Arc<CheckpointLog>,
    shutdown: ShutdownCoordinator,
    base_url: String,
    date_filter: String,
    parallel_archives: usize,
}

impl ArchiveCrawler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        index: Arc<dyn ArchiveIndex>,
        downloader: Arc<ArchiveDownloader>,
        pipeline: Arc<ExtractionPipeline>,
        checkpoint: Arc<CheckpointLog>,
        shutdown: ShutdownCoordinator,
        base_url: impl Into<String>,
        date_filter: impl Into<String>,
        parallel_archives: usize,
    ) -> Self {
        Self {
            index,
            downloader,
            pipeline,
            checkpoint,
            shutdown,
            base_url: base_url.into(),
            date_filter: date_filter.into(),
            parallel_archives,
        }
    }

    /// Lists, downloads and extracts every archive not yet checkpointed
    pub async fn crawl(&self) -> Result<()> {
        let listed = self.index.list(&self.date_filter).await?;

        let mut pending = Vec::new();
        for path in &listed {
            let remote_url = resolve_remote(&self.base_url, path);
            if self.checkpoint.contains(&remote_url) {
                tracing::info!("skipping {}, fully extracted in a previous run", remote_url);
                continue;
            }
            let local_path = self.downloader.local_path(&remote_url);
            pending.push(ArchiveReference {
                remote_url,
                local_path,
            });
        }

        tracing::info!(
            "{} of {} archives pending extraction",
            pending.len(),
            listed.len()
        );

        let workers = self.parallel_archives.min(pending.len());
        let queue = Arc::new(WorkQueue::new(pending, self.shutdown.clone()));

        let downloader = Arc::clone(&self.downloader);
        let pipeline = Arc::clone(&self.pipeline);
        run_worker_pool(queue, workers, move |archive: ArchiveReference| {
            let downloader = Arc::clone(&downloader);
            let pipeline = Arc::clone(&pipeline);
            async move {
                if let Err(e) = process_archive(&downloader, &pipeline, &archive).await {
                    tracing::error!("archive {} failed: {}", archive.remote_url, e);
                }
            }
        })
        .await;

        Ok(())
    }
}

/// Downloads one archive and runs the extraction pipeline over it
async fn process_archive(
    downloader: &ArchiveDownloader,
    pipeline: &Arc<ExtractionPipeline>,
    archive: &ArchiveReference,
) -> Result<()> {
    let local = downloader.fetch(&archive.remote_url).await?;

    let pipeline = Arc::clone(pipeline);
    let remote_url = archive.remote_url.clone();
    let stats = tokio::task::spawn_blocking(move || pipeline.run(&remote_url, &local))
        .await
        .map_err(|e| WarcflowError::Extraction(format!("extraction task failed: {}", e)))??;

    tracing::debug!(
        "archive {} done: {} passed of {} records",
        archive.remote_url,
        stats.passed,
        stats.total
    );
    Ok(())
}

/// Joins an index-listed archive path onto the archive host's base URL.
/// Absolute URLs in the listing are taken as-is.
fn resolve_remote(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_remote_joins_relative_paths() {
        assert_eq!(
            resolve_remote(
                "https://data.example.org/",
                "crawl-data/2019-08/seg-00001.warc.gz"
            ),
            "https://data.example.org/crawl-data/2019-08/seg-00001.warc.gz"
        );
        assert_eq!(
            resolve_remote(
                "https://data.example.org",
                "/crawl-data/2019-08/seg-00001.warc.gz"
            ),
            "https://data.example.org/crawl-data/2019-08/seg-00001.warc.gz"
        );
    }

    #[test]
    fn test_resolve_remote_keeps_absolute_urls() {
        assert_eq!(
            resolve_remote(
                "https://data.example.org/",
                "https://mirror.example.net/seg.warc.gz"
            ),
            "https://mirror.example.net/seg.warc.gz"
        );
    }
}
