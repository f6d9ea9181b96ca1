//! Crawl job orchestration
//!
//! The orchestrator partitions the site list into one-shot jobs, drained by
//! a bounded worker pool, and daemonized jobs, dispatched by the
//! [`DaemonScheduler`] on a collision-free time-slotted schedule. Both pools
//! observe the same [`ShutdownCoordinator`] and stop claiming work once a
//! stop is requested; in-flight jobs always run to completion.

mod daemon;
mod executor;
mod pool;
mod queue;
mod shutdown;

pub use daemon::{DaemonScheduler, JobId, ScheduleEntry};
pub use executor::{CommandJobExecutor, JobExecutor, JobInvocation};
pub use pool::run_worker_pool;
pub use queue::WorkQueue;
pub use shutdown::ShutdownCoordinator;

use crate::config::SiteList;
use crate::Result;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

type DispatchFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Runs all site crawl jobs from a site list
pub struct Orchestrator {
    config_path: PathBuf,
    site_list_path: PathBuf,
    sites: SiteList,
    executor: Arc<dyn JobExecutor>,
    shutdown: ShutdownCoordinator,
    parallel_crawlers: usize,
    parallel_daemons: usize,
    resume: bool,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config_path: &Path,
        site_list_path: &Path,
        sites: SiteList,
        executor: Arc<dyn JobExecutor>,
        shutdown: ShutdownCoordinator,
        parallel_crawlers: usize,
        parallel_daemons: usize,
        resume: bool,
    ) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            site_list_path: site_list_path.to_path_buf(),
            sites,
            executor,
            shutdown,
            parallel_crawlers,
            parallel_daemons,
            resume,
        }
    }

    /// Runs until every one-shot job finished and, if daemon jobs exist,
    /// until a stop is requested.
    pub async fn run(&self) -> Result<()> {
        let scheduler = Arc::new(DaemonScheduler::new(self.shutdown.clone()));
        let mut one_shot = Vec::new();

        for (index, site) in self.sites.base_urls.iter().enumerate() {
            match site.daemonize {
                Some(interval) => scheduler.register(index, interval),
                None => one_shot.push(index),
            }
        }

        tracing::info!(
            "{} one-shot sites, {} daemonized sites",
            one_shot.len(),
            scheduler.len()
        );

        // No point spinning up more workers than there are jobs
        let crawler_workers = self.parallel_crawlers.min(one_shot.len());
        let queue = Arc::new(WorkQueue::new(one_shot, self.shutdown.clone()));

        let one_shot_pool = {
            let dispatch = self.dispatcher(false);
            run_worker_pool(queue, crawler_workers, dispatch)
        };

        let daemon_loop = {
            let scheduler = Arc::clone(&scheduler);
            let parallel_daemons = self.parallel_daemons;
            let dispatch = self.dispatcher(true);
            async move {
                if !scheduler.is_empty() {
                    scheduler.run(parallel_daemons, dispatch).await;
                }
            }
        };

        tokio::join!(one_shot_pool, daemon_loop);

        tracing::info!("orchestrator finished");
        Ok(())
    }

    /// Builds the per-job dispatch closure shared by both pools. Job
    /// failures are logged with their site index and never take down the
    /// orchestrator.
    fn dispatcher(
        &self,
        daemonized: bool,
    ) -> impl Fn(usize) -> DispatchFuture + Clone + Send + Sync + 'static {
        let executor = Arc::clone(&self.executor);
        let config_path = self.config_path.clone();
        let site_list_path = self.site_list_path.clone();
        let resume = self.resume;

        move |site_index: usize| {
            let executor = Arc::clone(&executor);
            let job = JobInvocation {
                site_index,
                resume,
                daemonized,
                config_path: config_path.clone(),
                site_list_path: site_list_path.clone(),
            };
            Box::pin(async move {
                if let Err(e) = executor.execute(&job).await {
                    tracing::error!("site job {} failed: {}", job.site_index, e);
                }
            })
        }
    }
}
