//! The job execution boundary
//!
//! The orchestrator decides *when* a site job runs; an implementation of
//! [`JobExecutor`] decides *how*: in-process, as a spawned task, or as a
//! separate process. [`CommandJobExecutor`] does the latter, invoking a
//! configured command once per job.

use crate::{Result, WarcflowError};
use async_trait::async_trait;
use std::path::PathBuf;

/// Everything a job execution needs to know about itself
#[derive(Debug, Clone)]
pub struct JobInvocation {
    /// Index of the site in the site list
    pub site_index: usize,

    /// Resume a previously interrupted crawl of this site
    pub resume: bool,

    /// Whether this invocation came from the daemon scheduler
    pub daemonized: bool,

    pub config_path: PathBuf,

    pub site_list_path: PathBuf,
}

/// Executes one site crawl job to completion
#[async_trait]
pub trait JobExecutor: Send + Sync {
    async fn execute(&self, job: &JobInvocation) -> Result<()>;
}

/// Spawns a subprocess per job:
/// `<command> <config> <site_list> <index> <resume> <daemonized>`
pub struct CommandJobExecutor {
    program: String,
}

impl CommandJobExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl JobExecutor for CommandJobExecutor {
    async fn execute(&self, job: &JobInvocation) -> Result<()> {
        tracing::info!(
            "spawning crawl job {} (daemonized: {}): {}",
            job.site_index,
            job.daemonized,
            self.program
        );

        let status = tokio::process::Command::new(&self.program)
            .arg(&job.config_path)
            .arg(&job.site_list_path)
            .arg(job.site_index.to_string())
            .arg(job.resume.to_string())
            .arg(job.daemonized.to_string())
            .status()
            .await?;

        if !status.success() {
            return Err(WarcflowError::Job {
                job_id: job.site_index,
                message: format!("job command exited with {}", status),
            });
        }
        Ok(())
    }
}
