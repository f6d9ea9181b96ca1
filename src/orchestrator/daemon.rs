//! Time-slotted scheduler for recurring ("daemonized") crawl jobs
//!
//! The scheduler keeps one pending entry per registered job, ordered by
//! execution timestamp at integer-second resolution. Two entries never share
//! a timestamp: an insert that lands on an occupied second is shifted forward
//! one second at a time until a free slot is found, trading a small silent
//! delay for a strict total order of execution instants.

use super::ShutdownCoordinator;
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Identifier of a registered job (the site index in practice)
pub type JobId = usize;

/// A pending execution slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Unix timestamp (seconds) the job becomes due
    pub execute_at: i64,
    pub job_id: JobId,
}

#[derive(Default)]
struct ScheduleState {
    entries: Vec<ScheduleEntry>,
    intervals: HashMap<JobId, u64>,
}

impl ScheduleState {
    /// Inserts an entry at the candidate second, shifting forward past any
    /// occupied slots. Returns the slot actually taken.
    fn insert_at(&mut self, candidate: i64, job_id: JobId) -> i64 {
        let mut slot = candidate;
        while self.entries.iter().any(|e| e.execute_at == slot) {
            slot += 1;
        }
        self.entries.push(ScheduleEntry {
            execute_at: slot,
            job_id,
        });
        slot
    }

    fn pop_earliest(&mut self) -> Option<ScheduleEntry> {
        if self.entries.is_empty() {
            return None;
        }
        let earliest = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| e.execute_at)
            .map(|(i, _)| i)?;
        Some(self.entries.remove(earliest))
    }
}

/// Collision-free schedule of recurring jobs
pub struct DaemonScheduler {
    state: Mutex<ScheduleState>,
    shutdown: ShutdownCoordinator,
}

impl DaemonScheduler {
    pub fn new(shutdown: ShutdownCoordinator) -> Self {
        Self {
            state: Mutex::new(ScheduleState::default()),
            shutdown,
        }
    }

    /// Registers a recurring job with its first run due now
    pub fn register(&self, job_id: JobId, interval_secs: u64) {
        self.register_at(job_id, interval_secs, Utc::now().timestamp());
    }

    /// Registers a recurring job with its first run due at `first_run`
    /// (shifted if the slot is taken)
    pub fn register_at(&self, job_id: JobId, interval_secs: u64, first_run: i64) {
        let mut state = self.state.lock().unwrap();
        state.intervals.insert(job_id, interval_secs);
        let slot = state.insert_at(first_run, job_id);
        tracing::debug!(
            "registered daemon job {} every {}s, first slot {}",
            job_id,
            interval_secs,
            slot
        );
    }

    /// Number of registered daemon jobs
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().intervals.is_empty()
    }

    /// Snapshot of pending entries, in dispatch order
    pub fn pending(&self) -> Vec<ScheduleEntry> {
        let state = self.state.lock().unwrap();
        let mut entries = state.entries.clone();
        entries.sort_by_key(|e| e.execute_at);
        entries
    }

    fn take_earliest(&self) -> Option<ScheduleEntry> {
        self.state.lock().unwrap().pop_earliest()
    }

    /// Re-inserts a dispatched job at `max(previous_slot, now) + interval`,
    /// so a late dispatch schedules off the actual run time while an on-time
    /// dispatch schedules strictly off its nominal slot.
    fn rearm(&self, entry: ScheduleEntry, now: i64) {
        let mut state = self.state.lock().unwrap();
        let Some(interval) = state.intervals.get(&entry.job_id).copied() else {
            return;
        };
        state.insert_at(entry.execute_at.max(now) + interval as i64, entry.job_id);
    }

    /// Runs the dispatch loop until a stop is requested or no jobs are
    /// registered.
    ///
    /// Entries are dispatched in strict timestamp order. The loop sleeps
    /// until the earliest entry is due (a stop request cuts the sleep
    /// short), re-arms the job, then hands it to `dispatch` on its own task
    /// without waiting for it; at most `max_parallel` dispatched jobs run at
    /// once. In-flight jobs are not awaited on shutdown.
    pub async fn run<F, Fut>(&self, max_parallel: usize, dispatch: F)
    where
        F: Fn(JobId) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(max_parallel));

        loop {
            if self.shutdown.is_stopping() {
                break;
            }

            let Some(entry) = self.take_earliest() else {
                break;
            };

            let wait_secs = entry.execute_at - Utc::now().timestamp();
            if wait_secs > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(wait_secs as u64)) => {}
                    _ = self.shutdown.stopped() => break,
                }
            }
            if self.shutdown.is_stopping() {
                break;
            }

            let permit = tokio::select! {
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                _ = self.shutdown.stopped() => break,
            };

            self.rearm(entry, Utc::now().timestamp());

            let dispatch = dispatch.clone();
            tokio::spawn(async move {
                dispatch(entry.job_id).await;
                drop(permit);
            });
        }
    }
}
