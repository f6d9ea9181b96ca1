use std::time::Duration;

/// Counters for one archive extraction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Response records seen
    pub total: u64,

    /// Records that passed all filter criteria
    pub passed: u64,

    /// Records rejected by the filter
    pub discarded: u64,

    /// Records that failed extraction or delivery
    pub errored: u64,
}

impl PipelineStats {
    /// Seconds spent per record, or `None` for an empty archive
    pub fn secs_per_record(&self, elapsed: Duration) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(elapsed.as_secs_f64() / self.total as f64)
    }

    /// Records processed per second, or `None` for an empty archive or a
    /// zero-length elapsed time
    pub fn records_per_sec(&self, elapsed: Duration) -> Option<f64> {
        if self.total == 0 || elapsed.is_zero() {
            return None;
        }
        Some(self.total as f64 / elapsed.as_secs_f64())
    }
}
