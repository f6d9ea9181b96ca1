//! Process-wide cooperative stop signal
//!
//! Every long-running loop holds a clone of the coordinator and checks it at
//! iteration boundaries; the daemon scheduler additionally races its due-time
//! sleep against [`ShutdownCoordinator::stopped`]. Nothing is force-cancelled;
//! in-flight jobs finish and the pools drain.

use tokio_util::sync::CancellationToken;

/// Cloneable handle to the shared stop signal
#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a cooperative stop. Idempotent; safe to call from a signal
    /// handler task or programmatically.
    pub fn request_stop(&self) {
        if !self.token.is_cancelled() {
            tracing::info!("stop requested, draining in-flight work");
            self.token.cancel();
        }
    }

    pub fn is_stopping(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once a stop has been requested. Used to cut blocking waits
    /// short, e.g. the daemon scheduler's sleep until the next due slot.
    pub async fn stopped(&self) {
        self.token.cancelled().await;
    }
}
