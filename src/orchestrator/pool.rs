//! Fixed-size worker pool draining a [`WorkQueue`]

use super::WorkQueue;
use std::future::Future;
use std::sync::Arc;

/// Runs `concurrency` workers until the queue is drained or a stop is
/// requested. Each worker loops pop → handle → pop; the pool resolves only
/// after every worker has finished its current item, so shutdown drains
/// rather than interrupts.
///
/// The handler owns error reporting: a failed item must not take the pool
/// down with it.
pub async fn run_worker_pool<T, F, Fut>(queue: Arc<WorkQueue<T>>, concurrency: usize, handler: F)
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    let mut workers = Vec::with_capacity(concurrency);

    for worker_id in 0..concurrency {
        let queue = Arc::clone(&queue);
        let handler = handler.clone();

        workers.push(tokio::spawn(async move {
            while let Some(item) = queue.pop() {
                handler(item).await;
            }
            tracing::debug!("worker {} exiting", worker_id);
        }));
    }

    for worker in workers {
        // A worker panicking is a bug in the handler; log and keep joining
        if let Err(e) = worker.await {
            tracing::error!("worker task failed: {}", e);
        }
    }
}
