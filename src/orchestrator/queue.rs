//! Shared FIFO work queue for one-shot jobs

use super::ShutdownCoordinator;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mutex-guarded queue of pending work items.
///
/// `pop` is atomic and destructive, so each item is handed to exactly one
/// worker. A stop request makes `pop` return `None` even while items remain,
/// which is how workers learn to stop claiming new work.
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    shutdown: ShutdownCoordinator,
}

impl<T> WorkQueue<T> {
    pub fn new(items: impl IntoIterator<Item = T>, shutdown: ShutdownCoordinator) -> Self {
        Self {
            items: Mutex::new(items.into_iter().collect()),
            shutdown,
        }
    }

    /// Removes and returns the oldest pending item, or `None` when the queue
    /// is empty or a stop was requested.
    pub fn pop(&self) -> Option<T> {
        if self.shutdown.is_stopping() {
            return None;
        }
        self.items.lock().unwrap().pop_front()
    }

    pub fn push(&self, item: T) {
        self.items.lock().unwrap().push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let queue = WorkQueue::new([1, 2, 3], ShutdownCoordinator::new());

        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_pop_returns_none_after_stop() {
        let shutdown = ShutdownCoordinator::new();
        let queue = WorkQueue::new([1, 2, 3], shutdown.clone());

        assert_eq!(queue.pop(), Some(1));
        shutdown.request_stop();
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_push_appends() {
        let queue = WorkQueue::new([1], ShutdownCoordinator::new());
        queue.push(2);

        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
    }
}
