//! Shared FIFO between the producer and the download workers.
use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::task::DownloadTask;

/// Unbounded, thread-safe FIFO of [`DownloadTask`]s.
///
/// Neither side ever blocks on the other for longer than the internal lock is
/// held: [`enqueue`](Self::enqueue) always succeeds and
/// [`try_dequeue`](Self::try_dequeue) returns immediately.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: Mutex<VecDeque<DownloadTask>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, task: DownloadTask) {
        self.tasks.lock().push_back(task);
    }

    pub fn try_dequeue(&self) -> Option<DownloadTask> {
        self.tasks.lock().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}
