use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use brood_api::{WaitError, WaitResult};
use flume::RecvTimeoutError;

use super::worker::Completion;

/// Awaitable reference to one submitted task.
///
/// Exactly one handle exists per submission. A handle yields the task's
/// value at most once; waiting again after a successful wait reports
/// [`WaitError::Cancelled`].
pub struct TaskHandle<T> {
    seq: usize,
    pool: Arc<str>,
    reply: flume::Receiver<Completion<T>>,
    finished: Arc<AtomicBool>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(
        seq: usize,
        pool: Arc<str>,
        reply: flume::Receiver<Completion<T>>,
        finished: Arc<AtomicBool>,
    ) -> Self {
        Self {
            seq,
            pool,
            reply,
            finished,
        }
    }

    /// Submission sequence number within the pool, starting at 0.
    pub fn seq(&self) -> usize {
        self.seq
    }

    /// Label of the pool the task was submitted to.
    pub fn pool(&self) -> &str {
        &self.pool
    }

    /// Whether the task has run to completion (or panicked).
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Block for up to `timeout` waiting for the task's value.
    ///
    /// A timeout only abandons the wait; the task keeps running.
    pub fn wait(&self, timeout: Duration) -> WaitResult<T> {
        match self.reply.recv_timeout(timeout) {
            Ok(completion) => Self::settle(completion),
            Err(RecvTimeoutError::Timeout) => Err(WaitError::TimedOut(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(WaitError::Cancelled),
        }
    }

    /// Async twin of [`wait`](Self::wait) for callers inside a Tokio runtime.
    pub async fn wait_async(&self, timeout: Duration) -> WaitResult<T> {
        match tokio::time::timeout(timeout, self.reply.recv_async()).await {
            Ok(Ok(completion)) => Self::settle(completion),
            Ok(Err(_disconnected)) => Err(WaitError::Cancelled),
            Err(_elapsed) => Err(WaitError::TimedOut(timeout)),
        }
    }

    fn settle(completion: Completion<T>) -> WaitResult<T> {
        completion.outcome.map_err(|cause| {
            WaitError::Internal(format!("worker {} panicked: {}", completion.worker, cause))
        })
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("seq", &self.seq)
            .field("pool", &self.pool)
            .field("finished", &self.is_finished())
            .finish()
    }
}
