//! # Worker Pool Module
//!
//! A fixed-size pool of dedicated worker threads, each fed by its own
//! bounded job queue.
//!
//! ## Key Concepts
//! - Fixed parallelism: exactly N threads, named `<prefix><slot>`
//! - Round-robin dispatch: submission `k` goes to slot `k % N`, so N tasks
//!   on N workers run on N distinct threads
//! - Bounded queueing: `submit` blocks while the target slot's queue is full
//! - Handles: every submission returns a [`TaskHandle`]
//! - Context: jobs run inside the span current at `submit`
//! - Lifecycle: `Unstarted -> Running -> ShuttingDown -> Terminated`,
//!   serialized by one mutex, never moving backwards
//!
//! ## Shutdown
//! Shutdown closes the queues, lets workers drain what was already queued and
//! waits for every worker to exit before a single deadline. Calling it on a
//! terminated pool is a no-op that reports success. There is no task
//! cancellation: a running job always runs to the end.

mod handle;
mod worker;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use brood_api::{Lifecycle, UnitOfWork};
use flume::RecvTimeoutError;
use tracing::{Span, debug, warn};

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::log_pool;

pub use handle::TaskHandle;
pub use worker::{context_id, current_thread_name};

use worker::Job;

/// Worker thread slot
struct WorkerSlot {
    label: String,
    thread: Option<JoinHandle<()>>,
}

/// Lifecycle-guarded pool state
struct PoolState {
    lifecycle: Lifecycle,
    /// One queue per slot; emptied once shutdown begins, which closes them.
    job_txs: Vec<flume::Sender<Job>>,
    workers: Vec<WorkerSlot>,
}

impl PoolState {
    fn advance(&mut self, next: Lifecycle) {
        if self.lifecycle.can_advance_to(next) {
            self.lifecycle = next;
        }
    }
}

/// Fixed-size pool of worker threads.
pub struct WorkerPool {
    parallelism: usize,
    label: Arc<str>,
    state: Mutex<PoolState>,
    /// Each worker announces its slot here when it exits.
    exit_rx: flume::Receiver<usize>,
    next_seq: AtomicUsize,
}

impl WorkerPool {
    /// Spawn `config.parallelism` worker threads and start accepting work.
    ///
    /// # Errors
    /// - [`PoolError::InvalidParallelism`] for a zero-sized pool
    /// - [`PoolError::ThreadSpawn`] if the OS refuses a thread; workers
    ///   spawned so far are released
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        if config.parallelism == 0 {
            return Err(PoolError::InvalidParallelism);
        }

        let (exit_tx, exit_rx) = flume::unbounded();

        let pool = Self {
            parallelism: config.parallelism,
            label: Arc::from(config.thread_name_prefix.as_str()),
            state: Mutex::new(PoolState {
                lifecycle: Lifecycle::Unstarted,
                job_txs: Vec::with_capacity(config.parallelism),
                workers: Vec::with_capacity(config.parallelism),
            }),
            exit_rx,
            next_seq: AtomicUsize::new(0),
        };

        {
            let mut state = pool.lock_state();
            for slot in 0..config.parallelism {
                let label = format!("{}{}", config.thread_name_prefix, slot);
                let (job_tx, jobs) = flume::bounded::<Job>(config.queue_capacity.max(1));
                let exited = exit_tx.clone();

                let spawned = thread::Builder::new()
                    .name(label.clone())
                    .spawn(move || worker::worker_thread_main(slot, jobs, exited));

                match spawned {
                    Ok(thread) => {
                        state.job_txs.push(job_tx);
                        state.workers.push(WorkerSlot {
                            label,
                            thread: Some(thread),
                        });
                    }
                    Err(source) => {
                        // Closing the queues lets the threads already up exit.
                        state.job_txs.clear();
                        state.advance(Lifecycle::ShuttingDown);
                        return Err(PoolError::ThreadSpawn { label, source });
                    }
                }
            }
            state.advance(Lifecycle::Running);
        }

        log_pool!(&*pool.label, "started", workers = pool.parallelism);
        Ok(pool)
    }

    /// Number of worker threads.
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Current lifecycle stage.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lock_state().lifecycle
    }

    /// Names of the worker threads, in slot order.
    pub fn worker_labels(&self) -> Vec<String> {
        self.lock_state()
            .workers
            .iter()
            .map(|w| w.label.clone())
            .collect()
    }

    /// Queue a unit of work on the next slot (round-robin) and return its
    /// handle.
    ///
    /// Blocks while that slot's queue is full.
    ///
    /// # Errors
    /// Fails fast with [`PoolError::ShuttingDown`] or
    /// [`PoolError::Terminated`] once shutdown has begun.
    pub fn submit<U>(&self, unit: U) -> Result<TaskHandle<U::Output>, PoolError>
    where
        U: UnitOfWork,
    {
        let (seq, sender) = {
            let state = self.lock_state();
            match state.lifecycle {
                Lifecycle::Running => {}
                Lifecycle::Unstarted => return Err(PoolError::NotStarted),
                Lifecycle::ShuttingDown => return Err(PoolError::ShuttingDown),
                Lifecycle::Terminated => return Err(PoolError::Terminated),
            }
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            let sender = state
                .job_txs
                .get(seq % self.parallelism)
                .cloned()
                .ok_or(PoolError::QueueClosed)?;
            (seq, sender)
        };
        let (reply_tx, reply_rx) = flume::bounded(1);
        let finished = Arc::new(AtomicBool::new(false));
        let job = worker::package(unit, reply_tx, finished.clone(), Span::current());

        // Sent outside the lock: a full queue must not stall shutdown.
        sender.send(job).map_err(|_| PoolError::QueueClosed)?;
        debug!(pool = %self.label, task = seq, slot = seq % self.parallelism, "task submitted");

        Ok(TaskHandle::new(seq, self.label.clone(), reply_rx, finished))
    }

    /// Stop accepting work and wait up to `timeout` for workers to drain.
    ///
    /// Returns `true` when every worker exited in time; the pool is then
    /// `Terminated`. Returns `false` when the grace period ran out; the pool
    /// stays `ShuttingDown` and a later call resumes waiting.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        {
            let mut state = self.lock_state();
            match state.lifecycle {
                Lifecycle::Terminated => return true,
                Lifecycle::Unstarted | Lifecycle::Running => {
                    state.job_txs.clear();
                    state.advance(Lifecycle::ShuttingDown);
                    log_pool!(&*self.label, "shutting_down", grace_ms = timeout.as_millis() as u64);
                }
                Lifecycle::ShuttingDown => {}
            }
        }

        let deadline = Instant::now() + timeout;
        loop {
            match self.exit_rx.recv_deadline(deadline) {
                Ok(slot) => debug!(pool = %self.label, slot, "worker exited"),
                // Every worker dropped its exit sender: all are gone.
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    warn!(
                        pool = %self.label,
                        grace_ms = timeout.as_millis() as u64,
                        "workers did not drain before the shutdown deadline"
                    );
                    return false;
                }
            }
        }

        let threads: Vec<_> = {
            let mut state = self.lock_state();
            if state.lifecycle.is_terminated() {
                return true;
            }
            state.advance(Lifecycle::Terminated);
            state
                .workers
                .iter_mut()
                .filter_map(|w| w.thread.take().map(|t| (w.label.clone(), t)))
                .collect()
        };

        for (label, thread) in threads {
            if thread.join().is_err() {
                warn!(pool = %self.label, worker = %label, "worker thread panicked");
            }
        }

        log_pool!(&*self.label, "terminated");
        true
    }

    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Close the queues; workers finish queued jobs and exit on their own.
        let mut state = self.lock_state();
        state.job_txs.clear();
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock_state();
        f.debug_struct("WorkerPool")
            .field("label", &self.label)
            .field("parallelism", &self.parallelism)
            .field("lifecycle", &state.lifecycle)
            .field("workers", &state.workers.len())
            .finish()
    }
}
