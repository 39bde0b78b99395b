//! # Worker Thread Module
//!
//! Each pool slot runs one OS thread executing [`worker_thread_main`]: pull
//! a job from the slot's own queue, run it, repeat until the queue is closed
//! and drained.
//!
//! ## Key Concepts
//! - Context ids: every thread gets a stable numeric id on first use
//! - Panic isolation: a panicking job never takes its worker down
//! - Span propagation: a job runs inside the span that was current when it
//!   was submitted, so worker-side events keep the submitter's context
//! - Exit notification: a worker announces its slot on the exit channel as
//!   its last act, which is what pool shutdown waits on

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use brood_api::{TaskId, UnitOfWork};
use tracing::{Span, debug, trace};

/// Job as stored in a worker queue.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// What a worker sends back through a task handle.
#[derive(Debug)]
pub(crate) struct Completion<T> {
    /// Name of the worker thread that ran the task
    pub worker: String,
    /// Task output, or the panic message
    pub outcome: Result<T, String>,
}

static NEXT_CONTEXT_ID: AtomicI64 = AtomicI64::new(1);

thread_local! {
    static CONTEXT_ID: i64 = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
}

/// Identifier of the current execution context.
///
/// Assigned from a process-wide counter the first time a thread asks and
/// stable for the rest of that thread's life. Never [`TaskId::UNKNOWN`].
pub fn context_id() -> TaskId {
    CONTEXT_ID.with(|id| TaskId::new(*id))
}

/// Name of the current thread, for diagnostics.
pub fn current_thread_name() -> String {
    std::thread::current()
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("thread-{}", context_id()))
}

/// Wrap a unit of work into a queue job that reports through `reply`.
///
/// The unit runs inside `span`. `finished` is raised before the completion
/// is sent, so a waiter that received the completion always observes the
/// task as finished.
pub(crate) fn package<U>(
    unit: U,
    reply: flume::Sender<Completion<U::Output>>,
    finished: Arc<AtomicBool>,
    span: Span,
) -> Job
where
    U: UnitOfWork,
{
    Box::new(move || {
        let outcome = span
            .in_scope(|| panic::catch_unwind(AssertUnwindSafe(|| unit.run())))
            .map_err(panic_message);
        finished.store(true, Ordering::Release);

        let completion = Completion {
            worker: current_thread_name(),
            outcome,
        };
        // The waiter may have given up already; nobody is left to tell.
        let _ = reply.send(completion);
    })
}

/// Main function for a worker thread
pub(crate) fn worker_thread_main(
    slot: usize,
    jobs: flume::Receiver<Job>,
    exited: flume::Sender<usize>,
) {
    let name = current_thread_name();
    trace!(worker = %name, context_id = %context_id(), "worker started");

    let mut executed = 0usize;
    // Ends once every sender is gone and the queue is drained.
    while let Ok(job) = jobs.recv() {
        job();
        executed += 1;
    }

    debug!(worker = %name, executed, "worker stopped");
    let _ = exited.send(slot);
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}
