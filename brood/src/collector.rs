//! Result collection.
//!
//! Waits on every handle in submission order, one at a time, and turns
//! each into exactly one [`TaskReport`]. Nothing here fails: a handle that
//! times out, was cancelled or panicked becomes a sentinel failure report
//! and the cause goes to the diagnostic stream.

use std::time::Duration;

use brood_api::{TaskReport, WaitResult};
use tracing::{error, warn};

use crate::log_task;
use crate::pool::{TaskHandle, current_thread_name};

/// Collect one report per handle, blocking up to `timeout` on each.
///
/// The output has the same length as `handles`, in submission order.
pub fn collect(handles: Vec<TaskHandle<TaskReport>>, timeout: Duration) -> Vec<TaskReport> {
    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        let waited = handle.wait(timeout);
        reports.push(settle(&handle, waited));
    }
    reports
}

/// Async twin of [`collect`]; awaits handles sequentially.
pub async fn collect_async(
    handles: Vec<TaskHandle<TaskReport>>,
    timeout: Duration,
) -> Vec<TaskReport> {
    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        let waited = handle.wait_async(timeout).await;
        reports.push(settle(&handle, waited));
    }
    reports
}

fn settle(handle: &TaskHandle<TaskReport>, waited: WaitResult<TaskReport>) -> TaskReport {
    match waited {
        Ok(report) => {
            if !handle.is_finished() {
                warn!(
                    task = handle.seq(),
                    waiter = %current_thread_name(),
                    "task reported a result but is not done"
                );
            }
            log_task!(handle.seq(), "collected", id = %report.id(), status = %report.status());
            report
        }
        Err(cause) => {
            error!(
                task = handle.seq(),
                pool = handle.pool(),
                waiter = %current_thread_name(),
                error = %cause,
                "failed to collect task result"
            );
            TaskReport::unknown_failure()
        }
    }
}
