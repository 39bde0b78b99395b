//! # Task Reports
//!
//! A [`TaskReport`] is the record every submitted unit of work produces
//! exactly once: the identifier of the execution context that ran it and
//! whether it succeeded.
//!
//! ## Key Concepts
//! - [`TaskId`]: numeric identifier of the worker context, or the
//!   [`TaskId::UNKNOWN`] sentinel when the task never reported back
//! - [`Status`]: `SUCCESS` or `FAILURE`
//!
//! Reports order by id only. The sentinel is `-1`, so synthesized failures
//! sort ahead of every real id.

use std::cmp::Ordering;
use std::fmt;

/// Identifier of the execution context that ran a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(i64);

impl TaskId {
    /// Sentinel for a task whose worker never reported an id.
    pub const UNKNOWN: TaskId = TaskId(-1);

    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    pub const fn is_unknown(self) -> bool {
        self.0 == Self::UNKNOWN.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TaskId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Outcome of a single unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::Failure => "FAILURE",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable `{id, status}` record produced per task.
///
/// Created by a worker when its task finishes, or synthesized by the
/// collector when the task could not be observed to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskReport {
    id: TaskId,
    status: Status,
}

impl TaskReport {
    pub const fn new(id: TaskId, status: Status) -> Self {
        Self { id, status }
    }

    pub const fn success(id: TaskId) -> Self {
        Self::new(id, Status::Success)
    }

    pub const fn failure(id: TaskId) -> Self {
        Self::new(id, Status::Failure)
    }

    /// Failure report for a task whose worker never answered.
    pub const fn unknown_failure() -> Self {
        Self::failure(TaskId::UNKNOWN)
    }

    pub const fn id(&self) -> TaskId {
        self.id
    }

    pub const fn status(&self) -> Status {
        self.status
    }

    /// Total order on ids, ignoring status.
    pub fn cmp_by_id(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

/// Renders as `"<id> <STATUS>"`, the console report line format.
impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.status)
    }
}
