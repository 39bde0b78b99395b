use std::fmt;

/// Lifecycle stages of a worker pool.
///
/// Stages only move forward: `Unstarted -> Running -> ShuttingDown ->
/// Terminated`. Skipping a stage is allowed (a pool that fails to start can
/// go straight to `ShuttingDown`), going back is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lifecycle {
    /// Pool object exists, workers not spawned yet
    Unstarted,
    /// Workers are accepting and running tasks
    Running,
    /// No new tasks are accepted; queued work is draining
    ShuttingDown,
    /// Every worker has exited
    Terminated,
}

impl Lifecycle {
    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    pub fn can_advance_to(self, next: Lifecycle) -> bool {
        next > self
    }

    pub fn accepts_work(self) -> bool {
        matches!(self, Lifecycle::Running)
    }

    pub fn is_terminated(self) -> bool {
        matches!(self, Lifecycle::Terminated)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifecycle::Unstarted => "unstarted",
            Lifecycle::Running => "running",
            Lifecycle::ShuttingDown => "shutting-down",
            Lifecycle::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
