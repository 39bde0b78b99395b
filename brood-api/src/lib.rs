//! # Brood API
//!
//! Shared vocabulary for the brood worker pool: what a task reports, how a
//! pool moves through its lifecycle, and why waiting on a task can fail.
//!
//! ## Core Components
//!
//! - **Task reports**: the immutable `{id, status}` record produced per task
//! - **Lifecycle**: monotonic pool stages from `Unstarted` to `Terminated`
//! - **Wait errors**: timeout, cancellation and internal failure of a wait
//! - **Units of work**: the trait a pool executes
//!
//! ## Usage Example
//!
//! ```rust
//! use brood_api::{Status, TaskId, TaskReport};
//!
//! let report = TaskReport::new(TaskId::new(7), Status::Success);
//! assert_eq!(report.to_string(), "7 SUCCESS");
//! ```
//!
//! ## Module Organization
//!
//! - [`report`]: task ids, statuses and reports
//! - [`lifecycle`]: pool lifecycle stages
//! - [`errors`]: wait failure taxonomy
//! - [`task`]: the unit-of-work trait

pub mod errors;
pub mod lifecycle;
pub mod report;
pub mod task;

pub use errors::{WaitError, WaitResult};
pub use lifecycle::Lifecycle;
pub use report::{Status, TaskId, TaskReport};
pub use task::UnitOfWork;
