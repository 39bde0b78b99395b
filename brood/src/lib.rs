// Brood Worker Pool
//
// A fixed-size pool of worker threads, each writing an identity file and
// reporting back, plus the collector, report formatter and coordinator that
// turn those reports into one deterministic, id-sorted console report.

pub mod collector;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod identity;
pub mod logging;
pub mod pool;
pub mod report;

// Re-export commonly used types
pub use brood_api::{Lifecycle, Status, TaskId, TaskReport, UnitOfWork, WaitError, WaitResult};
pub use config::{BroodConfig, LogFormat, PoolConfig};
pub use coordinator::{Coordinator, RunSummary};
pub use error::{ConfigError, IdentityError, PoolError};
pub use identity::{IdentityFile, NamingStrategy};
pub use pool::{TaskHandle, WorkerPool};
