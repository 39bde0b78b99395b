use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors related to the worker pool itself.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Pool parallelism must be at least 1")]
    InvalidParallelism,
    #[error("Failed to spawn worker thread {label}: {source}")]
    ThreadSpawn {
        label: String,
        #[source]
        source: io::Error,
    },
    #[error("Worker pool is shutting down")]
    ShuttingDown,
    #[error("Worker pool is terminated")]
    Terminated,
    #[error("Worker pool has not been started")]
    NotStarted,
    #[error("Worker pool job queue is closed")]
    QueueClosed,
}

/// Errors related to loading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("Working directory {0:?} is not an existing directory")]
    MissingWorkingDir(PathBuf),
}

/// Step of writing an identity file that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Open,
    Write,
    Close,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            WriteStage::Open => "open",
            WriteStage::Write => "write",
            WriteStage::Close => "close",
        };
        f.write_str(verb)
    }
}

/// Failure to produce an identity file.
#[derive(Error, Debug)]
#[error("Failed to {stage} {}: {source}", .path.display())]
pub struct IdentityError {
    pub stage: WriteStage,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl IdentityError {
    pub fn new(stage: WriteStage, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            stage,
            path: path.into(),
            source,
        }
    }
}
