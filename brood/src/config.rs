use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::identity::NamingStrategy;

pub const DEFAULT_PARALLELISM: usize = 10;
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "child-";
pub const DEFAULT_QUEUE_CAPACITY: usize = 1;

pub const ENV_PARALLELISM: &str = "BROOD_PARALLELISM";
pub const ENV_TASK_COUNT: &str = "BROOD_TASK_COUNT";
pub const ENV_WORKING_DIR: &str = "BROOD_WORKING_DIR";
pub const ENV_TASK_TIMEOUT_MS: &str = "BROOD_TASK_TIMEOUT_MS";
pub const ENV_SHUTDOWN_TIMEOUT_MS: &str = "BROOD_SHUTDOWN_TIMEOUT_MS";
pub const ENV_NAMING: &str = "BROOD_NAMING";
pub const ENV_THREAD_PREFIX: &str = "BROOD_THREAD_PREFIX";
pub const ENV_LOG_FORMAT: &str = "BROOD_LOG_FORMAT";

// --- Configuration Enums ---

/// Output format of the diagnostic stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected `text` or `json`, got `{other}`")),
        }
    }
}

// --- Pool Configuration ---

/// Configuration for a `WorkerPool`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads, fixed for the life of the pool.
    pub parallelism: usize,

    /// Pending jobs each worker's queue holds before `submit` blocks.
    pub queue_capacity: usize,

    /// Worker threads are named `<prefix><slot>`.
    pub thread_name_prefix: String,
}

impl PoolConfig {
    pub fn with_parallelism(parallelism: usize) -> Self {
        Self {
            parallelism,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::with_parallelism(DEFAULT_PARALLELISM)
    }
}

// --- Run Configuration ---

/// Configuration for a full coordinator run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BroodConfig {
    /// Number of worker threads in the pool.
    pub parallelism: usize,

    /// Number of identity-file tasks submitted.
    pub task_count: usize,

    /// Directory the identity files are written to.
    pub working_dir: PathBuf,

    /// How long the collector waits on each task.
    pub task_timeout: Duration,

    /// Grace period for draining the pool at shutdown.
    pub shutdown_timeout: Duration,

    /// File naming scheme for identity files.
    pub naming: NamingStrategy,

    /// Prefix of worker thread names.
    pub thread_name_prefix: String,

    /// Diagnostic output format.
    pub log_format: LogFormat,
}

impl Default for BroodConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            task_count: DEFAULT_PARALLELISM,
            working_dir: PathBuf::from("."),
            task_timeout: DEFAULT_TASK_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            naming: NamingStrategy::default(),
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl BroodConfig {
    /// Load configuration from `BROOD_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// `BROOD_TASK_COUNT` defaults to the parallelism when unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let parallelism = parse_or(&lookup, ENV_PARALLELISM, defaults.parallelism)?;
        let task_count = parse_or(&lookup, ENV_TASK_COUNT, parallelism)?;
        let working_dir = lookup(ENV_WORKING_DIR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.working_dir);
        let task_timeout = parse_millis_or(&lookup, ENV_TASK_TIMEOUT_MS, defaults.task_timeout)?;
        let shutdown_timeout =
            parse_millis_or(&lookup, ENV_SHUTDOWN_TIMEOUT_MS, defaults.shutdown_timeout)?;
        let naming = parse_or(&lookup, ENV_NAMING, defaults.naming)?;
        let thread_name_prefix = lookup(ENV_THREAD_PREFIX).unwrap_or(defaults.thread_name_prefix);
        let log_format = parse_or(&lookup, ENV_LOG_FORMAT, defaults.log_format)?;

        Ok(Self {
            parallelism,
            task_count,
            working_dir,
            task_timeout,
            shutdown_timeout,
            naming,
            thread_name_prefix,
            log_format,
        })
    }

    /// Check the values a run cannot start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallelism == 0 {
            return Err(ConfigError::Invalid {
                key: ENV_PARALLELISM,
                value: self.parallelism.to_string(),
                reason: "pool needs at least one worker".to_string(),
            });
        }
        if !self.working_dir.is_dir() {
            return Err(ConfigError::MissingWorkingDir(self.working_dir.clone()));
        }
        Ok(())
    }

    /// Pool settings for this run.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            parallelism: self.parallelism,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            thread_name_prefix: self.thread_name_prefix.clone(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

fn parse_millis_or<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let millis = parse_or(lookup, key, default.as_millis() as u64)?;
    Ok(Duration::from_millis(millis))
}
