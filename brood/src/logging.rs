// Logging System for Brood
//
// Diagnostics are the pool's side channel: per-task failures, timeouts and
// shutdown problems are reported here, never on stdout, so the console
// report stays exactly one line per task. Built on the `tracing` ecosystem.
//
// # Usage Examples
//
// ```rust
// use brood::logging;
//
// // INFO level, human-readable lines on stderr
// logging::init_default();
//
// // Or JSON events for log aggregators
// logging::init_production();
//
// // Then use the helper macros
// brood::log_pool!("child-", "started", workers = 4);
// brood::log_task!(3, "timed_out");
// ```

use std::io;
use std::sync::Once;
use tracing::{Level, Subscriber};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Configuration for the Brood logging system
///
/// # Examples
///
/// ```rust
/// use brood::logging::LogConfig;
/// use tracing::Level;
///
/// let custom_config = LogConfig {
///     level: Level::DEBUG,
///     json_format: true,
///     show_file_line: false,
///     show_thread_info: true,
///     target_filters: Some("brood=debug,brood::pool=trace".to_string()),
/// };
/// brood::logging::init(custom_config);
/// ```
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to use JSON format for logs
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id
    pub show_thread_info: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...")
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: false,
            show_thread_info: true,
            target_filters: None,
        }
    }
}

// Initialization guard to ensure we only initialize once
static INIT: Once = Once::new();

/// Initialize the logging system with the given configuration
///
/// All events go to stderr. It's safe to call multiple times; only the
/// first call takes effect.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let subscriber = build_subscriber(&config);
        set_global_subscriber(subscriber);
    });
}

/// Build the subscriber for `config` without installing it.
///
/// Useful with `tracing::subscriber::with_default` to scope logging to a
/// single test or thread.
pub fn build_subscriber(config: &LogConfig) -> Box<dyn Subscriber + Send + Sync> {
    let mut env_filter =
        EnvFilter::from_default_env().add_directive(LevelFilter::from_level(config.level).into());

    // Add any target-specific filters if provided
    if let Some(filters) = &config.target_filters {
        for filter in filters.split(',') {
            if let Ok(directive) = filter.trim().parse() {
                env_filter = env_filter.add_directive(directive);
            }
        }
    }

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json_format {
        Box::new(
            registry.with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(io::stderr)
                    .with_thread_names(config.show_thread_info)
                    .with_file(config.show_file_line)
                    .with_line_number(config.show_file_line),
            ),
        )
    } else {
        Box::new(
            registry.with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_ansi(atty::is(atty::Stream::Stderr))
                    .with_file(config.show_file_line)
                    .with_line_number(config.show_file_line)
                    .with_thread_names(config.show_thread_info)
                    .with_thread_ids(config.show_thread_info),
            ),
        )
    }
}

// Helper function to set the global subscriber
fn set_global_subscriber<S>(subscriber: S)
where
    S: Subscriber + Send + Sync + 'static,
{
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error setting global tracing subscriber: {}", err);
    }
}

/// Initialize default logging: INFO level, human-readable lines.
pub fn init_default() {
    init(LogConfig::default());
}

/// Initialize logging optimized for production environments
///
/// JSON events, no file/line information.
pub fn init_production() {
    let config = LogConfig {
        level: Level::INFO,
        json_format: true,
        show_file_line: false,
        show_thread_info: true,
        target_filters: None,
    };
    init(config);
}

/// Initialize logging for testing
///
/// Only warnings and errors, to keep test output clean.
///
/// ```rust
/// #[test]
/// fn my_test() {
///     brood::logging::init_test();
///     // Your test code...
/// }
/// ```
pub fn init_test() {
    let config = LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: true,
        target_filters: None,
    };
    init(config);
}

/// Log pool lifecycle events
///
/// # Examples
///
/// ```rust
/// use brood::log_pool;
///
/// log_pool!("child-", "started");
/// log_pool!("child-", "shutdown_timed_out", waited_ms = 5000);
/// ```
#[macro_export]
macro_rules! log_pool {
    ($pool:expr, $event:expr) => {
        tracing::info!(pool = $pool, event = $event);
    };
    ($pool:expr, $event:expr, $($fields:tt)*) => {
        tracing::info!(pool = $pool, event = $event, $($fields)*);
    };
}

/// Log per-task events at debug level
///
/// # Examples
///
/// ```rust
/// use brood::log_task;
///
/// log_task!(0, "collected");
/// log_task!(2, "collected", status = "FAILURE");
/// ```
#[macro_export]
macro_rules! log_task {
    ($task:expr, $event:expr) => {
        tracing::debug!(task = $task, event = $event);
    };
    ($task:expr, $event:expr, $($fields:tt)*) => {
        tracing::debug!(task = $task, event = $event, $($fields)*);
    };
}

/// Log error events with the error's display text attached
///
/// # Examples
///
/// ```rust
/// use brood::log_error;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
/// log_error!(error);
/// log_error!(error, worker = "child-1", "failed to write to file");
/// ```
#[macro_export]
macro_rules! log_error {
    ($error:expr) => {
        tracing::error!(error = %$error);
    };
    ($error:expr, $($fields:tt)*) => {
        tracing::error!(error = %$error, $($fields)*);
    };
}
