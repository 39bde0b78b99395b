// Integration tests for brood::config

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use brood::config::*;
use brood::error::ConfigError;
use brood::identity::NamingStrategy;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_run_config_defaults() {
    let config = BroodConfig::default();

    assert_eq!(config.parallelism, 10);
    assert_eq!(config.task_count, 10);
    assert_eq!(config.working_dir, PathBuf::from("."));
    assert_eq!(config.task_timeout, Duration::from_secs(1));
    assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
    assert_eq!(config.naming, NamingStrategy::EpochSeconds);
    assert_eq!(config.thread_name_prefix, "child-");
    assert_eq!(config.log_format, LogFormat::Text);
}

#[test]
fn test_pool_config_defaults() {
    let config = PoolConfig::default();

    assert_eq!(config.parallelism, DEFAULT_PARALLELISM);
    assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    assert_eq!(config.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
}

#[test]
fn test_empty_lookup_yields_defaults() {
    let config = BroodConfig::from_lookup(|_| None).unwrap();

    assert_eq!(config, BroodConfig::default());
}

#[test]
fn test_lookup_overrides_every_field() {
    let config = BroodConfig::from_lookup(lookup_from(&[
        (ENV_PARALLELISM, "4"),
        (ENV_TASK_COUNT, "12"),
        (ENV_WORKING_DIR, "/tmp/brood"),
        (ENV_TASK_TIMEOUT_MS, "250"),
        (ENV_SHUTDOWN_TIMEOUT_MS, "750"),
        (ENV_NAMING, "millis"),
        (ENV_THREAD_PREFIX, "drone-"),
        (ENV_LOG_FORMAT, "JSON"),
    ]))
    .unwrap();

    assert_eq!(config.parallelism, 4);
    assert_eq!(config.task_count, 12);
    assert_eq!(config.working_dir, PathBuf::from("/tmp/brood"));
    assert_eq!(config.task_timeout, Duration::from_millis(250));
    assert_eq!(config.shutdown_timeout, Duration::from_millis(750));
    assert_eq!(config.naming, NamingStrategy::EpochMillis);
    assert_eq!(config.thread_name_prefix, "drone-");
    assert_eq!(config.log_format, LogFormat::Json);
}

#[test]
fn test_task_count_follows_parallelism_when_unset() {
    let config = BroodConfig::from_lookup(lookup_from(&[(ENV_PARALLELISM, " 3 ")])).unwrap();

    assert_eq!(config.parallelism, 3);
    assert_eq!(config.task_count, 3);
}

#[test]
fn test_blank_values_fall_back_to_defaults() {
    let config = BroodConfig::from_lookup(lookup_from(&[
        (ENV_PARALLELISM, ""),
        (ENV_WORKING_DIR, "  "),
    ]))
    .unwrap();

    assert_eq!(config.parallelism, DEFAULT_PARALLELISM);
    assert_eq!(config.working_dir, PathBuf::from("."));
}

#[test]
fn test_invalid_values_are_rejected() {
    let err = BroodConfig::from_lookup(lookup_from(&[(ENV_PARALLELISM, "many")])).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid { key: ENV_PARALLELISM, ref value, .. } if value == "many"
    ));

    let err = BroodConfig::from_lookup(lookup_from(&[(ENV_TASK_TIMEOUT_MS, "-5")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: ENV_TASK_TIMEOUT_MS, .. }));

    let err = BroodConfig::from_lookup(lookup_from(&[(ENV_NAMING, "hourly")])).unwrap_err();
    assert!(err.to_string().contains("BROOD_NAMING"));

    let err = BroodConfig::from_lookup(lookup_from(&[(ENV_LOG_FORMAT, "xml")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: ENV_LOG_FORMAT, .. }));
}

#[test]
fn test_validate() {
    let dir = tempfile::tempdir().unwrap();
    let valid = BroodConfig {
        working_dir: dir.path().to_path_buf(),
        ..BroodConfig::default()
    };
    assert_eq!(valid.validate(), Ok(()));

    let zero = BroodConfig {
        parallelism: 0,
        ..valid.clone()
    };
    assert!(matches!(zero.validate(), Err(ConfigError::Invalid { .. })));

    let missing = BroodConfig {
        working_dir: dir.path().join("absent"),
        ..valid.clone()
    };
    assert_eq!(
        missing.validate(),
        Err(ConfigError::MissingWorkingDir(dir.path().join("absent")))
    );
}

#[test]
fn test_pool_config_from_run_config() {
    let config = BroodConfig {
        parallelism: 7,
        thread_name_prefix: "w-".to_string(),
        ..BroodConfig::default()
    };

    let pool = config.pool_config();

    assert_eq!(pool.parallelism, 7);
    assert_eq!(pool.thread_name_prefix, "w-");
}
