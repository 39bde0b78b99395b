// End-to-end tests for brood::coordinator::Coordinator


use std::collections::BTreeSet;
use std::io;

use brood::collector::collect;
use brood::config::BroodConfig;
use brood::coordinator::Coordinator;
use brood::error::ConfigError;
use brood::identity::{IdentityFile, NamingStrategy};
use brood::report::{emit_report, format_report};
use brood::{Lifecycle, Status, TaskId, TaskReport};
use test_helpers::{GRACE, TASK_WAIT, identity_files, run_config, scratch_dir, start_pool};

/// Output sink whose every write fails
struct BrokenPipe;

impl io::Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }
}

fn run_to_string(config: BroodConfig) -> (brood::RunSummary, String) {
    brood::logging::init_test();
    let mut out = Vec::new();
    let summary = Coordinator::new(config).run(&mut out).unwrap();
    (summary, String::from_utf8(out).unwrap())
}

#[test]
fn test_run_writes_one_file_and_line_per_worker() {
    let dir = scratch_dir();

    let (summary, stdout) = run_to_string(run_config(dir.path(), 4));

    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|l| l.ends_with(" SUCCESS")));
    assert_eq!(summary.lines, lines);
    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.failed, 0);
    assert!(summary.shutdown_complete);

    let files = identity_files(dir.path());
    assert_eq!(files.len(), 4);
    for (name, contents) in &files {
        let (prefix, _stamp) = name.split_once('.').unwrap();
        assert_eq!(prefix, contents);
    }

    // Every reported id has its file, and ids are distinct.
    let reported: BTreeSet<_> = lines
        .iter()
        .map(|l| l.split(' ').next().unwrap().to_string())
        .collect();
    let written: BTreeSet<_> = files.into_iter().map(|(_, contents)| contents).collect();
    assert_eq!(reported, written);
}

#[test]
fn test_run_report_is_sorted_by_id() {
    let dir = scratch_dir();

    let (summary, _) = run_to_string(run_config(dir.path(), 6));

    let ids: Vec<i64> = summary
        .lines
        .iter()
        .map(|l| l.split(' ').next().unwrap().parse().unwrap())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[test]
fn test_run_with_more_tasks_than_workers() {
    let dir = scratch_dir();
    let config = BroodConfig {
        task_count: 6,
        ..run_config(dir.path(), 2)
    };

    let (summary, stdout) = run_to_string(config);

    assert_eq!(stdout.lines().count(), 6);
    assert_eq!(summary.succeeded, 6);
    assert!(summary.shutdown_complete);

    // Each worker ran three tasks; every one of them left its own file.
    let files = identity_files(dir.path());
    assert_eq!(files.len(), summary.succeeded);
    for (name, contents) in &files {
        assert!(name.starts_with(&format!("{contents}.")), "{name}: {contents}");
    }
}

#[test]
fn test_run_with_millisecond_naming() {
    let dir = scratch_dir();
    let config = BroodConfig {
        task_count: 5,
        naming: NamingStrategy::EpochMillis,
        ..run_config(dir.path(), 2)
    };

    let (summary, _) = run_to_string(config);

    assert_eq!(summary.succeeded, 5);
    assert_eq!(identity_files(dir.path()).len(), 5);
}

#[test]
fn test_single_failure_among_three() {
    let good_a = scratch_dir();
    let good_b = scratch_dir();
    let missing = good_a.path().join("missing");
    let pool = start_pool(3);

    let handles = vec![
        pool.submit(IdentityFile::new(good_a.path(), NamingStrategy::EpochSeconds)).unwrap(),
        pool.submit(IdentityFile::new(&missing, NamingStrategy::EpochSeconds)).unwrap(),
        pool.submit(IdentityFile::new(good_b.path(), NamingStrategy::EpochSeconds)).unwrap(),
    ];
    let reports = collect(handles, TASK_WAIT);
    let lines = format_report(&reports);

    assert_eq!(lines.len(), 3);
    assert_eq!(lines.iter().filter(|l| l.ends_with(" FAILURE")).count(), 1);
    assert_eq!(lines.iter().filter(|l| l.ends_with(" SUCCESS")).count(), 2);
    assert!(lines.iter().all(|l| !l.starts_with("-1 ")));
    assert!(pool.shutdown(GRACE));
}

#[test]
fn test_report_formatting_matches_console_contract() {
    let reports = [
        TaskReport::new(TaskId::new(10), Status::Success),
        TaskReport::new(TaskId::new(2), Status::Failure),
        TaskReport::new(TaskId::new(7), Status::Success),
    ];
    let mut out = Vec::new();

    emit_report(&format_report(&reports), &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "2 FAILURE\n7 SUCCESS\n10 SUCCESS\n"
    );
}

#[test]
fn test_run_rejects_zero_parallelism() {
    let dir = scratch_dir();
    let mut out = Vec::new();

    let err = Coordinator::new(run_config(dir.path(), 0))
        .run(&mut out)
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Invalid { key: "BROOD_PARALLELISM", .. })
    ));
    assert!(out.is_empty());
}

#[test]
fn test_run_rejects_missing_working_dir() {
    let dir = scratch_dir();
    let missing = dir.path().join("nope");
    let mut out = Vec::new();

    let err = Coordinator::new(run_config(&missing, 2))
        .run(&mut out)
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::MissingWorkingDir(missing))
    );
    assert!(out.is_empty());
}

#[test]
fn test_report_write_failure_still_shuts_pool_down() {
    let dir = scratch_dir();
    let pool = start_pool(2);
    let coordinator = Coordinator::new(run_config(dir.path(), 2));

    let err = coordinator.run_on(&pool, &mut BrokenPipe).unwrap_err();

    assert!(format!("{err:#}").contains("failed to write report"), "{err:#}");
    assert_eq!(
        err.downcast_ref::<io::Error>().map(io::Error::kind),
        Some(io::ErrorKind::BrokenPipe)
    );
    assert_eq!(pool.lifecycle(), Lifecycle::Terminated);
    // The tasks themselves ran to completion before the report was written.
    assert_eq!(identity_files(dir.path()).len(), 2);
}

#[test]
fn test_run_on_shuts_pool_down() {
    let dir = scratch_dir();
    let pool = start_pool(3);
    let mut out = Vec::new();

    let summary = Coordinator::new(run_config(dir.path(), 3))
        .run_on(&pool, &mut out)
        .unwrap();

    assert_eq!(summary.succeeded, 3);
    assert!(summary.shutdown_complete);
    assert_eq!(pool.lifecycle(), Lifecycle::Terminated);
}

#[test]
fn test_run_fails_when_report_cannot_be_written() {
    brood::logging::init_test();
    let dir = scratch_dir();

    let err = Coordinator::new(run_config(dir.path(), 2))
        .run(&mut BrokenPipe)
        .unwrap_err();

    assert!(format!("{err:#}").contains("stdout closed"), "{err:#}");
}
