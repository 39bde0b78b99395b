//! # Coordinator
//!
//! Runs one full pass: build the pool, submit the identity-file tasks,
//! collect their reports, print the sorted report, shut the pool down.
//!
//! Task failures never abort a run; they show up as `FAILURE` lines. Only
//! setup problems (bad configuration, a thread that cannot be spawned, a
//! report that cannot be written) come back as errors.

use std::io::Write;

use anyhow::Context;
use brood_api::TaskReport;
use tracing::{error, info, info_span};
use uuid::Uuid;

use crate::collector;
use crate::config::BroodConfig;
use crate::identity::IdentityFile;
use crate::pool::WorkerPool;
use crate::report;

pub const SYSTEM_FAILURE_MSG: &str =
    "System failed to complete execution of all workers in the pool";

/// Outcome of a coordinator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Rendered report lines, sorted by id
    pub lines: Vec<String>,
    pub succeeded: usize,
    pub failed: usize,
    /// Whether every worker drained within the grace period
    pub shutdown_complete: bool,
}

impl RunSummary {
    fn from_reports(reports: &[TaskReport], lines: Vec<String>, shutdown_complete: bool) -> Self {
        let succeeded = reports.iter().filter(|r| r.status().is_success()).count();
        Self {
            lines,
            succeeded,
            failed: reports.len() - succeeded,
            shutdown_complete,
        }
    }
}

/// Wires pool, collector and report together for one run.
#[derive(Debug, Clone)]
pub struct Coordinator {
    config: BroodConfig,
}

impl Coordinator {
    pub fn new(config: BroodConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BroodConfig {
        &self.config
    }

    /// Run the full build -> submit -> collect -> report -> shutdown pass,
    /// writing the report to `out`.
    pub fn run<W: Write>(&self, out: &mut W) -> anyhow::Result<RunSummary> {
        let config = &self.config;
        config.validate().context("invalid configuration")?;

        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);
        let _enter = span.enter();

        let pool = WorkerPool::new(config.pool_config()).context("failed to start worker pool")?;
        self.run_on(&pool, out)
    }

    /// Submit, collect, report and shut down on an already started pool.
    ///
    /// The pool is always shut down before this returns, including when the
    /// report cannot be written.
    pub fn run_on<W: Write>(&self, pool: &WorkerPool, out: &mut W) -> anyhow::Result<RunSummary> {
        let config = &self.config;
        info!(
            workers = pool.parallelism(),
            tasks = config.task_count,
            working_dir = %config.working_dir.display(),
            "run started"
        );

        let unit = IdentityFile::new(&config.working_dir, config.naming);
        let mut handles = Vec::with_capacity(config.task_count);
        for _ in 0..config.task_count {
            match pool.submit(unit.clone()) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    self.shutdown(pool);
                    return Err(e).context("failed to submit task");
                }
            }
        }

        let reports = collector::collect(handles, config.task_timeout);
        let lines = report::format_report(&reports);
        let emitted = report::emit_report(&lines, out);

        let shutdown_complete = self.shutdown(pool);
        emitted.context("failed to write report")?;

        let summary = RunSummary::from_reports(&reports, lines, shutdown_complete);
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            shutdown_complete,
            "run finished"
        );
        Ok(summary)
    }

    fn shutdown(&self, pool: &WorkerPool) -> bool {
        let grace = self.config.shutdown_timeout;
        let complete = pool.shutdown(grace);
        if !complete {
            error!(grace_ms = grace.as_millis() as u64, "{}", SYSTEM_FAILURE_MSG);
        }
        complete
    }
}
