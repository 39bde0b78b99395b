//! Identity-file unit of work.
//!
//! Each task writes one file named after the worker context that ran it,
//! containing that context's id in decimal, and reports `SUCCESS` only if
//! the file was opened, written and closed cleanly.
//!
//! Files are created exclusively. A worker that runs several tasks within
//! one timestamp tick gets `<id>.<timestamp>.<n>` for the repeats, so every
//! successful task leaves its own file.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use brood_api::{TaskId, TaskReport, UnitOfWork};

use crate::error::{IdentityError, WriteStage};
use crate::log_error;
use crate::pool::{context_id, current_thread_name};

/// Collision suffixes tried before giving up on a name.
const MAX_NAME_ATTEMPTS: usize = 1024;

/// How identity file names avoid colliding across runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NamingStrategy {
    /// `<id>.<epoch-seconds>`
    #[default]
    EpochSeconds,
    /// `<id>.<epoch-millis>`
    EpochMillis,
}

impl NamingStrategy {
    pub fn file_name(self, id: TaskId, now: SystemTime) -> String {
        // Clocks before the epoch collapse to 0 rather than failing the task.
        let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();
        match self {
            NamingStrategy::EpochSeconds => format!("{}.{}", id, since_epoch.as_secs()),
            NamingStrategy::EpochMillis => format!("{}.{}", id, since_epoch.as_millis()),
        }
    }
}

impl FromStr for NamingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "seconds" | "epoch-seconds" => Ok(NamingStrategy::EpochSeconds),
            "millis" | "epoch-millis" => Ok(NamingStrategy::EpochMillis),
            other => Err(format!("expected `seconds` or `millis`, got `{other}`")),
        }
    }
}

impl fmt::Display for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingStrategy::EpochSeconds => f.write_str("seconds"),
            NamingStrategy::EpochMillis => f.write_str("millis"),
        }
    }
}

/// Writes `<working_dir>/<id>.<timestamp>` containing the worker's id.
#[derive(Clone, Debug)]
pub struct IdentityFile {
    working_dir: PathBuf,
    naming: NamingStrategy,
}

impl IdentityFile {
    pub fn new(working_dir: impl Into<PathBuf>, naming: NamingStrategy) -> Self {
        Self {
            working_dir: working_dir.into(),
            naming,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Path of the file a task with `id` writes at time `now`.
    pub fn target_path(&self, id: TaskId, now: SystemTime) -> PathBuf {
        self.working_dir.join(self.naming.file_name(id, now))
    }

    /// Path tried on the `attempt`-th collision; attempt 0 is
    /// [`target_path`](Self::target_path).
    pub fn candidate_path(&self, id: TaskId, now: SystemTime, attempt: usize) -> PathBuf {
        let name = self.naming.file_name(id, now);
        match attempt {
            0 => self.working_dir.join(name),
            n => self.working_dir.join(format!("{name}.{n}")),
        }
    }

    /// Write the identity file for `id`, returning its path.
    ///
    /// Never overwrites an existing file. The file handle is released on
    /// every path out of this function.
    pub fn write(&self, id: TaskId) -> Result<PathBuf, IdentityError> {
        let (file, path) = self.create_exclusive(id, SystemTime::now())?;

        let mut writer = BufWriter::new(file);
        write!(writer, "{}", id).map_err(|e| IdentityError::new(WriteStage::Write, &path, e))?;

        let file: File = writer
            .into_inner()
            .map_err(|e| IdentityError::new(WriteStage::Close, &path, e.into_error()))?;
        file.sync_all()
            .map_err(|e| IdentityError::new(WriteStage::Close, &path, e))?;

        Ok(path)
    }

    fn create_exclusive(
        &self,
        id: TaskId,
        now: SystemTime,
    ) -> Result<(File, PathBuf), IdentityError> {
        let mut attempt = 0;
        loop {
            let path = self.candidate_path(id, now, attempt);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((file, path)),
                Err(e)
                    if e.kind() == io::ErrorKind::AlreadyExists
                        && attempt + 1 < MAX_NAME_ATTEMPTS =>
                {
                    attempt += 1;
                }
                Err(e) => return Err(IdentityError::new(WriteStage::Open, &path, e)),
            }
        }
    }
}

impl UnitOfWork for IdentityFile {
    type Output = TaskReport;

    fn run(self) -> TaskReport {
        let id = context_id();
        match self.write(id) {
            Ok(_) => TaskReport::success(id),
            Err(error) => {
                log_error!(
                    error,
                    worker = %current_thread_name(),
                    "failed to write identity file"
                );
                TaskReport::failure(id)
            }
        }
    }
}
