//! File destination
//!
//! The log file is opened lazily on the first line that needs persisting,
//! named after the open-time timestamp, and never reopened: a failed open
//! disables the destination for the rest of the process.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, TryLockError};

use chrono::{DateTime, Local};

use super::formatter::{file_timestamp, Formatter};
use super::LogError;

/// Generate a timestamped log file path
pub fn create_log_file_path(logs_dir: &Path, now: DateTime<Local>) -> PathBuf {
    logs_dir.join(format!("{}.log", file_timestamp(now)))
}

/// Lifecycle of the log file
#[derive(Debug)]
enum FileState {
    Unopened,
    Open { file: File, path: PathBuf },
    /// Opening failed; never retried
    Unavailable,
    Closed,
}

/// Outcome of a single file write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileWrite {
    Written,
    /// Destination disabled or already closed
    Skipped,
}

/// Append-only, flush-on-write log file
#[derive(Debug)]
pub struct FileSink {
    logs_dir: PathBuf,
    formatter: Formatter,
    state: Mutex<FileState>,
}

impl FileSink {
    pub fn new(logs_dir: impl Into<PathBuf>, formatter: Formatter) -> Self {
        Self {
            logs_dir: logs_dir.into(),
            formatter,
            state: Mutex::new(FileState::Unopened),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FileState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Open the log file if it is not open yet
    ///
    /// Returns the path of the open file. Calling this again reuses the same
    /// file. Only the call that actually fails to open returns an error.
    pub fn open(&self) -> Result<Option<PathBuf>, LogError> {
        let mut state = self.lock();
        self.open_locked(&mut state)?;
        Ok(match &*state {
            FileState::Open { path, .. } => Some(path.clone()),
            _ => None,
        })
    }

    fn open_locked(&self, state: &mut FileState) -> Result<(), LogError> {
        if !matches!(state, FileState::Unopened) {
            return Ok(());
        }

        match self.create_file() {
            Ok((file, path)) => {
                tracing::debug!(path = %path.display(), "Opened log file");
                *state = FileState::Open { file, path };
                Ok(())
            }
            Err(err) => {
                *state = FileState::Unavailable;
                Err(err)
            }
        }
    }

    fn create_file(&self) -> Result<(File, PathBuf), LogError> {
        fs::create_dir_all(&self.logs_dir).map_err(|source| LogError::CreateDir {
            path: self.logs_dir.clone(),
            source,
        })?;

        let now = Local::now();
        let path = create_log_file_path(&self.logs_dir, now);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogError::OpenFile {
                path: path.clone(),
                source,
            })?;

        writeln!(file, "{}", self.formatter.build_start_banner_at(now))
            .and_then(|_| file.flush())
            .map_err(|source| LogError::WriteFile {
                path: path.clone(),
                source,
            })?;

        Ok((file, path))
    }

    /// Append one line, opening the file first if needed
    pub fn write_line(&self, line: &str) -> Result<FileWrite, LogError> {
        let mut state = self.lock();
        self.open_locked(&mut state)?;

        match &mut *state {
            FileState::Open { file, path } => {
                writeln!(file, "{}", line)
                    .and_then(|_| file.flush())
                    .map_err(|source| LogError::WriteFile {
                        path: path.clone(),
                        source,
                    })?;
                Ok(FileWrite::Written)
            }
            _ => Ok(FileWrite::Skipped),
        }
    }

    /// Path of the open log file, if any
    pub fn path(&self) -> Option<PathBuf> {
        match &*self.lock() {
            FileState::Open { path, .. } => Some(path.clone()),
            _ => None,
        }
    }

    /// Flush the open file without closing it
    ///
    /// No-op while another caller holds the file, so it is safe to call from
    /// a panic hook.
    pub fn flush(&self) -> Result<(), LogError> {
        let mut state = match self.state.try_lock() {
            Ok(state) => state,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Ok(()),
        };
        match &mut *state {
            FileState::Open { file, path } => file.flush().map_err(|source| LogError::WriteFile {
                path: path.clone(),
                source,
            }),
            _ => Ok(()),
        }
    }

    /// Flush and close the file
    ///
    /// Returns `true` only for the call that closed an open file.
    pub fn close(&self) -> bool {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, FileState::Closed) {
            FileState::Open { mut file, path } => {
                if let Err(e) = file.flush() {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to flush log file on close");
                }
                true
            }
            FileState::Unavailable => {
                *state = FileState::Unavailable;
                false
            }
            _ => false,
        }
    }
}
