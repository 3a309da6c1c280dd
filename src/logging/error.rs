//! Error types for the logging destinations

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures inside the logging facility
///
/// None of these reach the caller of `emit`; they are reported as
/// diagnostics and the affected destination is skipped.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to create log directory '{}'", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file '{}'", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write log file '{}'", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write to console")]
    Console(#[source] io::Error),

    #[error("unknown severity '{0}'")]
    UnknownSeverity(String),
}

impl LogError {
    /// Underlying I/O error, if any
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            LogError::CreateDir { source, .. }
            | LogError::OpenFile { source, .. }
            | LogError::WriteFile { source, .. }
            | LogError::Console(source) => Some(source),
            LogError::UnknownSeverity(_) => None,
        }
    }

    /// One-line description for diagnostics, with a friendly I/O category
    pub fn describe(&self) -> String {
        match self.io_error() {
            Some(source) => friendly_io_error_message(source, &self.to_string()),
            None => self.to_string(),
        }
    }
}

/// Categories of disk errors for user-friendly messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskErrorKind {
    /// Disk is full or quota exceeded
    DiskFull,
    /// Permission denied (read or write)
    PermissionDenied,
    /// File or directory not found
    NotFound,
    /// Other IO error
    Other,
}

impl DiskErrorKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            DiskErrorKind::DiskFull => "disk full, further lines will not be saved",
            DiskErrorKind::PermissionDenied => "permission denied for the log directory",
            DiskErrorKind::NotFound => "file or directory not found",
            DiskErrorKind::Other => "I/O error",
        }
    }
}

/// Categorize an IO error into a user-friendly category
pub fn categorize_io_error(e: &io::Error) -> DiskErrorKind {
    use std::io::ErrorKind;

    match e.kind() {
        ErrorKind::WriteZero => DiskErrorKind::DiskFull,
        ErrorKind::PermissionDenied => DiskErrorKind::PermissionDenied,
        ErrorKind::NotFound => DiskErrorKind::NotFound,
        _ => {
            #[cfg(unix)]
            {
                if let Some(os_error) = e.raw_os_error() {
                    // ENOSPC = 28; EDQUOT = 122 on Linux, 69 on macOS
                    if os_error == 28 || os_error == 122 || os_error == 69 {
                        return DiskErrorKind::DiskFull;
                    }
                    // EACCES
                    if os_error == 13 {
                        return DiskErrorKind::PermissionDenied;
                    }
                }
            }
            DiskErrorKind::Other
        }
    }
}

/// Create a user-friendly error message from an IO error
pub fn friendly_io_error_message(e: &io::Error, context: &str) -> String {
    match categorize_io_error(e) {
        DiskErrorKind::Other => format!("{}: {}", context, e),
        kind => format!("{}: {}", context, kind.user_message()),
    }
}
