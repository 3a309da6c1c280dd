//! Logging facility
//!
//! A [`Dispatcher`] formats each line once and routes it to up to three
//! destinations: the console, an append-only log file and an in-memory
//! session buffer. Which destinations fire is decided per call by a
//! [`Routes`] set, bounded by the dispatcher's floor and ceiling.

mod buffer;
mod console;
mod convenience;
mod diagnostics;
mod dispatcher;
mod error;
mod file_writer;
mod formatter;
mod interpolate;
mod lifetime;
mod routes;
mod severity;

pub use buffer::SessionBuffer;
#[cfg(test)]
pub(crate) use console::CapturedOutput;
pub use console::Console;
pub use convenience::{log_formatted, origin_label, UNKNOWN_ORIGIN};
pub use diagnostics::{init_diagnostics, DEFAULT_DIAGNOSTICS_FILTER};
pub use dispatcher::{Dispatcher, DispatcherSettings, RAW_END, RAW_ORIGIN, RAW_START};
pub use error::{categorize_io_error, friendly_io_error_message, DiskErrorKind, LogError};
pub use file_writer::{create_log_file_path, FileSink, FileWrite};
pub use formatter::{file_timestamp, line_timestamp, Formatter, FormatterConfig, START_TEXT};
pub use interpolate::{interpolate, safe_format, Arg, FormatError, NON_STRING_TEMPLATE_MARKER};
pub use lifetime::{LifetimeTrace, LIFETIME_ROUTES};
pub use routes::{Destination, Routes};
pub use severity::Severity;
