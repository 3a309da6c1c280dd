//! The dispatcher: routing, rendering and destination ownership
//!
//! A [`Dispatcher`] is built once at startup and shared through an `Arc`.
//! It is the only owner of the console writer, the log file and the session
//! buffer, so every mutation of those goes through [`Dispatcher::emit`].

use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

use chrono::Local;

use super::buffer::SessionBuffer;
use super::console::Console;
use super::file_writer::FileSink;
use super::formatter::{line_timestamp, Formatter, FormatterConfig};
use super::routes::{Destination, Routes};
use super::Severity;

/// Opening delimiter of a raw block in the log file
pub const RAW_START: &str = "<<START RAW>>";
/// Closing delimiter of a raw block in the log file
pub const RAW_END: &str = "<<END RAW>>";
/// Origin used for raw blocks saved without an origin label
pub const RAW_ORIGIN: &str = "raw_log";

/// Settings fixed for the lifetime of a dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherSettings {
    /// Directory receiving the log file
    pub output_dir: PathBuf,
    pub formatter: FormatterConfig,
    /// Upper bound on the destinations any call may reach
    pub ceiling: Routes,
    /// Destinations added to every call before the ceiling applies
    pub floor: Routes,
    /// Whether [`LifetimeTrace`](super::LifetimeTrace) guards log anything
    pub display_object_lifetime: bool,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("logs/"),
            formatter: FormatterConfig::default(),
            ceiling: Routes::ALL,
            floor: Routes::NONE,
            display_object_lifetime: true,
        }
    }
}

/// Process-wide log dispatcher
#[derive(Debug)]
pub struct Dispatcher {
    formatter: Formatter,
    ceiling: Routes,
    floor: Routes,
    display_object_lifetime: bool,
    console: Console,
    file: FileSink,
    session: SessionBuffer,
}

impl Dispatcher {
    /// Create a dispatcher printing to standard output
    pub fn new(settings: DispatcherSettings) -> Self {
        Self::with_console(settings, Console::stdout())
    }

    /// Create a dispatcher printing to the given console
    pub fn with_console(settings: DispatcherSettings, console: Console) -> Self {
        let formatter = Formatter::new(settings.formatter);
        Self {
            file: FileSink::new(settings.output_dir, formatter.clone()),
            formatter,
            ceiling: settings.ceiling,
            floor: settings.floor,
            display_object_lifetime: settings.display_object_lifetime,
            console,
            session: SessionBuffer::new(),
        }
    }

    /// Create a dispatcher ready to be shared across the process
    pub fn shared(settings: DispatcherSettings) -> Arc<Self> {
        Arc::new(Self::new(settings))
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    pub fn ceiling(&self) -> Routes {
        self.ceiling
    }

    pub fn floor(&self) -> Routes {
        self.floor
    }

    pub fn display_object_lifetime(&self) -> bool {
        self.display_object_lifetime
    }

    /// Destinations a call requesting `requested` will actually reach
    pub fn effective_routes(&self, requested: Routes) -> Routes {
        requested.union(self.floor).intersection(self.ceiling)
    }

    /// Render a line and deliver it to every permitted destination
    ///
    /// Never fails: a destination that errors is reported through `tracing`
    /// and skipped while the others still receive the line.
    pub fn emit(&self, severity: Severity, origin: &str, message: &str, routes: Routes) {
        let effective = self.effective_routes(routes);
        if effective.is_empty() {
            return;
        }

        if severity.is_raw() {
            self.emit_raw(origin, message, effective);
            return;
        }

        let line = format!("{}{}", self.formatter.build_prefix(severity, origin), message);

        if effective.contains(Destination::Print) {
            self.print(&format!("{}\n", line));
        }
        if effective.contains(Destination::Save) {
            self.save(&format!("[{}] {}", line_timestamp(Local::now()), line));
        }
        if effective.contains(Destination::Session) {
            self.session.push(format!("{}\n", line));
        }
    }

    fn emit_raw(&self, origin: &str, message: &str, effective: Routes) {
        if effective.contains(Destination::Print) {
            self.print(message);
        }
        if effective.contains(Destination::Save) {
            let origin = if origin.is_empty() { RAW_ORIGIN } else { origin };
            self.save(&format!(
                "[{}] {}\n{}\n{}\n{}",
                line_timestamp(Local::now()),
                self.formatter.build_prefix(Severity::Raw, origin),
                RAW_START,
                message,
                RAW_END
            ));
        }
        if effective.contains(Destination::Session) {
            self.session.push(message.to_string());
        }
    }

    fn print(&self, text: &str) {
        if let Err(err) = self.console.write(text) {
            tracing::warn!("{}", err.describe());
        }
    }

    fn save(&self, text: &str) {
        if let Err(err) = self.file.write_line(text) {
            tracing::error!("{}", err.describe());
        }
    }

    pub fn info(&self, origin: &str, message: &str) {
        self.emit(Severity::Info, origin, message, Routes::ALL);
    }

    pub fn warning(&self, origin: &str, message: &str) {
        self.emit(Severity::Warning, origin, message, Routes::ALL);
    }

    pub fn error(&self, origin: &str, message: &str) {
        self.emit(Severity::Error, origin, message, Routes::ALL);
    }

    pub fn debug(&self, origin: &str, message: &str) {
        self.emit(Severity::Debug, origin, message, Routes::ALL);
    }

    pub fn raw(&self, origin: &str, message: &str) {
        self.emit(Severity::Raw, origin, message, Routes::ALL);
    }

    pub fn info_with(&self, origin: &str, message: &str, routes: Routes) {
        self.emit(Severity::Info, origin, message, routes);
    }

    pub fn warning_with(&self, origin: &str, message: &str, routes: Routes) {
        self.emit(Severity::Warning, origin, message, routes);
    }

    pub fn error_with(&self, origin: &str, message: &str, routes: Routes) {
        self.emit(Severity::Error, origin, message, routes);
    }

    pub fn debug_with(&self, origin: &str, message: &str, routes: Routes) {
        self.emit(Severity::Debug, origin, message, routes);
    }

    pub fn raw_with(&self, origin: &str, message: &str, routes: Routes) {
        self.emit(Severity::Raw, origin, message, routes);
    }

    /// Everything routed to the session so far, in order
    pub fn session_contents(&self) -> String {
        self.session.snapshot()
    }

    pub fn session_len(&self) -> usize {
        self.session.len()
    }

    /// Path of the log file once it has been opened
    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.file.path()
    }

    /// Open the log file ahead of the first saved line
    ///
    /// Repeated calls reuse the already open file.
    pub fn open_log_file(&self) -> Option<PathBuf> {
        match self.file.open() {
            Ok(path) => path,
            Err(err) => {
                tracing::error!("{}", err.describe());
                None
            }
        }
    }

    /// Flush and close the log file; later saves are skipped
    ///
    /// Safe to call more than once. Also runs when the dispatcher is dropped.
    pub fn shutdown(&self) {
        if self.file.close() {
            tracing::debug!("Log file closed");
        }
    }

    /// Flush the log file when any thread panics
    ///
    /// The file stays open: a panic caught by `join` or by the runtime does
    /// not end logging. The previous panic hook still runs first. The hook
    /// only holds a weak reference, so it does not keep the dispatcher alive.
    pub fn flush_on_panic(self: &Arc<Self>) {
        let dispatcher: Weak<Self> = Arc::downgrade(self);
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            previous(info);
            if let Some(dispatcher) = dispatcher.upgrade() {
                if let Err(err) = dispatcher.file.flush() {
                    tracing::error!("{}", err.describe());
                }
            }
        }));
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
