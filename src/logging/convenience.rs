//! Per-severity logging macros
//!
//! ```ignore
//! use routelog::{log_info, log_warning, logging::Routes};
//!
//! fn handle_login(dispatcher: &routelog::logging::Dispatcher, user: &str) {
//!     log_info!(dispatcher, "login attempt for %s", user);
//!     log_warning!(dispatcher, routes = Routes::PRINT, "slow response: %.1f ms", 812.4);
//! }
//! ```
//!
//! The origin label is the name of the function containing the macro call,
//! captured at compile time. Interpolation never fails; see
//! [`safe_format`](super::safe_format).

use super::{safe_format, Arg, Dispatcher, Routes, Severity};

/// Origin used when no function name can be recovered
pub const UNKNOWN_ORIGIN: &str = "unknown";

/// Reduce the type path of a marker fn to the name of its enclosing function
///
/// `app::server::handle_login::__marker` becomes `handle_login`; closure
/// segments are skipped.
pub fn origin_label(marker_path: &str) -> &str {
    marker_path
        .rsplit("::")
        .skip(1)
        .find(|segment| !segment.is_empty() && *segment != "{{closure}}")
        .unwrap_or(UNKNOWN_ORIGIN)
}

/// Interpolate, emit and hand back the final message
pub fn log_formatted(
    dispatcher: &Dispatcher,
    severity: Severity,
    origin: &str,
    template: impl Into<Arg>,
    args: &[Arg],
    routes: Routes,
) -> String {
    let message = safe_format(&template.into(), args);
    dispatcher.emit(severity, origin, &message, routes);
    message
}

/// Name of the enclosing function
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __marker() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::logging::origin_label(type_name_of(__marker))
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_with_severity {
    ($severity:ident, $dispatcher:expr, routes = $routes:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::logging::log_formatted(
            &$dispatcher,
            $crate::logging::Severity::$severity,
            $crate::function_name!(),
            $template,
            &[$($crate::logging::Arg::from($arg)),*],
            $routes,
        )
    };
    ($severity:ident, $dispatcher:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::logging::log_formatted(
            &$dispatcher,
            $crate::logging::Severity::$severity,
            $crate::function_name!(),
            $template,
            &[$($crate::logging::Arg::from($arg)),*],
            $crate::logging::Routes::ALL,
        )
    };
}

/// Log an info line; evaluates to the final message
#[macro_export]
macro_rules! log_info {
    ($($tokens:tt)*) => {
        $crate::__log_with_severity!(Info, $($tokens)*)
    };
}

/// Log a warning line; evaluates to the final message
#[macro_export]
macro_rules! log_warning {
    ($($tokens:tt)*) => {
        $crate::__log_with_severity!(Warning, $($tokens)*)
    };
}

/// Log an error line; evaluates to the final message
#[macro_export]
macro_rules! log_error {
    ($($tokens:tt)*) => {
        $crate::__log_with_severity!(Error, $($tokens)*)
    };
}

/// Log a debug line; evaluates to the final message
#[macro_export]
macro_rules! log_debug {
    ($($tokens:tt)*) => {
        $crate::__log_with_severity!(Debug, $($tokens)*)
    };
}

/// Log raw output; evaluates to the final message
#[macro_export]
macro_rules! log_raw {
    ($($tokens:tt)*) => {
        $crate::__log_with_severity!(Raw, $($tokens)*)
    };
}
