//! routelog - process-wide log dispatcher
//!
//! Formats diagnostic lines once and routes them to the console, an
//! append-only log file and an in-memory session buffer, under per-call
//! routing control.

pub mod config;
pub mod http;
pub mod logging;
