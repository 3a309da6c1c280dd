//! HTTP surface
//!
//! Lets other processes read the session buffer and push lines into the
//! dispatcher. Everything here is a thin caller of the logging facility.

pub mod server;

pub use server::{router, start, ServerHandle};

use serde::{Deserialize, Serialize};

use crate::logging::Routes;

/// Origin label used when a request does not name one
pub const DEFAULT_HTTP_ORIGIN: &str = "http";

/// Body of `POST /log`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRequest {
    /// Severity name, e.g. "info" or "warn"
    pub severity: String,

    /// Origin label; defaults to [`DEFAULT_HTTP_ORIGIN`]
    #[serde(default)]
    pub origin: Option<String>,

    pub message: String,

    /// Requested destinations; defaults to all
    #[serde(default)]
    pub routes: Option<Routes>,
}

impl LogRequest {
    pub fn origin(&self) -> &str {
        self.origin
            .as_deref()
            .filter(|o| !o.is_empty())
            .unwrap_or(DEFAULT_HTTP_ORIGIN)
    }

    pub fn routes(&self) -> Routes {
        self.routes.unwrap_or(Routes::ALL)
    }
}

/// JSON reply for `POST /log`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            details: None,
        }
    }

    pub fn error(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
            details: Some(details.into()),
        }
    }
}
