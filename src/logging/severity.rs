//! Severity levels for dispatched lines

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::LogError;

/// Classification of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Debug,
    /// Unstructured output; skips the prefix on console and session
    Raw,
}

impl Severity {
    /// All severities, in declaration order
    pub const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Debug,
        Severity::Raw,
    ];

    /// Short display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "ERR",
            Severity::Debug => "DEBUG",
            Severity::Raw => "RAW",
        }
    }

    /// Indicator placed at the very start of a structured line
    ///
    /// Warning and error indicators are wider on purpose so those lines stand
    /// out in a column of info lines.
    pub fn indicator(&self) -> &'static str {
        match self {
            Severity::Info => "I ",
            Severity::Warning => "W ###",
            Severity::Error => "E ### ###",
            Severity::Debug => "D ",
            Severity::Raw => "R ",
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Severity::Raw)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" | "i" => Ok(Severity::Info),
            "warning" | "warn" | "w" => Ok(Severity::Warning),
            "error" | "err" | "e" => Ok(Severity::Error),
            "debug" | "d" => Ok(Severity::Debug),
            "raw" | "r" => Ok(Severity::Raw),
            _ => Err(LogError::UnknownSeverity(s.to_string())),
        }
    }
}
