//! Line prefix and banner formatting

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::Severity;

/// Text embedded in the first line of every new log file
pub const START_TEXT: &str = "--- [APPLICATION STARTED] ---";

/// Layout settings for structured lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// Target width of indicator + fill + origin label
    pub label_width: usize,
    /// Character used to pad short origin labels
    pub fill_char: char,
    /// Repetitions of `separator_char` between the header and the message
    pub separator_width: usize,
    pub separator_char: char,
    /// Put a single space on both sides of the separator block
    pub pad_separator: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            label_width: 70,
            fill_char: ' ',
            separator_width: 10,
            separator_char: ' ',
            pad_separator: true,
        }
    }
}

/// Builds prefixes and banners from a [`FormatterConfig`]
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: FormatterConfig,
}

impl Formatter {
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Build the structured prefix for a line
    ///
    /// Labels at least `label_width` characters long are neither padded nor
    /// truncated; they follow the indicator directly.
    pub fn build_prefix(&self, severity: Severity, origin: &str) -> String {
        let indicator = severity.indicator();
        let origin_len = origin.chars().count();

        let mut prefix = String::with_capacity(self.config.label_width + self.separator_len());
        prefix.push_str(indicator);

        if origin_len < self.config.label_width {
            let fill = self
                .config
                .label_width
                .saturating_sub(origin_len)
                .saturating_sub(indicator.chars().count());
            prefix.extend(std::iter::repeat(self.config.fill_char).take(fill));
        }
        prefix.push_str(origin);
        prefix.push_str(&self.separator_block());
        prefix
    }

    /// Block separating the header from the message
    pub fn separator_block(&self) -> String {
        let mut block = String::with_capacity(self.separator_len());
        if self.config.pad_separator {
            block.push(' ');
        }
        block.extend(std::iter::repeat(self.config.separator_char).take(self.config.separator_width));
        if self.config.pad_separator {
            block.push(' ');
        }
        block
    }

    /// Width of [`Formatter::separator_block`] in characters
    pub fn separator_len(&self) -> usize {
        self.config.separator_width + if self.config.pad_separator { 2 } else { 0 }
    }

    /// Banner written as the first line of a freshly opened log file
    pub fn build_start_banner(&self) -> String {
        self.build_start_banner_at(Local::now())
    }

    pub fn build_start_banner_at(&self, now: DateTime<Local>) -> String {
        let ts = line_timestamp(now);
        let approx_width =
            Severity::Info.indicator().len() + self.config.label_width + self.separator_len();
        let dashes = approx_width.saturating_sub(START_TEXT.len() + ts.len() + 2) / 2;
        let padding = "-".repeat(dashes);
        format!("[{}] {}{}{}", ts, padding, START_TEXT, padding)
    }
}

/// Timestamp used inside log lines: `YYYY-MM-DD HH:MM:SS.mmm`
pub fn line_timestamp(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Timestamp used for log file names: `YYYYMMDD_HHMMSS_mmm`
pub fn file_timestamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S_%3f").to_string()
}
