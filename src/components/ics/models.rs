use crate::error::config_error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single event ready for encoding
///
/// `start` and `end` are ISO-8601 instants for timed events and `YYYY-MM-DD`
/// dates for all-day events, where `end` is the last day (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub title: String,
    pub start: String,
    pub end: String,
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Physical line terminator used in encoded calendars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// RFC 5545 terminator
    #[default]
    Crlf,
    /// Bare newline, for byte compatibility with older encoders
    Lf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

impl FromStr for LineEnding {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crlf" => Ok(LineEnding::Crlf),
            "lf" => Ok(LineEnding::Lf),
            other => Err(config_error(&format!(
                "Invalid line ending '{}', expected 'crlf' or 'lf'",
                other
            ))),
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineEnding::Crlf => write!(f, "crlf"),
            LineEnding::Lf => write!(f, "lf"),
        }
    }
}
