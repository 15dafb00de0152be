use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder logger emitted when a line omits its logger field.
pub const UNKNOWN_LOGGER: &str = "unknown logger";

/// Semantic role a tab-separated token plays in a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Timestamp,
    Level,
    Logger,
    FilePosition,
    Message,
    DetailsJson,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Timestamp => "timestamp",
            FieldKind::Level => "level",
            FieldKind::Logger => "logger",
            FieldKind::FilePosition => "file_position",
            FieldKind::Message => "message",
            FieldKind::DetailsJson => "details_json",
        }
    }

    /// Positional template: the kind expected at slot `position` of a line.
    pub fn expected_at(position: usize) -> Option<FieldKind> {
        match position {
            0 => Some(FieldKind::Timestamp),
            1 => Some(FieldKind::Level),
            2 => Some(FieldKind::Logger),
            3 => Some(FieldKind::FilePosition),
            4 => Some(FieldKind::Message),
            5 => Some(FieldKind::DetailsJson),
            _ => None,
        }
    }

    /// Free-text slots are accepted without cross-checking the classifier.
    pub fn is_free_text(&self) -> bool {
        matches!(self, FieldKind::Message | FieldKind::DetailsJson)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity vocabulary of the tab-separated log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level: {0}")]
pub struct UnknownLevel(pub String);

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    /// Exact match after trimming; the vocabulary is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == trimmed)
            .ok_or_else(|| UnknownLevel(trimmed.to_string()))
    }
}

/// Diagnostics recorded against a line that failed to parse.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LineError {
    #[error("invalid number of fields: expected at least {min}, found {found}")]
    FieldCount { found: usize, min: usize },

    #[error(
        "field type mismatch at position {position}, part: {token:?}, expected type: {}, determined type: {}",
        kind_name(.expected),
        kind_name(.actual)
    )]
    FieldMismatch {
        position: usize,
        token: String,
        expected: Option<FieldKind>,
        actual: Option<FieldKind>,
    },

    #[error("missing message field: only {accepted} fields accepted")]
    MissingMessage { accepted: usize },
}

/// One logical log event, or one line that could not be parsed.
///
/// Valid entries have every required field populated and an empty
/// `parse_error`. Invalid entries keep the original line in `raw` and the
/// accumulated diagnostics in `parse_error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Original line text (always preserved)
    pub raw: String,

    /// Timestamp token exactly as it appeared in the line
    pub timestamp: String,

    pub level: Option<LogLevel>,

    /// Dotted logger name, or [`UNKNOWN_LOGGER`] when recovered
    pub logger: String,

    /// `<path>:<line>` source location
    pub file_position: String,

    pub message: String,

    #[serde(rename = "detailsJSON")]
    pub details_json: String,

    pub is_valid: bool,

    pub parse_error: String,

    /// Continuation lines folded into this entry
    pub stack_trace: Vec<String>,

    /// Instant parsed from `timestamp`; `None` when the value is not a real
    /// calendar instant even though its shape matched
    pub time: Option<DateTime<Utc>>,

    /// Source label, passed through untouched
    pub filename: Option<String>,
}

impl LogEntry {
    /// A failed line with its diagnostics. `errors` must not be empty: an
    /// invalid entry always explains itself through `parse_error`.
    pub fn invalid(raw: impl Into<String>, errors: &[LineError]) -> Self {
        debug_assert!(!errors.is_empty(), "invalid entry without a diagnostic");
        Self {
            raw: raw.into(),
            timestamp: String::new(),
            level: None,
            logger: String::new(),
            file_position: String::new(),
            message: String::new(),
            details_json: String::new(),
            is_valid: false,
            parse_error: join_errors(errors),
            stack_trace: Vec::new(),
            time: None,
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename;
        self
    }

    pub fn is_error(&self) -> bool {
        self.is_valid && self.level == Some(LogLevel::Error)
    }

    /// Number of input lines this entry accounts for.
    pub fn line_count(&self) -> usize {
        1 + self.stack_trace.len()
    }
}

fn kind_name(kind: &Option<FieldKind>) -> &'static str {
    kind.map(|k| k.as_str()).unwrap_or("none")
}

fn join_errors(errors: &[LineError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
