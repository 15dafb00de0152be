//! Filter — field predicates over parsed entries.
//!
//! Substring filters are case-insensitive; the level filter is exact.
//! Empty strings mean "no filter".

use crate::parser::{LogEntry, LogLevel};

#[derive(Debug, Clone)]
pub struct EntryFilter {
    pub timestamp: String,
    pub level: Option<LogLevel>,
    pub logger: String,
    pub file_position: String,
    pub message: String,
    pub details: String,
    pub filename: String,
    pub show_invalid: bool,
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self {
            timestamp: String::new(),
            level: None,
            logger: String::new(),
            file_position: String::new(),
            message: String::new(),
            details: String::new(),
            filename: String::new(),
            show_invalid: true,
        }
    }
}

impl EntryFilter {
    /// True when no predicate would exclude anything.
    pub fn is_empty(&self) -> bool {
        self.show_invalid
            && self.level.is_none()
            && [
                &self.timestamp,
                &self.logger,
                &self.file_position,
                &self.message,
                &self.details,
                &self.filename,
            ]
            .iter()
            .all(|s| s.is_empty())
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if !self.show_invalid && !entry.is_valid {
            return false;
        }
        if self.level.is_some() && entry.level != self.level {
            return false;
        }

        contains(&entry.timestamp, &self.timestamp)
            && contains(&entry.logger, &self.logger)
            && contains(&entry.file_position, &self.file_position)
            && contains(&entry.message, &self.message)
            && contains(&entry.details_json, &self.details)
            && contains(entry.filename.as_deref().unwrap_or(""), &self.filename)
    }

    pub fn apply<'a>(&self, entries: &'a [LogEntry]) -> Vec<&'a LogEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
