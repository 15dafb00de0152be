//! Line — turns one tab-separated line into a [`LogEntry`].
//!
//! Tokens are checked against the positional template
//! `timestamp, level, logger, file_position, message, details_json`.
//! Two deviations are tolerated:
//!
//! - A file position where the logger is expected means the logger was
//!   omitted. A placeholder is inserted and every later slot shifts by one.
//! - A second timestamp-shaped token is dropped. The positional index is
//!   *not* shifted for it, so a duplicate early in the line desynchronises
//!   the remaining expectations.

use chrono::{DateTime, Utc};

use super::classify::FieldClassifier;
use super::model::{FieldKind, LineError, LogEntry, UNKNOWN_LOGGER};

/// Minimum number of tab-separated parts before positional checks run.
pub const MIN_FIELDS: usize = 4;

/// Number of accepted tokens needed to fill every required field.
pub const REQUIRED_FIELDS: usize = 5;

pub struct LineParser {
    classifier: &'static FieldClassifier,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            classifier: FieldClassifier::shared(),
        }
    }

    /// Parse a single line. Never fails: problems are reported on the
    /// returned entry.
    pub fn parse_line(&self, line: &str) -> LogEntry {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < MIN_FIELDS {
            return LogEntry::invalid(
                line,
                &[LineError::FieldCount {
                    found: parts.len(),
                    min: MIN_FIELDS,
                }],
            );
        }

        let mut accepted: Vec<&str> = Vec::with_capacity(parts.len() + 1);
        let mut errors: Vec<LineError> = Vec::new();
        let mut adjustment = 0usize;
        let mut timestamp_seen = false;

        for (i, part) in parts.iter().copied().enumerate() {
            let kind = self.classifier.classify(part);

            if kind == Some(FieldKind::Timestamp) && timestamp_seen {
                tracing::trace!(position = i, "dropping duplicate timestamp token");
                continue;
            }

            let expected = FieldKind::expected_at(i + adjustment);

            if expected.is_some_and(|k| k.is_free_text()) {
                accept(&mut accepted, &mut timestamp_seen, part, kind);
                continue;
            }

            if kind != expected {
                if expected == Some(FieldKind::Logger) && kind == Some(FieldKind::FilePosition) {
                    accepted.push(UNKNOWN_LOGGER);
                    accepted.push(part);
                    adjustment += 1;
                    continue;
                }
                errors.push(LineError::FieldMismatch {
                    position: i,
                    token: part.to_string(),
                    expected,
                    actual: kind,
                });
                continue;
            }

            accept(&mut accepted, &mut timestamp_seen, part, kind);
        }

        if errors.is_empty() && accepted.len() < REQUIRED_FIELDS {
            errors.push(LineError::MissingMessage {
                accepted: accepted.len(),
            });
        }

        if !errors.is_empty() {
            return LogEntry::invalid(line, &errors);
        }

        let timestamp = accepted[0];
        LogEntry {
            raw: line.to_string(),
            timestamp: timestamp.to_string(),
            level: accepted[1].parse().ok(),
            logger: accepted[2].to_string(),
            file_position: accepted[3].to_string(),
            message: accepted[4].to_string(),
            details_json: accepted.get(5).map(|s| s.to_string()).unwrap_or_default(),
            is_valid: true,
            parse_error: String::new(),
            stack_trace: Vec::new(),
            time: parse_instant(timestamp),
            filename: None,
        }
    }
}

fn accept<'a>(
    accepted: &mut Vec<&'a str>,
    timestamp_seen: &mut bool,
    part: &'a str,
    kind: Option<FieldKind>,
) {
    if kind == Some(FieldKind::Timestamp) {
        *timestamp_seen = true;
    }
    accepted.push(part);
}

/// Parse a timestamp token into a UTC instant.
///
/// Accepts RFC 3339 (`Z`, `+05:30`) and the compact numeric offset form
/// (`+0530`). Returns `None` for shapes that are not real instants.
pub fn parse_instant(token: &str) -> Option<DateTime<Utc>> {
    let token = token.trim();
    DateTime::parse_from_rfc3339(token)
        .or_else(|_| DateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
