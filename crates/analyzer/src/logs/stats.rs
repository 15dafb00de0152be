//! Stats — entry counts per level.

use std::collections::BTreeMap;

use crate::parser::LogEntry;

/// Bucket for entries that did not parse.
pub const INVALID_BUCKET: &str = "INVALID";

/// Count entries by level name, plus an [`INVALID_BUCKET`] for failed lines.
pub fn level_stats<'a, I>(entries: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut stats = BTreeMap::new();
    for entry in entries {
        let bucket = match (entry.is_valid, entry.level) {
            (true, Some(level)) => level.as_str(),
            _ => INVALID_BUCKET,
        };
        *stats.entry(bucket.to_string()).or_insert(0) += 1;
    }
    stats
}
