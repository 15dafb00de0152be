//! Group — buckets entries by a details-JSON key path.
//!
//! Groups are emitted in order of their first entry's timestamp text.
//! Entries keep their input order inside a group.

use std::collections::HashMap;

use serde::Serialize;

use crate::parser::{LogEntry, LogLevel};

use super::keys::details_value;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryGroup {
    pub group_key: String,
    pub key_value: String,
    pub count: usize,
    pub first_entry: LogEntry,
    pub last_entry: LogEntry,
    pub all_entries: Vec<LogEntry>,
    /// Any member logged at ERROR or FATAL
    pub has_errors: bool,
    /// Milliseconds between the first and last member, when both have instants
    pub duration_ms: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grouping {
    pub groups: Vec<EntryGroup>,
    pub ungrouped_entries: Vec<LogEntry>,
    pub total_groups: usize,
    pub total_grouped_entries: usize,
    pub total_ungrouped: usize,
}

pub fn group_by<'a, I>(entries: I, key: &str) -> Grouping
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, Vec<LogEntry>)> = Vec::new();
    let mut ungrouped = Vec::new();

    for entry in entries {
        match details_value(&entry.details_json, key) {
            Some(value) => {
                let slot = *index.entry(value.clone()).or_insert_with(|| {
                    buckets.push((value, Vec::new()));
                    buckets.len() - 1
                });
                buckets[slot].1.push(entry.clone());
            }
            None => ungrouped.push(entry.clone()),
        }
    }

    let mut groups: Vec<EntryGroup> = buckets
        .into_iter()
        .filter_map(|(value, members)| summarize(key, value, members))
        .collect();
    groups.sort_by(|a, b| a.first_entry.timestamp.cmp(&b.first_entry.timestamp));

    let total_grouped_entries = groups.iter().map(|g| g.count).sum();
    Grouping {
        total_groups: groups.len(),
        total_grouped_entries,
        total_ungrouped: ungrouped.len(),
        groups,
        ungrouped_entries: ungrouped,
    }
}

fn summarize(key: &str, value: String, members: Vec<LogEntry>) -> Option<EntryGroup> {
    let first = members.first()?.clone();
    let last = members.last()?.clone();

    let has_errors = members
        .iter()
        .any(|e| matches!(e.level, Some(LogLevel::Error | LogLevel::Fatal)));
    let duration_ms = match (first.time, last.time) {
        (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
        _ => None,
    };

    Some(EntryGroup {
        group_key: key.to_string(),
        key_value: value,
        count: members.len(),
        first_entry: first,
        last_entry: last,
        all_entries: members,
        has_errors,
        duration_ms,
    })
}
