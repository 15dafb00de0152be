//! Order — final presentation order across all sources.
//!
//! Valid entries come first, ascending by instant; invalid entries follow.
//! A valid entry whose timestamp is not a real instant (`time == None`)
//! sorts before every valid entry that has one. The sort is stable, so
//! invalid entries and equal instants keep their arrival order.

use std::cmp::Ordering;

use crate::parser::LogEntry;

pub fn compare(a: &LogEntry, b: &LogEntry) -> Ordering {
    match (a.is_valid, b.is_valid) {
        (false, false) => Ordering::Equal,
        (false, true) => Ordering::Greater,
        (true, false) => Ordering::Less,
        (true, true) => a.time.cmp(&b.time),
    }
}

pub fn order(mut entries: Vec<LogEntry>) -> Vec<LogEntry> {
    entries.sort_by(compare);
    entries
}
