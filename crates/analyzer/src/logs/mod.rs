//! Logs module — ordering and querying of parsed entries.

pub mod filter;
pub mod group;
pub mod keys;
pub mod order;
pub mod page;
pub mod stats;

pub use filter::EntryFilter;
pub use group::{group_by, EntryGroup, Grouping};
pub use keys::all_keys;
pub use order::order;
pub use page::{Page, PageRequest, Pagination};
pub use stats::level_stats;
