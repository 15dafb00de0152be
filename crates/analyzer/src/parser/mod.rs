/// Tab-separated log line parsing
///
/// # Architecture
///
/// - `model.rs`: `LogEntry`, field kinds, levels and line diagnostics
/// - `classify.rs`: ordered regex rules guessing a token's field kind
/// - `line.rs`: positional reconciliation of one line into an entry
/// - `metrics.rs`: parsing counters shared across files and requests
///
/// Cross-line state (stack-trace folding) lives in [`crate::stream`].

pub mod classify;
pub mod line;
pub mod metrics;
pub mod model;

// Re-export commonly used types
pub use classify::FieldClassifier;
pub use line::LineParser;
pub use metrics::ParsingMetrics;
pub use model::{FieldKind, LineError, LogEntry, LogLevel, UNKNOWN_LOGGER};

// Constants
pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB
