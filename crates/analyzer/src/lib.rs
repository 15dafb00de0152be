// Module structure for the tab-separated log analyzer.

// Core
pub mod parser;
pub mod stream;

// Querying
pub mod logs;

// Process setup
pub mod conf;
pub mod runtime;

pub use parser::{LogEntry, LogLevel};
pub use stream::{ParseBatch, StreamAssembler};
