/// Per-file line streaming
///
/// - `source.rs`: bounded line reader and read failures
/// - `assembler.rs`: stack-trace folding state machine
/// - `batch.rs`: multi-file runs, one assembler per file, ordered output
pub mod assembler;
pub mod batch;
pub mod source;

pub use assembler::{process_lines, StreamAssembler};
pub use batch::{BatchError, ParseBatch};
pub use source::{LineReader, SourceError};
