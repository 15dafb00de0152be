use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

/// Read failure categories for metrics recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFailure {
    /// Underlying I/O error from the line source
    Io,
    /// Line exceeded the configured maximum length
    TooLarge,
}

/// A wrapper that forces the wrapped data onto its own cache line(s).
///
/// Counter groups are updated from different request tasks in the server;
/// keeping each group on a separate 64-byte line avoids false sharing.
#[repr(align(64))]
#[derive(Debug, Default)]
pub struct CacheAligned<T>(pub T);

/// Per-line outcome counters (hottest path - updated per input line)
#[derive(Debug, Default)]
pub struct LineMetrics {
    pub read: AtomicU64,
    pub blank: AtomicU64,
    pub valid: AtomicU64,
    pub invalid: AtomicU64,
    pub continuation: AtomicU64,
}

/// Tolerated irregularities on otherwise valid lines
#[derive(Debug, Default)]
pub struct RecoveryMetrics {
    pub logger_recovered: AtomicU64,
    pub unparsed_timestamps: AtomicU64,
}

/// File-level counters
#[derive(Debug, Default)]
pub struct SourceMetrics {
    pub files: AtomicU64,
    pub io_errors: AtomicU64,
    pub too_large: AtomicU64,
}

/// Metrics for parsing operations.
///
/// All operations use `Ordering::Relaxed`; `snapshot()` reads are not atomic
/// across fields, which is acceptable for observability counters.
#[derive(Debug, Default)]
pub struct ParsingMetrics {
    pub lines: CacheAligned<LineMetrics>,
    pub recovery: CacheAligned<RecoveryMetrics>,
    pub sources: CacheAligned<SourceMetrics>,
}

/// How a single non-blank line was accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Valid,
    Invalid,
    Continuation,
}

impl ParsingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_blank(&self) {
        self.lines.0.read.fetch_add(1, Ordering::Relaxed);
        self.lines.0.blank.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_line(&self, outcome: LineOutcome) {
        self.lines.0.read.fetch_add(1, Ordering::Relaxed);
        match outcome {
            LineOutcome::Valid => self.lines.0.valid.fetch_add(1, Ordering::Relaxed),
            LineOutcome::Invalid => self.lines.0.invalid.fetch_add(1, Ordering::Relaxed),
            LineOutcome::Continuation => self.lines.0.continuation.fetch_add(1, Ordering::Relaxed),
        };
    }

    #[inline]
    pub fn record_logger_recovered(&self) {
        self.recovery.0.logger_recovered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_unparsed_timestamp(&self) {
        self.recovery.0.unparsed_timestamps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file(&self) {
        self.sources.0.files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read_failure(&self, failure: ReadFailure) {
        match failure {
            ReadFailure::Io => self.sources.0.io_errors.fetch_add(1, Ordering::Relaxed),
            ReadFailure::TooLarge => self.sources.0.too_large.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Read the current counters into a serializable struct.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let valid = self.lines.0.valid.load(Ordering::Relaxed);
        let invalid = self.lines.0.invalid.load(Ordering::Relaxed);
        let continuation = self.lines.0.continuation.load(Ordering::Relaxed);
        let parsed = valid + invalid + continuation;

        MetricsSnapshot {
            lines_read: self.lines.0.read.load(Ordering::Relaxed),
            blank_lines: self.lines.0.blank.load(Ordering::Relaxed),
            valid_entries: valid,
            invalid_entries: invalid,
            continuation_lines: continuation,
            loggers_recovered: self.recovery.0.logger_recovered.load(Ordering::Relaxed),
            unparsed_timestamps: self.recovery.0.unparsed_timestamps.load(Ordering::Relaxed),
            files: self.sources.0.files.load(Ordering::Relaxed),
            io_errors: self.sources.0.io_errors.load(Ordering::Relaxed),
            lines_too_large: self.sources.0.too_large.load(Ordering::Relaxed),
            valid_rate: if parsed > 0 {
                valid as f64 / parsed as f64
            } else {
                1.0
            },
        }
    }
}

/// A read-only snapshot of parsing metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    // Lines
    pub lines_read: u64,
    pub blank_lines: u64,
    pub valid_entries: u64,
    pub invalid_entries: u64,
    pub continuation_lines: u64,

    // Recovery
    pub loggers_recovered: u64,
    pub unparsed_timestamps: u64,

    // Sources
    pub files: u64,
    pub io_errors: u64,
    pub lines_too_large: u64,

    /// Share of non-blank lines that parsed as valid entries
    pub valid_rate: f64,
}
