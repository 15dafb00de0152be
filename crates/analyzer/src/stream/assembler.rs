//! Assembler — folds a file's line stream into entries.
//!
//! A valid `ERROR` entry arms continuation mode: every unparsable line that
//! follows is appended to that entry's stack trace until the next valid line
//! resets (or re-arms) the flag. In idle mode an unparsable line becomes a
//! standalone invalid entry. Blank lines are skipped.
//!
//! State is scoped to one source. Use a fresh assembler per file.

use std::io::BufRead;
use std::sync::Arc;

use crate::parser::metrics::{LineOutcome, ReadFailure};
use crate::parser::{LineParser, LogEntry, LogLevel, ParsingMetrics, UNKNOWN_LOGGER};

use super::source::{LineReader, SourceError};

pub struct StreamAssembler {
    parser: LineParser,
    filename: Option<String>,
    error_hit: bool,
    entries: Vec<LogEntry>,
    metrics: Option<Arc<ParsingMetrics>>,
}

impl StreamAssembler {
    pub fn new(filename: Option<String>) -> Self {
        Self {
            parser: LineParser::new(),
            filename,
            error_hit: false,
            entries: Vec::new(),
            metrics: None,
        }
    }

    /// Record line outcomes into a shared metrics instance.
    pub fn with_metrics(mut self, metrics: Arc<ParsingMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// True while unparsable lines are being folded into the last entry.
    pub fn is_armed(&self) -> bool {
        self.error_hit
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Feed one line. Returns `None` for blank lines, which are dropped.
    pub fn push_line(&mut self, line: &str) -> Option<LineOutcome> {
        if line.trim().is_empty() {
            if let Some(m) = &self.metrics {
                m.record_blank();
            }
            return None;
        }

        let entry = self.parser.parse_line(line);

        let outcome = if entry.is_valid {
            self.error_hit = entry.level == Some(LogLevel::Error);
            self.record_recovery(&entry);
            self.entries.push(entry.with_filename(self.filename.clone()));
            LineOutcome::Valid
        } else {
            match self.entries.last_mut() {
                Some(last) if self.error_hit => {
                    tracing::trace!(
                        timestamp = %last.timestamp,
                        depth = last.stack_trace.len() + 1,
                        "folding continuation line"
                    );
                    last.stack_trace.push(line.to_string());
                    LineOutcome::Continuation
                }
                _ => {
                    self.entries.push(entry.with_filename(self.filename.clone()));
                    LineOutcome::Invalid
                }
            }
        };

        if let Some(m) = &self.metrics {
            m.record_line(outcome);
        }
        Some(outcome)
    }

    /// Feed a sequence of already-decoded lines.
    pub fn process_lines<'a, I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for line in lines {
            self.push_line(line);
        }
    }

    /// Read `reader` to the end, feeding every line.
    ///
    /// On a read failure the entries assembled so far are kept; the caller
    /// decides whether to use them via [`into_entries`](Self::into_entries).
    pub fn consume<R: BufRead>(&mut self, reader: R, max_line_bytes: usize) -> Result<(), SourceError> {
        if let Some(m) = &self.metrics {
            m.record_file();
        }

        let mut lines = LineReader::new(reader, max_line_bytes);
        for line in lines.by_ref() {
            match line {
                Ok(line) => {
                    self.push_line(&line);
                }
                Err(e) => {
                    if let Some(m) = &self.metrics {
                        m.record_read_failure(match e {
                            SourceError::Io(_) => ReadFailure::Io,
                            SourceError::LineTooLarge { .. } => ReadFailure::TooLarge,
                        });
                    }
                    tracing::warn!(
                        filename = ?self.filename,
                        entries = self.entries.len(),
                        error = %e,
                        "read failed, stopping file"
                    );
                    return Err(e);
                }
            }
        }

        tracing::debug!(
            filename = ?self.filename,
            lines = lines.lines_read(),
            entries = self.entries.len(),
            "file assembled"
        );
        Ok(())
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    fn record_recovery(&self, entry: &LogEntry) {
        let Some(m) = &self.metrics else { return };
        if entry.logger == UNKNOWN_LOGGER {
            m.record_logger_recovered();
        }
        if entry.time.is_none() {
            m.record_unparsed_timestamp();
        }
    }
}

/// Assemble one source's lines with a fresh assembler.
pub fn process_lines<'a, I>(lines: I, filename: Option<String>) -> Vec<LogEntry>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut assembler = StreamAssembler::new(filename);
    assembler.process_lines(lines);
    assembler.into_entries()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};

    const INFO: &str = "2024-01-01T00:00:01.000Z\tINFO\tapp.main\tmain.go:10\tstarting up";
    const ERROR: &str = "2024-01-01T00:00:02.000Z\tERROR\tapp.db\tdb.go:55\tconnection refused";
    const WARN: &str = "2024-01-01T00:00:03.000Z\tWARN\tapp.db\tdb.go:60\tretrying";

    // ── Continuation folding ─────────────────────────────────────

    #[test]
    fn test_error_followed_by_two_unparsable_lines() {
        let entries = process_lines(
            [ERROR, "goroutine 1 [running]:", "    main.main()"],
            None,
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].stack_trace,
            vec!["goroutine 1 [running]:", "    main.main()"]
        );
    }

    #[test]
    fn test_info_followed_by_unparsable_line_is_standalone() {
        let entries = process_lines([INFO, "stray output"], None);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].stack_trace.is_empty());
        assert!(!entries[1].is_valid);
        assert_eq!(entries[1].raw, "stray output");
    }

    #[test]
    fn test_valid_line_resets_armed_state() {
        let mut assembler = StreamAssembler::new(None);
        assembler.push_line(ERROR);
        assert!(assembler.is_armed());
        assembler.push_line(WARN);
        assert!(!assembler.is_armed());
        assembler.push_line("trailing junk");

        let entries = assembler.into_entries();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].stack_trace.is_empty());
        assert!(!entries[2].is_valid);
    }

    #[test]
    fn test_consecutive_errors_fold_into_latest() {
        let entries = process_lines([ERROR, "trace a", ERROR, "trace b"], None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].stack_trace, vec!["trace a"]);
        assert_eq!(entries[1].stack_trace, vec!["trace b"]);
    }

    #[test]
    fn test_fatal_does_not_arm() {
        let fatal = "2024-01-01T00:00:04.000Z\tFATAL\tapp\tmain.go:1\tgiving up";
        let entries = process_lines([fatal, "panic: boom"], None);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_leading_garbage_is_standalone() {
        let entries = process_lines(["header line", ERROR], None);
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_valid);
        assert!(entries[1].is_valid);
    }

    // ── Accountability ───────────────────────────────────────────

    #[test]
    fn test_every_non_blank_line_is_accounted_for() {
        let lines = [
            "", INFO, "noise", ERROR, "  at x", "", "  at y", "   ", WARN, "tail", ERROR, "z",
        ];
        let non_blank = lines.iter().filter(|l| !l.trim().is_empty()).count();

        let entries = process_lines(lines, None);
        let accounted: usize = entries.iter().map(|e| e.line_count()).sum();
        assert_eq!(accounted, non_blank);
    }

    #[test]
    fn test_blank_lines_do_not_disarm() {
        let entries = process_lines([ERROR, "", "after blank"], None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].stack_trace, vec!["after blank"]);
    }

    // ── Source label & per-file state ────────────────────────────

    #[test]
    fn test_filename_is_passed_through() {
        let entries = process_lines([INFO, "junk"], Some("a.log".to_string()));
        assert!(entries.iter().all(|e| e.filename.as_deref() == Some("a.log")));
    }

    #[test]
    fn test_fresh_assembler_per_file_does_not_leak_state() {
        let first = process_lines([ERROR], Some("a.log".to_string()));
        let second = process_lines(["orphan line"], Some("b.log".to_string()));
        assert!(first[0].stack_trace.is_empty());
        assert_eq!(second.len(), 1);
        assert!(!second[0].is_valid);
    }

    // ── Reading ──────────────────────────────────────────────────

    #[test]
    fn test_consume_reader_with_crlf() {
        let input = format!("{}\r\n  at frame\r\n{}\r\n", ERROR, INFO);
        let mut assembler = StreamAssembler::new(None);
        assembler.consume(Cursor::new(input), 1024).unwrap();

        let entries = assembler.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].stack_trace, vec!["  at frame"]);
        assert_eq!(entries[1].message, "starting up");
    }

    struct FailAfter {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "gone"));
            }
            Ok(n)
        }
    }

    #[test]
    fn test_read_error_keeps_partial_entries() {
        let reader = io::BufReader::new(FailAfter {
            data: Cursor::new(format!("{}\n{}\n", INFO, WARN).into_bytes()),
        });
        let metrics = Arc::new(ParsingMetrics::new());
        let mut assembler = StreamAssembler::new(None).with_metrics(metrics.clone());

        let err = assembler.consume(reader, 1024).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
        assert_eq!(assembler.into_entries().len(), 2);
        assert_eq!(metrics.snapshot().io_errors, 1);
    }

    #[test]
    fn test_oversized_line_is_a_read_failure() {
        let input = format!("{}\n{}\n", INFO, "x".repeat(200));
        let mut assembler = StreamAssembler::new(None);
        let err = assembler.consume(Cursor::new(input), 100).unwrap_err();
        assert!(matches!(err, SourceError::LineTooLarge { line: 2, .. }));
        assert_eq!(assembler.entries().len(), 1);
    }

    // ── Metrics ──────────────────────────────────────────────────

    #[test]
    fn test_metrics_recorded() {
        let metrics = Arc::new(ParsingMetrics::new());
        let recovered = "2024-01-01T00:00:05.000Z\tINFO\tpkg/foo.go:42\tno logger here";
        let bad_instant = "2024-02-31T00:00:00.000Z\tINFO\tapp\tmain.go:1\tfeb 31";

        let mut assembler = StreamAssembler::new(None).with_metrics(metrics.clone());
        assembler.process_lines([ERROR, "frame", "", recovered, bad_instant, "junk"]);

        let snap = metrics.snapshot();
        assert_eq!(snap.lines_read, 6);
        assert_eq!(snap.blank_lines, 1);
        assert_eq!(snap.valid_entries, 3);
        assert_eq!(snap.continuation_lines, 1);
        assert_eq!(snap.invalid_entries, 1);
        assert_eq!(snap.loggers_recovered, 1);
        assert_eq!(snap.unparsed_timestamps, 1);
    }
}
