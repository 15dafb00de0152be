//! Batch — several sources parsed one after another, then ordered once.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::logs::order;
use crate::parser::{LogEntry, ParsingMetrics};

use super::assembler::StreamAssembler;
use super::source::SourceError;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Failed to open {filename}: {source}")]
    Open {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {filename}: {source}")]
    Read {
        filename: String,
        #[source]
        source: SourceError,
    },
}

impl BatchError {
    pub fn filename(&self) -> &str {
        match self {
            BatchError::Open { filename, .. } | BatchError::Read { filename, .. } => filename,
        }
    }
}

/// Sequential multi-source parse.
///
/// Each source gets its own [`StreamAssembler`], so continuation state never
/// crosses a file boundary. A source that fails to read contributes nothing.
pub struct ParseBatch {
    max_line_bytes: usize,
    metrics: Option<Arc<ParsingMetrics>>,
    entries: Vec<LogEntry>,
    filenames: Vec<String>,
}

impl ParseBatch {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            max_line_bytes,
            metrics: None,
            entries: Vec::new(),
            filenames: Vec::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<ParsingMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Parse one source. Returns the number of entries it produced.
    pub fn add_source<R: BufRead>(&mut self, filename: &str, reader: R) -> Result<usize, BatchError> {
        let mut assembler = StreamAssembler::new(Some(filename.to_string()));
        if let Some(m) = &self.metrics {
            assembler = assembler.with_metrics(m.clone());
        }

        assembler
            .consume(reader, self.max_line_bytes)
            .map_err(|source| BatchError::Read {
                filename: filename.to_string(),
                source,
            })?;

        let entries = assembler.into_entries();
        let count = entries.len();
        self.entries.extend(entries);
        self.filenames.push(filename.to_string());
        Ok(count)
    }

    /// Open and parse a file on disk, labelled with its display path.
    pub fn add_file(&mut self, path: &Path) -> Result<usize, BatchError> {
        let filename = path.display().to_string();
        let file = File::open(path).map_err(|source| BatchError::Open {
            filename: filename.clone(),
            source,
        })?;
        self.add_source(&filename, BufReader::new(file))
    }

    /// Names of the sources parsed successfully, in input order.
    pub fn filenames(&self) -> &[String] {
        &self.filenames
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Concatenated entries in final order.
    pub fn finish(self) -> Vec<LogEntry> {
        order::order(self.entries)
    }
}
