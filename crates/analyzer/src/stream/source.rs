//! Source — bounded line reader over any `BufRead`.
//!
//! Splits on `\n`, strips one trailing `\r`, and decodes invalid UTF-8
//! lossily. Read failures are reported as [`SourceError`] and end the
//! iteration; they are never turned into log entries.

use std::io::{BufRead, Read};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line} too large: {len} bytes (max: {max} bytes)")]
    LineTooLarge { line: usize, len: usize, max: usize },
}

pub struct LineReader<R> {
    reader: R,
    max_line_bytes: usize,
    line_no: usize,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            reader,
            max_line_bytes,
            line_no: 0,
            buf: Vec::new(),
            done: false,
        }
    }

    /// Number of lines returned so far.
    pub fn lines_read(&self) -> usize {
        self.line_no
    }

    fn read_next(&mut self) -> Result<Option<String>, SourceError> {
        self.buf.clear();

        // Two extra bytes leave room for the "\r\n" terminator.
        let limit = self.max_line_bytes as u64 + 2;
        let n = (&mut self.reader).take(limit).read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        if self.buf.len() > self.max_line_bytes {
            return Err(SourceError::LineTooLarge {
                line: self.line_no,
                len: self.buf.len(),
                max: self.max_line_bytes,
            });
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<String, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_next() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
