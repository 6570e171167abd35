//! This module implements the line cursor: a sequential, single-pass
//! supplier of raw text lines with an explicit end-of-input signal. Every
//! section reader takes the cursor by mutable reference and advances it;
//! there is no random access and no rewinding.

use std::io::{BufRead, Lines};

use crate::errors::FabError;

/// A one-way cursor over the lines of a reader. Tracks a 1-based line
/// number so errors can point at the offending line.
pub struct LineCursor<R: BufRead> {
  /// The underlying line iterator.
  lines: Lines<R>,
  /// The number of the last line handed out, 1-based. Zero before the
  /// first read.
  line_no: usize
}

impl<R: BufRead> LineCursor<R> {
  /// Wraps a buffered reader in a cursor.
  pub fn new(reader: R) -> Self {
    return Self { lines: reader.lines(), line_no: 0 };
  }

  /// Returns the number of the last line read (1-based, 0 if none yet).
  pub fn line_no(&self) -> usize {
    return self.line_no;
  }

  /// Advances to the next line. `Ok(None)` is the end-of-input sentinel;
  /// I/O failures propagate as fatal errors, since a .fab decode is
  /// one-shot and never retried.
  pub fn next_line(&mut self) -> Result<Option<String>, FabError> {
    return match self.lines.next() {
      Some(Ok(line)) => {
        self.line_no += 1;
        Ok(Some(line))
      },
      Some(Err(e)) => Err(FabError::Io(e)),
      None => Ok(None)
    };
  }
}
