//! This module implements the error type for .fab parsing. A .fab decode is
//! one-shot: every variant here is fatal for the parse that raised it, and
//! no partial document is ever returned.

use std::error::Error;
use std::fmt::Display;
use std::io;

/// Everything that can go wrong while decoding a .fab document.
///
/// Variants carry the offending section name and, where one is known, the
/// literal line content and 1-based line number, to aid diagnosis.
#[derive(Debug)]
#[non_exhaustive]
pub enum FabError {
  /// An I/O failure in the underlying reader.
  Io(io::Error),
  /// A `BEGIN <X>` was found with an unrecognized section keyword.
  UnknownSection {
    /// The offending keyword.
    keyword: String,
    /// The line it was found on.
    line_no: usize
  },
  /// A recognized section that this parser refuses to decode. Only raised
  /// for ROCKBLOCK under [`RockBlockPolicy::Reject`].
  ///
  /// [`RockBlockPolicy::Reject`]: crate::parser::RockBlockPolicy::Reject
  UnimplementedSection {
    /// The offending keyword.
    keyword: String,
    /// The line it was found on.
    line_no: usize
  },
  /// A flat-section line without an `=`, or a PROPERTIES/SETS value without
  /// a quoted substring.
  MalformedKeyword {
    /// The literal line (or value) that failed to split.
    line: String,
    /// The line it was found on, when still known.
    line_no: Option<usize>
  },
  /// A record header or trailer line whose fields don't match its grammar.
  MalformedRecord {
    /// The section the record belongs to.
    section: &'static str,
    /// The literal line content.
    line: String,
    /// The line it was found on.
    line_no: usize
  },
  /// A field that should have been numeric but didn't parse as such.
  BadNumber {
    /// The offending token.
    token: String,
    /// The line it was found on, when still known.
    line_no: Option<usize>
  },
  /// A declared vertex/node/face count not matched by the lines actually
  /// consumed before a terminator or end-of-input.
  RecordCountMismatch {
    /// The section the record belongs to.
    section: &'static str,
    /// The id of the record being read.
    id: u64,
    /// The declared count.
    expected: usize,
    /// The number of lines actually consumed.
    got: usize,
    /// The line the mismatch was detected on.
    line_no: usize
  },
  /// A property row whose value count disagrees with the schema size, or a
  /// face line whose property count disagrees with its record's first face.
  PropertyArityMismatch {
    /// The id of the fracture the row belongs to.
    id: u64,
    /// The expected number of values.
    expected: usize,
    /// The number of values found.
    got: usize,
    /// The line it was found on, when still known.
    line_no: Option<usize>
  },
  /// A duplicate record id or schema index within one section.
  DuplicateId {
    /// The section the duplicate was found in.
    section: &'static str,
    /// The repeated id or index.
    id: u64,
    /// The line it was found on, when still known.
    line_no: Option<usize>
  },
  /// End-of-input reached before a section's END marker.
  UnexpectedEof {
    /// The section that was left unterminated.
    section: String
  }
}

impl Display for FabError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::Io(e) => write!(f, "i/o error: {}", e),
      Self::UnknownSection { keyword, line_no } => write!(
        f, "unknown section type \"{}\" on line {}", keyword, line_no
      ),
      Self::UnimplementedSection { keyword, line_no } => write!(
        f, "section type \"{}\" (line {}) is not implemented",
        keyword, line_no
      ),
      Self::MalformedKeyword { line, line_no: Some(n) } => write!(
        f, "line {} is not a \"key = value\" pair: \"{}\"", n, line
      ),
      Self::MalformedKeyword { line, line_no: None } => write!(
        f, "value has no quoted substring: \"{}\"", line
      ),
      Self::MalformedRecord { section, line, line_no } => write!(
        f, "malformed {} record line {}: \"{}\"", section, line_no, line
      ),
      Self::BadNumber { token, line_no: Some(n) } => write!(
        f, "expected a number on line {}, got \"{}\"", n, token
      ),
      Self::BadNumber { token, line_no: None } => write!(
        f, "expected a number, got \"{}\"", token
      ),
      Self::RecordCountMismatch { section, id, expected, got, line_no } => {
        write!(
          f,
          "{} record {} declared {} lines but {} were read (line {})",
          section, id, expected, got, line_no
        )
      },
      Self::PropertyArityMismatch { id, expected, got, line_no } => {
        write!(
          f,
          "fracture {} has {} property values, expected {}{}",
          id,
          got,
          expected,
          line_no.map(|n| format!(" (line {})", n)).unwrap_or_default()
        )
      },
      Self::DuplicateId { section, id, line_no } => write!(
        f,
        "duplicate id {} in {} section{}",
        id,
        section,
        line_no.map(|n| format!(" (line {})", n)).unwrap_or_default()
      ),
      Self::UnexpectedEof { section } => write!(
        f, "end of input before END {}", section
      )
    };
  }
}

impl Error for FabError {}

impl From<io::Error> for FabError {
  fn from(e: io::Error) -> Self {
    return Self::Io(e);
  }
}
