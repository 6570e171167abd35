//! This module implements the section scanner: recognition of
//! `BEGIN <NAME>` / `END <NAME>` boundary markers, `key = value` lines, and
//! the flat key/value sections built out of them. All higher-level readers
//! are driven by these routines.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::cursor::LineCursor;
use crate::errors::FabError;

/// The section kinds a .fab document may contain. Any other `BEGIN` keyword
/// is a fatal error.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord
)]
#[non_exhaustive]
pub enum SectionKind {
  /// The FORMAT section: file-level metadata as key/value pairs.
  Format,
  /// The PROPERTIES section: the per-fracture property schema.
  Properties,
  /// The SETS section: set id to set name mapping.
  Sets,
  /// The FRACTURE section: planar (polygonal) fractures.
  Fracture,
  /// The TESSFRACTURE section: tessellated (meshed) fractures.
  TessFracture,
  /// The ROCKBLOCK section: recognized, but its contents are not decoded.
  RockBlock
}

impl SectionKind {
  /// Returns all recognized section kinds.
  pub const fn all() -> &'static [Self] {
    return &[
      Self::Format,
      Self::Properties,
      Self::Sets,
      Self::Fracture,
      Self::TessFracture,
      Self::RockBlock
    ];
  }

  /// Returns the upper-case keyword for this section, as it appears in
  /// boundary markers.
  pub const fn keyword(&self) -> &'static str {
    return match self {
      Self::Format => "FORMAT",
      Self::Properties => "PROPERTIES",
      Self::Sets => "SETS",
      Self::Fracture => "FRACTURE",
      Self::TessFracture => "TESSFRACTURE",
      Self::RockBlock => "ROCKBLOCK"
    };
  }

  /// Matches a section name against the recognized kinds. Names are
  /// trimmed and matched case-insensitively.
  pub fn detect(name: &str) -> Option<Self> {
    let name = name.trim();
    return Self::all()
      .iter()
      .copied()
      .find(|k| k.keyword().eq_ignore_ascii_case(name));
  }
}

impl std::fmt::Display for SectionKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.keyword());
  }
}

/// A section boundary marker found in a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Boundary {
  /// A `BEGIN <NAME>` marker, carrying the trimmed name.
  Begin(String),
  /// An `END <NAME>` marker, carrying the trimmed name.
  End(String)
}

/// Checks whether a line is a section boundary. The `BEGIN `/`END ` prefix
/// match is literal and case-sensitive; the carried name is trimmed.
pub fn detect_boundary(line: &str) -> Option<Boundary> {
  let trimmed = line.trim();
  if let Some(name) = trimmed.strip_prefix("BEGIN ") {
    return Some(Boundary::Begin(name.trim().to_string()));
  }
  if let Some(name) = trimmed.strip_prefix("END ") {
    return Some(Boundary::End(name.trim().to_string()));
  }
  return None;
}

/// Splits a `key = value` line on its first `=`, trimming both sides. A
/// line with no `=` at all is a format error.
pub fn read_keyword(
  line: &str,
  line_no: usize
) -> Result<(String, String), FabError> {
  return match line.split_once('=') {
    Some((key, value)) => Ok((
      key.trim().to_string(),
      value.trim().to_string()
    )),
    None => Err(FabError::MalformedKeyword {
      line: line.to_string(),
      line_no: Some(line_no)
    })
  };
}

/// Reads a flat section: every line until the matching `END <NAME>` goes
/// through [`read_keyword`]. Declaration order is preserved. Used for the
/// FORMAT and SETS sections directly and as the basis for PROPERTIES.
pub fn read_flat_section<R: BufRead>(
  cursor: &mut LineCursor<R>,
  kind: SectionKind
) -> Result<Vec<(String, String)>, FabError> {
  let mut pairs: Vec<(String, String)> = Vec::new();
  loop {
    let line = match cursor.next_line()? {
      Some(line) => line,
      None => {
        return Err(FabError::UnexpectedEof {
          section: kind.keyword().to_string()
        });
      }
    };
    if let Some(Boundary::End(name)) = detect_boundary(&line) {
      if name.eq_ignore_ascii_case(kind.keyword()) {
        return Ok(pairs);
      }
    }
    pairs.push(read_keyword(&line, cursor.line_no())?);
  }
}
