//! This module implements the top-level .fab parser: a state machine over
//! section keywords that dispatches each `BEGIN` block to the matching
//! reader and assembles the results into one [`FabDocument`].

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::cursor::LineCursor;
use crate::document::FabDocument;
use crate::errors::FabError;
use crate::fractures::{
  read_planar_section, read_tessellated_section, HeaderMode, PlanarFracture,
  TessellatedFracture
};
use crate::scanner::{
  detect_boundary, read_flat_section, Boundary, SectionKind
};
use crate::schema::PropertySchema;
use crate::table::{default_integer_columns, PropertyTable};
use crate::util::strip_quotes;

/// What to do with a ROCKBLOCK section. The format revisions disagree:
/// older tooling rejected it outright, current tooling recognizes it and
/// discards its contents.
#[derive(
  Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq
)]
pub enum RockBlockPolicy {
  /// Skip the section without producing model data.
  #[default]
  Skip,
  /// Fail the parse with an unimplemented-section error.
  Reject
}

/// The caller-selected knobs for a parse. Everything here is fixed for the
/// whole file; nothing is inferred per-record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseSettings {
  /// The planar fracture header shape.
  pub header_mode: HeaderMode,
  /// The ROCKBLOCK policy.
  pub rockblock: RockBlockPolicy,
  /// Display names of property columns coerced to integer in the table.
  pub integer_columns: BTreeSet<String>
}

impl Default for ParseSettings {
  fn default() -> Self {
    return Self {
      header_mode: HeaderMode::default(),
      rockblock: RockBlockPolicy::default(),
      integer_columns: default_integer_columns()
    };
  }
}

/// Accumulates section outputs during the parse, then assembles them into
/// an immutable document once all lines are consumed. Sections may appear
/// in any order; a repeated section replaces the earlier one with a
/// warning.
#[derive(Default)]
struct DocumentBuilder {
  /// The FORMAT section's pairs, if seen.
  format: Option<BTreeMap<String, String>>,
  /// The PROPERTIES schema, if seen.
  schema: Option<PropertySchema>,
  /// The SETS section's pairs, if seen.
  set_names: Option<BTreeMap<String, String>>,
  /// The FRACTURE section's records, if seen.
  fractures: Option<Vec<PlanarFracture>>,
  /// The TESSFRACTURE section's records, if seen.
  tess_fractures: Option<Vec<TessellatedFracture>>
}

impl DocumentBuilder {
  /// Stores one section's output, warning if it replaces an earlier one.
  fn put<T>(slot: &mut Option<T>, kind: SectionKind, value: T) {
    if slot.replace(value).is_some() {
      warn!("Repeated {} section replaces the earlier one.", kind);
    }
  }

  /// Joins the accumulated sections into the final document. The property
  /// table is built here, once, from the planar fractures and the schema.
  fn assemble(
    self,
    settings: &ParseSettings
  ) -> Result<FabDocument, FabError> {
    let schema = self.schema.unwrap_or_default();
    let fractures = self.fractures.unwrap_or_default();
    let properties = PropertyTable::build(
      &fractures,
      &schema,
      &settings.integer_columns
    )?;
    return Ok(FabDocument {
      filename: None,
      format: self.format.unwrap_or_default(),
      schema,
      set_names: self.set_names.unwrap_or_default(),
      fractures,
      tess_fractures: self.tess_fractures.unwrap_or_default(),
      properties
    });
  }
}

/// This is the .fab parser. It's one-pass, single-thread: the format has
/// no markers that would make parallel splitting safe, since record
/// boundaries depend on counts read from the preceding header line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FabParser {
  /// The settings for this parse.
  settings: ParseSettings
}

impl FabParser {
  /// Instantiates a parser with default settings: legacy header shape,
  /// ROCKBLOCK skipped, default integer columns.
  pub fn new() -> Self {
    return Self::default();
  }

  /// Instantiates a parser with explicit settings.
  pub fn with_settings(settings: ParseSettings) -> Self {
    return Self { settings };
  }

  /// Consumes a ROCKBLOCK section without decoding it.
  fn skip_section<R: BufRead>(
    &self,
    cursor: &mut LineCursor<R>,
    kind: SectionKind
  ) -> Result<(), FabError> {
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
          return Ok(());
        }
      }
    }
  }

  /// Parses from a BufRead instance.
  pub fn parse_bufread<R: BufRead>(
    &self,
    reader: R
  ) -> Result<FabDocument, FabError> {
    let mut cursor = LineCursor::new(reader);
    let mut builder = DocumentBuilder::default();
    while let Some(line) = cursor.next_line()? {
      let name = match detect_boundary(&line) {
        Some(Boundary::Begin(name)) => name,
        Some(Boundary::End(name)) => {
          warn!(
            "Stray END {} outside any section on line {}.",
            name,
            cursor.line_no()
          );
          continue;
        },
        // lines between sections carry no data
        None => continue
      };
      let kind = match SectionKind::detect(&name) {
        Some(kind) => kind,
        None => {
          return Err(FabError::UnknownSection {
            keyword: name,
            line_no: cursor.line_no()
          });
        }
      };
      debug!("Entering {} section on line {}.", kind, cursor.line_no());
      match kind {
        SectionKind::Format => {
          let pairs = read_flat_section(&mut cursor, kind)?;
          DocumentBuilder::put(
            &mut builder.format,
            kind,
            pairs.into_iter().collect()
          );
        },
        SectionKind::Properties => {
          let pairs = read_flat_section(&mut cursor, kind)?;
          DocumentBuilder::put(
            &mut builder.schema,
            kind,
            PropertySchema::from_pairs(pairs)?
          );
        },
        SectionKind::Sets => {
          let pairs = read_flat_section(&mut cursor, kind)?;
          let names = pairs
            .into_iter()
            .map(|(k, v)| Ok((k, strip_quotes(&v)?)))
            .collect::<Result<BTreeMap<String, String>, FabError>>()?;
          DocumentBuilder::put(&mut builder.set_names, kind, names);
        },
        SectionKind::Fracture => {
          let fracs =
            read_planar_section(&mut cursor, self.settings.header_mode)?;
          DocumentBuilder::put(&mut builder.fractures, kind, fracs);
        },
        SectionKind::TessFracture => {
          let fracs = read_tessellated_section(&mut cursor)?;
          DocumentBuilder::put(&mut builder.tess_fractures, kind, fracs);
        },
        SectionKind::RockBlock => match self.settings.rockblock {
          RockBlockPolicy::Skip => {
            warn!(
              "Skipping ROCKBLOCK section on line {}.",
              cursor.line_no()
            );
            self.skip_section(&mut cursor, kind)?;
          },
          RockBlockPolicy::Reject => {
            return Err(FabError::UnimplementedSection {
              keyword: kind.keyword().to_string(),
              line_no: cursor.line_no()
            });
          }
        }
      }
    }
    return builder.assemble(&self.settings);
  }

  /// Utility method -- reads and parses a file, recording its name in the
  /// document.
  pub fn parse_file<S: AsRef<Path>>(
    &self,
    p: S
  ) -> Result<FabDocument, FabError> {
    let file = File::open(p.as_ref())?;
    let mut doc = self.parse_bufread(BufReader::new(file))?;
    doc.filename = p.as_ref().file_name()
      .and_then(|s| s.to_str())
      .map(String::from);
    return Ok(doc);
  }
}
