//! This module implements the property schema: the ordered, named set of
//! scalar attributes attached to each fracture record, declared once per
//! document in the PROPERTIES section.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::errors::FabError;
use crate::util::strip_quotes;

/// One column declaration from the PROPERTIES section, e.g.
/// `5 = "Fracture Length"`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaEntry {
  /// The declared column index. Kept as declared, never renumbered.
  pub index: u32,
  /// The display name, with its surrounding quotes stripped.
  pub name: String
}

/// The property schema: an ordered mapping from declared column index to
/// display name. Insertion order is declaration order, and indices must be
/// unique.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertySchema {
  /// The column declarations, in declaration order.
  entries: Vec<SchemaEntry>
}

impl PropertySchema {
  /// Builds a schema from the raw key/value pairs of a PROPERTIES section.
  /// Each key must be a numeric index and each value must carry a quoted
  /// display name; duplicate indices are fatal.
  pub fn from_pairs(
    pairs: Vec<(String, String)>
  ) -> Result<Self, FabError> {
    let mut entries: Vec<SchemaEntry> = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
      let index = key.parse::<u32>().map_err(|_| FabError::BadNumber {
        token: key.clone(),
        line_no: None
      })?;
      entries.push(SchemaEntry { index, name: strip_quotes(&value)? });
    }
    if let Some(dup) = entries.iter().map(|e| e.index).duplicates().next() {
      return Err(FabError::DuplicateId {
        section: "PROPERTIES",
        id: dup as u64,
        line_no: None
      });
    }
    return Ok(Self { entries });
  }

  /// Returns the number of declared columns.
  pub fn len(&self) -> usize {
    return self.entries.len();
  }

  /// True if no columns were declared.
  pub fn is_empty(&self) -> bool {
    return self.entries.is_empty();
  }

  /// Returns the entries in declaration order.
  pub fn entries(&self) -> &[SchemaEntry] {
    return &self.entries;
  }

  /// Returns the display names in declaration order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    return self.entries.iter().map(|e| e.name.as_str());
  }

  /// Looks a display name up by its declared index.
  pub fn name_of(&self, index: u32) -> Option<&str> {
    return self.entries
      .iter()
      .find(|e| e.index == index)
      .map(|e| e.name.as_str());
  }
}
