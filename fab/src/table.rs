//! This module implements the property table: the join of each planar
//! fracture's raw property row against the declared schema, producing a
//! row-indexed, named-column table of typed values.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::FabError;
use crate::fractures::PlanarFracture;
use crate::schema::PropertySchema;

/// A single typed property value.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialEq, derive_more::From
)]
pub enum PropertyValue {
  /// A floating-point value: the default for every column.
  Real(f64),
  /// An integer value: produced for columns named in the integer-coercion
  /// set, by truncating the parsed float.
  Integer(i64)
}

impl std::fmt::Display for PropertyValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::Real(x) => write!(f, "{}", x),
      Self::Integer(x) => write!(f, "{}", x)
    };
  }
}

/// The column names coerced to integer by default. A brittle, name-based
/// rule inherited from the format's usage; kept as data so it can be
/// extended without touching the parsing logic.
pub const DEFAULT_INTEGER_COLUMNS: [&str; 2] =
  ["Fracture Geometry", "Set Name"];

/// Returns the default integer-coercion column set.
pub fn default_integer_columns() -> BTreeSet<String> {
  return DEFAULT_INTEGER_COLUMNS.iter().map(|s| s.to_string()).collect();
}

/// A table of per-fracture property values: one row per fracture id, one
/// named column per schema entry, in schema declaration order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyTable {
  /// The column names, in schema declaration order.
  columns: Vec<String>,
  /// The rows, keyed by fracture id. Each row has one value per column.
  rows: BTreeMap<u64, Vec<PropertyValue>>
}

impl PropertyTable {
  /// Builds the table from parsed planar fractures and the schema. Every
  /// raw property row must have exactly as many tokens as the schema has
  /// entries; all values parse as floats, and columns named in `int_cols`
  /// are then coerced to integer.
  pub fn build(
    fractures: &[PlanarFracture],
    schema: &PropertySchema,
    int_cols: &BTreeSet<String>
  ) -> Result<Self, FabError> {
    let columns: Vec<String> = schema.names().map(String::from).collect();
    let coerce: Vec<bool> =
      columns.iter().map(|c| int_cols.contains(c)).collect();
    let mut rows: BTreeMap<u64, Vec<PropertyValue>> = BTreeMap::new();
    for frac in fractures {
      if frac.raw_properties.len() != columns.len() {
        return Err(FabError::PropertyArityMismatch {
          id: frac.id,
          expected: columns.len(),
          got: frac.raw_properties.len(),
          line_no: None
        });
      }
      let mut row: Vec<PropertyValue> = Vec::with_capacity(columns.len());
      for (token, int_coerce) in frac.raw_properties.iter().zip(&coerce) {
        let x = token.parse::<f64>().map_err(|_| FabError::BadNumber {
          token: token.clone(),
          line_no: None
        })?;
        row.push(if *int_coerce {
          PropertyValue::Integer(x as i64)
        } else {
          PropertyValue::Real(x)
        });
      }
      rows.insert(frac.id, row);
    }
    return Ok(Self { columns, rows });
  }

  /// Returns the column names, in schema order.
  pub fn columns(&self) -> &[String] {
    return &self.columns;
  }

  /// Returns the number of rows.
  pub fn len(&self) -> usize {
    return self.rows.len();
  }

  /// True if the table has no rows.
  pub fn is_empty(&self) -> bool {
    return self.rows.is_empty();
  }

  /// Iterates over the fracture ids, ascending.
  pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
    return self.rows.keys().copied();
  }

  /// Returns the row for a fracture id, in column order.
  pub fn row(&self, id: u64) -> Option<&[PropertyValue]> {
    return self.rows.get(&id).map(|r| r.as_slice());
  }

  /// Returns one value by fracture id and column name.
  pub fn value(&self, id: u64, column: &str) -> Option<PropertyValue> {
    let col = self.columns.iter().position(|c| c == column)?;
    return self.rows.get(&id).map(|r| r[col]);
  }

  /// Returns a whole column's values, in ascending id order.
  pub fn column(&self, column: &str) -> Option<Vec<PropertyValue>> {
    let col = self.columns.iter().position(|c| c == column)?;
    return Some(self.rows.values().map(|r| r[col]).collect());
  }
}
