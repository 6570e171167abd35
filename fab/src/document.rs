//! This module implements the general structure of a .fab document as we
//! interpret it: the output of a successful parse, owned by the caller and
//! immutable from then on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fractures::{PlanarFracture, TessellatedFracture};
use crate::schema::PropertySchema;
use crate::table::PropertyTable;

/// This is the output of a .fab parser: everything decoded from one file,
/// assembled in a single pass.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FabDocument {
  /// The name of the source file, if parsed from one.
  pub filename: Option<String>,
  /// The FORMAT section's key/value metadata, verbatim.
  pub format: BTreeMap<String, String>,
  /// The property schema declared in the PROPERTIES section.
  pub schema: PropertySchema,
  /// The SETS section's set-id to set-name mapping, quotes stripped.
  pub set_names: BTreeMap<String, String>,
  /// The planar fractures, in declaration order.
  pub fractures: Vec<PlanarFracture>,
  /// The tessellated fractures, in declaration order.
  pub tess_fractures: Vec<TessellatedFracture>,
  /// The typed property table joining the fractures against the schema.
  pub properties: PropertyTable
}

impl FabDocument {
  /// Returns the ids of the planar fractures, in declaration order.
  pub fn fracture_ids(&self) -> impl Iterator<Item = u64> + '_ {
    return self.fractures.iter().map(|f| f.id);
  }

  /// Looks a planar fracture up by id.
  pub fn fracture(&self, id: u64) -> Option<&PlanarFracture> {
    return self.fractures.iter().find(|f| f.id == id);
  }

  /// Looks a tessellated fracture up by id.
  pub fn tess_fracture(&self, id: u64) -> Option<&TessellatedFracture> {
    return self.tess_fractures.iter().find(|f| f.id == id);
  }
}
