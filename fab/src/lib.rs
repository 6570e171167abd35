//! This library implements types and functions to parse and manipulate the
//! data within .fab files: the text interchange format used by FracMan-like
//! tools to exchange discrete fracture network (DFN) geometry and attached
//! per-fracture properties.
//!
//! It was created with the main intent being the development of tooling to
//! pull fracture geometry and property tables out of simulator exports for
//! use in automated geometric and statistical analysis.
//!
//! However, the code is modular -- the section readers are independent, so
//! one can easily expand the library to decode further section kinds or
//! record variants.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::needless_return)]

pub mod cursor;
pub mod document;
pub mod errors;
pub mod fractures;
pub mod parser;
pub mod scanner;
pub mod schema;
pub mod table;
pub mod util;

/// Re-exports the types most callers need to parse and consume documents.
pub mod prelude {
  pub use crate::cursor::LineCursor;
  pub use crate::document::FabDocument;
  pub use crate::errors::FabError;
  pub use crate::fractures::{
    Face, HeaderMode, PlanarFracture, TessellatedFracture
  };
  pub use crate::parser::{FabParser, ParseSettings, RockBlockPolicy};
  pub use crate::scanner::SectionKind;
  pub use crate::schema::{PropertySchema, SchemaEntry};
  pub use crate::table::{PropertyTable, PropertyValue};
}

#[cfg(test)]
mod tests;
