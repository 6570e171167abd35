//! This module implements the fracture record kinds and their section
//! readers: planar (polygonal) fractures from the FRACTURE section and
//! tessellated (meshed) fractures from the TESSFRACTURE section.
//!
//! Both readers drive a per-record loop on a shared line cursor until they
//! hit their section's END marker. Record boundaries are only discoverable
//! from the counts on each record's header line, so reading is strictly
//! sequential and never looks ahead of the current record.

use std::collections::BTreeSet;
use std::io::BufRead;

use log::debug;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::cursor::LineCursor;
use crate::errors::FabError;
use crate::scanner::{detect_boundary, Boundary};
use crate::util::{parse_real, parse_uint};

/// The most elements to preallocate for a record's declared count. Counts
/// come from untrusted header lines, so vectors start capped and grow.
const PREALLOC_CAP: usize = 1024;

/// The two observed header shapes for planar fracture records. They are
/// schema variants of the same record kind: the third header field is
/// either a set id (legacy exports) or a transmissivity (current exports).
/// The shape is picked by the caller for the whole file -- mixed-mode
/// files are not supported, and the mode is never inferred per-record.
#[derive(
  Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq
)]
pub enum HeaderMode {
  /// Legacy header: `id vertex_count set_id prop_value*`.
  #[default]
  SetIdFirst,
  /// Current header: `id vertex_count transmissivity prop_value*`.
  TransmissivityFirst
}

/// A planar fracture: a single polygon with a normal vector and one raw
/// property row that the property table later joins against the schema.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanarFracture {
  /// The record id, unique within its section.
  pub id: u64,
  /// The numeric set id. Present in legacy-header files only.
  pub set_id: Option<f64>,
  /// The transmissivity. Present in current-header files only.
  pub transmissivity: Option<f64>,
  /// The polygon vertices, in declaration order.
  pub vertices: Vec<Point3<f64>>,
  /// The fracture plane's normal vector.
  pub normal: Vector3<f64>,
  /// The raw property tokens from the header line, in schema order.
  pub raw_properties: Vec<String>
}

impl PlanarFracture {
  /// Returns the mean of the vertices, i.e. the polygon centroid.
  pub fn centroid(&self) -> Point3<f64> {
    let n = self.vertices.len().max(1) as f64;
    let sum = self.vertices
      .iter()
      .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    return Point3::from(sum / n);
  }

  /// Returns the mean z-value of the vertices, the fracture's mid-depth.
  pub fn mid_z(&self) -> f64 {
    let n = self.vertices.len().max(1) as f64;
    return self.vertices.iter().map(|p| p.z).sum::<f64>() / n;
  }
}

/// One face of a tessellated fracture: five orientation/connectivity
/// fields plus the per-face property values.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Face {
  /// The five leading geometry/connectivity fields of the face line.
  pub geometry: [f64; 5],
  /// The per-face property values. Within one record, every face has the
  /// same number of these as the record's first face line.
  pub properties: Vec<f64>
}

/// A tessellated fracture: a meshed surface made of nodes and faces
/// instead of a single planar polygon.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TessellatedFracture {
  /// The record id, unique within its section.
  pub id: u64,
  /// The numeric set id.
  pub set_id: f64,
  /// The mesh nodes, in declaration order.
  pub nodes: Vec<Point3<f64>>,
  /// The mesh faces, in declaration order.
  pub faces: Vec<Face>
}

/// Reads a point line (`index x y z`). The leading per-point index field
/// is discarded; the point comes from the last three fields.
fn read_point<R: BufRead>(
  cursor: &mut LineCursor<R>,
  section: &'static str,
  id: u64,
  expected: usize,
  got: usize
) -> Result<Point3<f64>, FabError> {
  let line = match cursor.next_line()? {
    Some(line) => line,
    None => {
      return Err(FabError::RecordCountMismatch {
        section, id, expected, got, line_no: cursor.line_no()
      });
    }
  };
  // hitting the section terminator mid-record means the declared count
  // overshot the lines actually present
  if let Some(Boundary::End(name)) = detect_boundary(&line) {
    if name.eq_ignore_ascii_case(section) {
      return Err(FabError::RecordCountMismatch {
        section, id, expected, got, line_no: cursor.line_no()
      });
    }
  }
  let fields: Vec<&str> = line.split_whitespace().collect();
  if fields.len() < 4 {
    return Err(FabError::MalformedRecord {
      section,
      line: line.clone(),
      line_no: cursor.line_no()
    });
  }
  let ln = cursor.line_no();
  let xyz = &fields[fields.len()-3..];
  return Ok(Point3::new(
    parse_real(xyz[0], ln)?,
    parse_real(xyz[1], ln)?,
    parse_real(xyz[2], ln)?
  ));
}

/// Registers a record id, failing on a repeat within the same section.
fn check_unique(
  seen: &mut BTreeSet<u64>,
  section: &'static str,
  id: u64,
  line_no: usize
) -> Result<(), FabError> {
  if !seen.insert(id) {
    return Err(FabError::DuplicateId {
      section, id, line_no: Some(line_no)
    });
  }
  return Ok(());
}

/// Reads the body of a FRACTURE section: a run of planar fracture records
/// terminated by `END FRACTURE`. The header shape is fixed by `mode` for
/// the whole section.
pub fn read_planar_section<R: BufRead>(
  cursor: &mut LineCursor<R>,
  mode: HeaderMode
) -> Result<Vec<PlanarFracture>, FabError> {
  const SECTION: &str = "FRACTURE";
  let mut fractures: Vec<PlanarFracture> = Vec::new();
  let mut seen: BTreeSet<u64> = BTreeSet::new();
  loop {
    let line = match cursor.next_line()? {
      Some(line) => line,
      None => {
        return Err(FabError::UnexpectedEof {
          section: SECTION.to_string()
        });
      }
    };
    if let Some(Boundary::End(name)) = detect_boundary(&line) {
      if name.eq_ignore_ascii_case(SECTION) {
        debug!("Read {} planar fracture records.", fractures.len());
        return Ok(fractures);
      }
    }
    // header: id vertex_count (set_id|transmissivity) prop_value*
    let ln = cursor.line_no();
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
      return Err(FabError::MalformedRecord {
        section: SECTION,
        line: line.clone(),
        line_no: ln
      });
    }
    let id = parse_uint(fields[0], ln)?;
    check_unique(&mut seen, SECTION, id, ln)?;
    let vertex_count = parse_uint(fields[1], ln)? as usize;
    let third = parse_real(fields[2], ln)?;
    let (set_id, transmissivity) = match mode {
      HeaderMode::SetIdFirst => (Some(third), None),
      HeaderMode::TransmissivityFirst => (None, Some(third))
    };
    let raw_properties: Vec<String> =
      fields[3..].iter().map(|s| s.to_string()).collect();
    // the declared vertex count must be matched exactly; the preallocation
    // is capped so a bogus header count can't trigger a huge allocation
    let mut vertices: Vec<Point3<f64>> =
      Vec::with_capacity(vertex_count.min(PREALLOC_CAP));
    for got in 0..vertex_count {
      vertices.push(read_point(cursor, SECTION, id, vertex_count, got)?);
    }
    // one trailer line: the normal vector
    let normal_line = match cursor.next_line()? {
      Some(line) => line,
      None => {
        return Err(FabError::UnexpectedEof {
          section: SECTION.to_string()
        });
      }
    };
    let ln = cursor.line_no();
    let nf: Vec<&str> = normal_line.split_whitespace().collect();
    if nf.len() != 3 {
      return Err(FabError::MalformedRecord {
        section: SECTION,
        line: normal_line.clone(),
        line_no: ln
      });
    }
    let normal = Vector3::new(
      parse_real(nf[0], ln)?,
      parse_real(nf[1], ln)?,
      parse_real(nf[2], ln)?
    );
    fractures.push(PlanarFracture {
      id, set_id, transmissivity, vertices, normal, raw_properties
    });
  }
}

/// Reads the body of a TESSFRACTURE section: a run of tessellated fracture
/// records terminated by `END TESSFRACTURE`.
pub fn read_tessellated_section<R: BufRead>(
  cursor: &mut LineCursor<R>
) -> Result<Vec<TessellatedFracture>, FabError> {
  const SECTION: &str = "TESSFRACTURE";
  let mut fractures: Vec<TessellatedFracture> = Vec::new();
  let mut seen: BTreeSet<u64> = BTreeSet::new();
  loop {
    let line = match cursor.next_line()? {
      Some(line) => line,
      None => {
        return Err(FabError::UnexpectedEof {
          section: SECTION.to_string()
        });
      }
    };
    if let Some(Boundary::End(name)) = detect_boundary(&line) {
      if name.eq_ignore_ascii_case(SECTION) {
        debug!("Read {} tessellated fracture records.", fractures.len());
        return Ok(fractures);
      }
    }
    // header: id node_count face_count set_id
    let ln = cursor.line_no();
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 4 {
      return Err(FabError::MalformedRecord {
        section: SECTION,
        line: line.clone(),
        line_no: ln
      });
    }
    let id = parse_uint(fields[0], ln)?;
    check_unique(&mut seen, SECTION, id, ln)?;
    let node_count = parse_uint(fields[1], ln)? as usize;
    let face_count = parse_uint(fields[2], ln)? as usize;
    let set_id = parse_real(fields[3], ln)?;
    let mut nodes: Vec<Point3<f64>> =
      Vec::with_capacity(node_count.min(PREALLOC_CAP));
    for got in 0..node_count {
      nodes.push(read_point(cursor, SECTION, id, node_count, got)?);
    }
    // the property-field count is fixed by the record's first face line
    let mut faces: Vec<Face> = Vec::with_capacity(face_count.min(PREALLOC_CAP));
    let mut arity: Option<usize> = None;
    for got in 0..face_count {
      let face_line = match cursor.next_line()? {
        Some(line) => line,
        None => {
          return Err(FabError::RecordCountMismatch {
            section: SECTION,
            id,
            expected: face_count,
            got,
            line_no: cursor.line_no()
          });
        }
      };
      if let Some(Boundary::End(name)) = detect_boundary(&face_line) {
        if name.eq_ignore_ascii_case(SECTION) {
          return Err(FabError::RecordCountMismatch {
            section: SECTION,
            id,
            expected: face_count,
            got,
            line_no: cursor.line_no()
          });
        }
      }
      let ln = cursor.line_no();
      let ff: Vec<&str> = face_line.split_whitespace().collect();
      if ff.len() < 5 {
        return Err(FabError::MalformedRecord {
          section: SECTION,
          line: face_line.clone(),
          line_no: ln
        });
      }
      let expected_arity = *arity.get_or_insert(ff.len() - 5);
      if ff.len() - 5 != expected_arity {
        return Err(FabError::PropertyArityMismatch {
          id,
          expected: expected_arity,
          got: ff.len() - 5,
          line_no: Some(ln)
        });
      }
      let mut geometry = [0.0_f64; 5];
      for (slot, tok) in geometry.iter_mut().zip(&ff[..5]) {
        *slot = parse_real(tok, ln)?;
      }
      let properties = ff[5..]
        .iter()
        .map(|tok| parse_real(tok, ln))
        .collect::<Result<Vec<f64>, FabError>>()?;
      faces.push(Face { geometry, properties });
    }
    fractures.push(TessellatedFracture { id, set_id, nodes, faces });
  }
}
