use std::collections::BTreeSet;

use crate::errors::FabError;
use crate::fractures::HeaderMode;
use crate::parser::{FabParser, ParseSettings, RockBlockPolicy};
use crate::scanner::{detect_boundary, read_keyword, Boundary, SectionKind};
use crate::table::PropertyValue;
use crate::util::first_quoted;

/// A well-formed legacy-header document exercising every section kind.
const SAMPLE: &str = "\
BEGIN FORMAT
    Format = Ascii
    Length_Unit = m
END FORMAT
BEGIN PROPERTIES
    1 = \"Fracture Length\"
    2 = \"Set Name\"
    3 = \"Fracture Geometry\"
END PROPERTIES
BEGIN SETS
    1 = \"Joints\"
    2 = \"Faults\"
END SETS
BEGIN FRACTURE
    1 3 1 12.5 1 0
    1 0.0 0.0 0.0
    2 1.0 0.0 0.0
    3 0.0 1.0 2.0
    0.0 0.0 1.0
    2 4 2 8.25 2 1
    1 0.0 0.0 5.0
    2 1.0 0.0 5.0
    3 1.0 1.0 5.0
    4 0.0 1.0 5.0
    0.0 0.0 -1.0
END FRACTURE
BEGIN TESSFRACTURE
    9 4 2 1
    1 0.0 0.0 0.0
    2 1.0 0.0 0.0
    3 1.0 1.0 0.0
    4 0.0 1.0 0.0
    1 2 3 0 1 7.5 0.1
    1 3 4 0 1 7.5 0.2
END TESSFRACTURE
BEGIN ROCKBLOCK
    some 1 2 3 opaque content
END ROCKBLOCK
";

/// Parses a string with default settings.
fn parse(src: &str) -> Result<crate::document::FabDocument, FabError> {
  return FabParser::new().parse_bufread(src.as_bytes());
}

#[test]
fn full_document() {
  let doc = parse(SAMPLE).unwrap();
  // format metadata is kept verbatim
  assert_eq!(doc.format.get("Format").unwrap(), "Ascii");
  assert_eq!(doc.format.get("Length_Unit").unwrap(), "m");
  // schema preserves declaration order and strips quotes
  let names: Vec<&str> = doc.schema.names().collect();
  assert_eq!(names, ["Fracture Length", "Set Name", "Fracture Geometry"]);
  assert_eq!(doc.schema.name_of(2), Some("Set Name"));
  // set names are quote-stripped too
  assert_eq!(doc.set_names.get("1").unwrap(), "Joints");
  assert_eq!(doc.set_names.get("2").unwrap(), "Faults");
  // planar fractures
  assert_eq!(doc.fractures.len(), 2);
  let f1 = doc.fracture(1).unwrap();
  assert_eq!(f1.vertices.len(), 3);
  assert_eq!(f1.set_id, Some(1.0));
  assert_eq!(f1.transmissivity, None);
  assert_eq!(f1.normal, nalgebra::Vector3::new(0.0, 0.0, 1.0));
  assert_eq!(f1.raw_properties.len(), doc.schema.len());
  assert_eq!(doc.fracture(2).unwrap().vertices.len(), 4);
  // tessellated fractures
  assert_eq!(doc.tess_fractures.len(), 1);
  let t = doc.tess_fracture(9).unwrap();
  assert_eq!(t.nodes.len(), 4);
  assert_eq!(t.faces.len(), 2);
  assert!(t.faces.iter().all(|f| f.properties.len() == 2));
  assert_eq!(t.faces[0].geometry, [1.0, 2.0, 3.0, 0.0, 1.0]);
  assert_eq!(t.faces[1].properties, [7.5, 0.2]);
  // property table: one row per id, one column per schema entry
  assert_eq!(doc.properties.len(), 2);
  assert_eq!(doc.properties.columns(), doc.schema.names()
    .map(String::from)
    .collect::<Vec<_>>()
    .as_slice());
  assert_eq!(
    doc.properties.value(1, "Fracture Length"),
    Some(PropertyValue::Real(12.5))
  );
  assert_eq!(
    doc.properties.value(2, "Set Name"),
    Some(PropertyValue::Integer(2))
  );
  assert_eq!(
    doc.properties.value(2, "Fracture Geometry"),
    Some(PropertyValue::Integer(1))
  );
}

#[test]
fn parse_is_idempotent() {
  let a = parse(SAMPLE).unwrap();
  let b = parse(SAMPLE).unwrap();
  assert_eq!(a, b);
}

#[test]
fn document_json_roundtrip() {
  let doc = parse(SAMPLE).unwrap();
  let json = serde_json::to_string(&doc).unwrap();
  let back: crate::document::FabDocument =
    serde_json::from_str(&json).unwrap();
  assert_eq!(doc, back);
}

#[test]
fn property_table_example() {
  // the one-record example: Length is a float column, Set Name an integer
  let src = "\
BEGIN PROPERTIES
1 = \"Length\"
2 = \"Set Name\"
END PROPERTIES
BEGIN FRACTURE
7 3 2 10.5 2
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 0.0 1.0 0.0
0.0 0.0 1.0
END FRACTURE
";
  let doc = parse(src).unwrap();
  assert_eq!(doc.properties.len(), 1);
  assert_eq!(doc.properties.ids().collect::<Vec<_>>(), [7]);
  assert_eq!(
    doc.properties.value(7, "Length"),
    Some(PropertyValue::Real(10.5))
  );
  assert_eq!(
    doc.properties.value(7, "Set Name"),
    Some(PropertyValue::Integer(2))
  );
}

#[test]
fn transmissivity_header_mode() {
  let src = "\
BEGIN FRACTURE
4 3 1.25e-6
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 0.0 1.0 0.0
0.0 0.0 1.0
END FRACTURE
";
  let settings = ParseSettings {
    header_mode: HeaderMode::TransmissivityFirst,
    ..ParseSettings::default()
  };
  let doc = FabParser::with_settings(settings)
    .parse_bufread(src.as_bytes())
    .unwrap();
  let f = doc.fracture(4).unwrap();
  assert_eq!(f.set_id, None);
  assert_eq!(f.transmissivity, Some(1.25e-6));
}

#[test]
fn vertex_count_mismatch() {
  // declares 3 vertices but supplies 2 before the terminator
  let src = "\
BEGIN FRACTURE
1 3 1
1 0.0 0.0 0.0
2 1.0 0.0 0.0
END FRACTURE
";
  let err = parse(src).unwrap_err();
  assert!(matches!(
    err,
    FabError::RecordCountMismatch { section: "FRACTURE", id: 1, expected: 3, got: 2, .. }
  ));
}

#[test]
fn eof_mid_record() {
  let src = "\
BEGIN FRACTURE
1 3 1
1 0.0 0.0 0.0
";
  let err = parse(src).unwrap_err();
  assert!(matches!(err, FabError::RecordCountMismatch { .. }));
}

#[test]
fn unterminated_flat_section() {
  let src = "BEGIN FORMAT\nFormat = Ascii\n";
  let err = parse(src).unwrap_err();
  assert!(matches!(
    err,
    FabError::UnexpectedEof { ref section } if section == "FORMAT"
  ));
}

#[test]
fn unknown_section_names_the_keyword() {
  let src = "BEGIN FOOBAR\nanything\nEND FOOBAR\n";
  let err = parse(src).unwrap_err();
  match err {
    FabError::UnknownSection { keyword, line_no } => {
      assert_eq!(keyword, "FOOBAR");
      assert_eq!(line_no, 1);
    },
    other => panic!("wrong error: {}", other)
  }
}

#[test]
fn rockblock_policies() {
  // default policy decodes the rest of the file and drops the section
  let doc = parse(SAMPLE).unwrap();
  assert_eq!(doc.fractures.len(), 2);
  // the strict policy fails on sight
  let settings = ParseSettings {
    rockblock: RockBlockPolicy::Reject,
    ..ParseSettings::default()
  };
  let err = FabParser::with_settings(settings)
    .parse_bufread(SAMPLE.as_bytes())
    .unwrap_err();
  assert!(matches!(
    err,
    FabError::UnimplementedSection { ref keyword, .. } if keyword == "ROCKBLOCK"
  ));
}

#[test]
fn flat_line_without_equals() {
  let src = "BEGIN FORMAT\nno separator here\nEND FORMAT\n";
  let err = parse(src).unwrap_err();
  assert!(matches!(err, FabError::MalformedKeyword { .. }));
}

#[test]
fn property_value_without_quotes() {
  let src = "BEGIN PROPERTIES\n1 = Length\nEND PROPERTIES\n";
  let err = parse(src).unwrap_err();
  assert!(matches!(err, FabError::MalformedKeyword { .. }));
}

#[test]
fn duplicate_schema_index() {
  let src = "\
BEGIN PROPERTIES
1 = \"Length\"
1 = \"Width\"
END PROPERTIES
";
  let err = parse(src).unwrap_err();
  assert!(matches!(
    err,
    FabError::DuplicateId { section: "PROPERTIES", id: 1, .. }
  ));
}

#[test]
fn duplicate_fracture_id() {
  let src = "\
BEGIN FRACTURE
1 3 1
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 0.0 1.0 0.0
0.0 0.0 1.0
1 3 1
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 0.0 1.0 0.0
0.0 0.0 1.0
END FRACTURE
";
  let err = parse(src).unwrap_err();
  assert!(matches!(
    err,
    FabError::DuplicateId { section: "FRACTURE", id: 1, .. }
  ));
}

#[test]
fn face_property_arity_mismatch() {
  // the second face has one property where the first had two
  let src = "\
BEGIN TESSFRACTURE
9 3 2 1
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
1 2 3 0 1 7.5 0.1
1 2 3 0 1 7.5
END TESSFRACTURE
";
  let err = parse(src).unwrap_err();
  assert!(matches!(
    err,
    FabError::PropertyArityMismatch { id: 9, expected: 2, got: 1, .. }
  ));
}

#[test]
fn property_row_arity_mismatch() {
  // two schema columns, but the record header carries only one value
  let src = "\
BEGIN PROPERTIES
1 = \"Length\"
2 = \"Set Name\"
END PROPERTIES
BEGIN FRACTURE
7 3 2 10.5
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 0.0 1.0 0.0
0.0 0.0 1.0
END FRACTURE
";
  let err = parse(src).unwrap_err();
  assert!(matches!(
    err,
    FabError::PropertyArityMismatch { id: 7, expected: 2, got: 1, .. }
  ));
}

#[test]
fn malformed_normal_line() {
  // the trailer line must carry exactly 3 numeric fields
  let src = "\
BEGIN FRACTURE
1 3 1
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 0.0 1.0 0.0
0.0 1.0
END FRACTURE
";
  let err = parse(src).unwrap_err();
  assert!(matches!(
    err,
    FabError::MalformedRecord { section: "FRACTURE", .. }
  ));
}

#[test]
fn malformed_tess_header() {
  // a tessellated header is exactly: id node_count face_count set_id
  let src = "\
BEGIN TESSFRACTURE
9 4 2
END TESSFRACTURE
";
  let err = parse(src).unwrap_err();
  assert!(matches!(
    err,
    FabError::MalformedRecord { section: "TESSFRACTURE", .. }
  ));
}

#[test]
fn non_numeric_coordinate() {
  let src = "\
BEGIN FRACTURE
1 3 1
1 0.0 abc 0.0
";
  let err = parse(src).unwrap_err();
  assert!(matches!(
    err,
    FabError::BadNumber { ref token, line_no: Some(3) } if token == "abc"
  ));
}

#[test]
fn oversized_declared_count() {
  // a bogus header count must reach the count-mismatch error, not blow up
  // an up-front allocation
  let src = "\
BEGIN FRACTURE
1 99999999999999 1
1 0.0 0.0 0.0
END FRACTURE
";
  let err = parse(src).unwrap_err();
  assert!(matches!(
    err,
    FabError::RecordCountMismatch { section: "FRACTURE", id: 1, got: 1, .. }
  ));
}

#[test]
fn schema_index_token_normalization() {
  // index tokens parse numerically, so a leading zero is not preserved
  let src = "BEGIN PROPERTIES\n05 = \"Length\"\nEND PROPERTIES\n";
  let doc = parse(src).unwrap();
  assert_eq!(doc.schema.entries()[0].index, 5);
  assert_eq!(doc.schema.name_of(5), Some("Length"));
}

#[test]
fn custom_integer_columns() {
  let src = "\
BEGIN PROPERTIES
1 = \"Stage\"
END PROPERTIES
BEGIN FRACTURE
1 3 1 4.9
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 0.0 1.0 0.0
0.0 0.0 1.0
END FRACTURE
";
  let settings = ParseSettings {
    integer_columns: ["Stage".to_string()].into_iter().collect::<BTreeSet<_>>(),
    ..ParseSettings::default()
  };
  let doc = FabParser::with_settings(settings)
    .parse_bufread(src.as_bytes())
    .unwrap();
  // coercion truncates the parsed float
  assert_eq!(
    doc.properties.value(1, "Stage"),
    Some(PropertyValue::Integer(4))
  );
}

#[test]
fn boundary_detection() {
  assert_eq!(
    detect_boundary("  BEGIN FRACTURE  "),
    Some(Boundary::Begin("FRACTURE".to_string()))
  );
  assert_eq!(
    detect_boundary("END Fracture"),
    Some(Boundary::End("Fracture".to_string()))
  );
  // the prefix itself is case-sensitive
  assert_eq!(detect_boundary("begin FRACTURE"), None);
  assert_eq!(detect_boundary("1 3 1 12.5"), None);
  // the section name is matched case-insensitively
  assert_eq!(SectionKind::detect("Fracture"), Some(SectionKind::Fracture));
  assert_eq!(SectionKind::detect(" TESSFRACTURE "), Some(SectionKind::TessFracture));
  assert_eq!(SectionKind::detect("FOOBAR"), None);
}

#[test]
fn keyword_splits_on_first_equals() {
  let (k, v) = read_keyword("  Name = a = b  ", 1).unwrap();
  assert_eq!(k, "Name");
  assert_eq!(v, "a = b");
  assert!(read_keyword("no separator", 1).is_err());
}

#[test]
fn quoted_substring_extraction() {
  assert_eq!(first_quoted("5 \"Fracture Length\" trailing"), Some("Fracture Length"));
  assert_eq!(first_quoted("\"\""), Some(""));
  assert_eq!(first_quoted("no quotes"), None);
  assert_eq!(first_quoted("one \" quote"), None);
}

#[test]
fn planar_geometry_helpers() {
  let doc = parse(SAMPLE).unwrap();
  let f2 = doc.fracture(2).unwrap();
  // a unit square at z = 5
  assert_eq!(f2.mid_z(), 5.0);
  assert_eq!(f2.centroid(), nalgebra::Point3::new(0.5, 0.5, 5.0));
}
