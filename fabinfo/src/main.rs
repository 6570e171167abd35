//! Dumps information on a .fab file: format metadata, the property schema,
//! set names, fracture counts and the shape of the property table.

#![allow(clippy::needless_return)]

use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use fab::prelude::*;
use itertools::Itertools;
use log::{error, info, LevelFilter};

#[derive(Parser)]
#[command(author, version)]
struct Cli {
  /// Read current-form fracture headers (transmissivity instead of set id).
  #[arg(short = 't', long)]
  transmissivity: bool,
  /// Fail on ROCKBLOCK sections instead of skipping them.
  #[arg(short = 'R', long)]
  reject_rockblock: bool,
  /// Dump the whole parsed document as JSON instead of a summary.
  #[arg(short, long)]
  json: bool,
  /// Output extra/debug info while parsing.
  #[arg(short, long)]
  verbose: bool,
  /// File path (set to "-" to read from standard input).
  file: PathBuf
}

const INDENT: &str = "  ";

fn main() -> ExitCode {
  // init cli stuff
  let args = Cli::parse();
  let log_level = if args.verbose {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  };
  env_logger::builder().filter_level(log_level).init();
  let settings = ParseSettings {
    header_mode: if args.transmissivity {
      HeaderMode::TransmissivityFirst
    } else {
      HeaderMode::SetIdFirst
    },
    rockblock: if args.reject_rockblock {
      RockBlockPolicy::Reject
    } else {
      RockBlockPolicy::Skip
    },
    ..ParseSettings::default()
  };
  let parser = FabParser::with_settings(settings);
  // parse the file
  let parsed = if args.file.as_os_str().eq_ignore_ascii_case("-") {
    parser.parse_bufread(BufReader::new(io::stdin()))
  } else if args.file.is_file() {
    if let Some(bn) = args.file.file_name().and_then(|s| s.to_str()) {
      info!("Parsing {}...", bn);
    }
    parser.parse_file(&args.file)
  } else {
    error!("Provided path either does not exist or is not a file!");
    return ExitCode::FAILURE;
  };
  let doc: FabDocument = match parsed {
    Ok(doc) => doc,
    Err(e) => {
      error!("Parse failed: {}", e);
      return ExitCode::FAILURE;
    }
  };
  info!("Done parsing.");
  if args.json {
    match serde_json::to_string_pretty(&doc) {
      Ok(s) => println!("{}", s),
      Err(e) => {
        error!("Could not serialize document: {}", e);
        return ExitCode::FAILURE;
      }
    }
    return ExitCode::SUCCESS;
  }
  // format metadata
  if doc.format.is_empty() {
    info!("No format metadata found.");
  } else {
    info!("Format metadata:");
    for (key, value) in doc.format.iter() {
      info!("{}- {} = {}", INDENT, key, value);
    }
  }
  // schema
  if doc.schema.is_empty() {
    info!("No property schema declared.");
  } else {
    info!(
      "Property schema ({} columns): {}.",
      doc.schema.len(),
      doc.schema.names().join(", ")
    );
  }
  // sets
  if doc.set_names.is_empty() {
    info!("No set names declared.");
  } else {
    info!("Set names:");
    for (id, name) in doc.set_names.iter() {
      info!("{}- {} = {}", INDENT, id, name);
    }
  }
  // fracture counts
  info!("Planar fractures: {}.", doc.fractures.len());
  let total_vertices: usize =
    doc.fractures.iter().map(|f| f.vertices.len()).sum();
  if !doc.fractures.is_empty() {
    info!("{}- Total vertices: {}.", INDENT, total_vertices);
  }
  info!("Tessellated fractures: {}.", doc.tess_fractures.len());
  let total_nodes: usize =
    doc.tess_fractures.iter().map(|f| f.nodes.len()).sum();
  let total_faces: usize =
    doc.tess_fractures.iter().map(|f| f.faces.len()).sum();
  if !doc.tess_fractures.is_empty() {
    info!("{}- Total nodes: {}.", INDENT, total_nodes);
    info!("{}- Total faces: {}.", INDENT, total_faces);
  }
  // table shape
  info!(
    "Property table: {} rows, {} columns.",
    doc.properties.len(),
    doc.properties.columns().len()
  );
  return ExitCode::SUCCESS;
}
