//! A command-line application to convert the property table of a .fab file
//! to CSV.

#![allow(clippy::needless_return)]

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use fab::prelude::*;
use log::{error, info, LevelFilter};

/// The arguments passed to the converter.
#[derive(Clone, Debug, Parser)]
#[command(author, version, about)]
struct Cli {
  /// Read current-form fracture headers (transmissivity instead of set id).
  #[arg(short = 't', long)]
  transmissivity: bool,
  /// Fail on ROCKBLOCK sections instead of skipping them.
  #[arg(short = 'R', long)]
  reject_rockblock: bool,
  /// Only output rows for the specified fracture ids. Can be specified more
  /// than once, or comma-separated. If absent, all rows are written.
  #[arg(short = 'i', long = "ids", num_args = 0.., value_delimiter = ',')]
  ids: Vec<u64>,
  /// The delimiter used in the CSV.
  #[arg(short = 'd', long = "delim", default_value = ",")]
  delim: char,
  /// Suppress the header row.
  #[arg(short = 'H', long)]
  no_headers: bool,
  /// Output extra/debug info while parsing and converting.
  #[arg(short, long)]
  verbose: bool,
  /// Path to write output to. If absent, writes to standard output.
  #[arg(short = 'o')]
  output: Option<PathBuf>,
  /// The name of the input .fab file. If -, reads from standard input.
  input: PathBuf
}

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
  let parsed = if args.input.as_os_str().eq_ignore_ascii_case("-") {
    parser.parse_bufread(BufReader::new(io::stdin()))
  } else if args.input.is_file() {
    if let Some(bn) = args.input.file_name().and_then(|s| s.to_str()) {
      info!("Parsing {}...", bn);
    }
    parser.parse_file(&args.input)
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
  if let Err(e) = write_csv(&doc, &args) {
    error!("Could not write CSV: {}", e);
    return ExitCode::FAILURE;
  }
  info!("All done.");
  return ExitCode::SUCCESS;
}

/// Writes the document's property table as CSV per the given arguments.
fn write_csv(doc: &FabDocument, args: &Cli) -> io::Result<()> {
  let output: BufWriter<Box<dyn Write>> = BufWriter::new(
    if let Some(ref op) = args.output {
      Box::new(File::create(op)?)
    } else {
      Box::new(io::stdout())
    }
  );
  let delim_byte: u8 = args.delim.try_into()
    .expect("delimiter must be a single-byte character");
  let mut wtr = csv::WriterBuilder::new()
    .delimiter(delim_byte)
    .from_writer(output);
  let table = &doc.properties;
  if !args.no_headers {
    let header = std::iter::once("id")
      .chain(table.columns().iter().map(|c| c.as_str()));
    wtr.write_record(header)?;
  }
  let id_filter = |id: u64| args.ids.is_empty() || args.ids.contains(&id);
  info!("Writing CSV records...");
  for id in table.ids().filter(|id| id_filter(*id)) {
    let row = table.row(id).unwrap_or(&[]);
    let fields = std::iter::once(id.to_string())
      .chain(row.iter().map(|v| v.to_string()));
    wtr.write_record(fields)?;
  }
  wtr.flush()?;
  return Ok(());
}
