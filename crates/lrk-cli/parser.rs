use std::{path::PathBuf, process::ExitCode};

use clap::{arg, value_parser, Command};
use lrk_runtime::Runtime;

fn command() -> clap::ArgMatches {
  Command::new("LR-k parser")
    .version("1.0.1-beta1")
    .about("Parses a text input against a previously compiled LR(k) table.")
    .arg(
      arg!(-i --input_table <TABLE_PATH> "Path to the compiled table file")
        .required(true)
        .value_parser(value_parser!(PathBuf)),
    )
    .arg(arg!(-t --text <TEXT_PATH> "Path to the input text file").required(true).value_parser(value_parser!(PathBuf)))
    .arg(
      arg!(-o --output <DERIVATION_PATH> "Path the derivation (reduced rule ids) is written to")
        .required(false)
        .default_value("tree")
        .value_parser(value_parser!(PathBuf)),
    )
    .get_matches()
}

fn run() -> Result<(), lrk_core::LrkError> {
  let matches = command();
  let table_path = matches.get_one::<PathBuf>("input_table").unwrap();
  let text_path = matches.get_one::<PathBuf>("text").unwrap();
  let output_path = matches.get_one::<PathBuf>("output").unwrap();

  let bytes = std::fs::read(table_path)?;
  let tables = lrk_codec::decode::<{ lrk_cli::LOOKAHEAD }>(&bytes)?;
  let runtime = Runtime::new(tables);

  let text = std::fs::read_to_string(text_path)?;
  let derivation = runtime.parse(&text)?;

  let rendered = derivation.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(" ");
  std::fs::write(output_path, format!("{rendered}\n"))?;
  Ok(())
}

fn main() -> ExitCode {
  match run() {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("lrk-parser: {err}");
      ExitCode::FAILURE
    }
  }
}
