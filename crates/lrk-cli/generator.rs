use std::{path::PathBuf, process::ExitCode};

use clap::{arg, value_parser, Command};
use lrk_core::{Builder, Grammar, Tables};

fn command() -> clap::ArgMatches {
  Command::new("LR-k generator")
    .version("1.0.1-beta2")
    .about("Builds canonical LR(k) parse tables from a grammar file.")
    .arg(
      arg!(-i --input <GRAMMAR_PATH> "Path to the input grammar file")
        .required(true)
        .value_parser(value_parser!(PathBuf)),
    )
    .arg(
      arg!(-o --output <TABLE_PATH> "Path the compiled table file is written to")
        .required(false)
        .default_value("table")
        .value_parser(value_parser!(PathBuf)),
    )
    .get_matches()
}

fn run() -> Result<(), lrk_core::LrkError> {
  let matches = command();
  let input = matches.get_one::<PathBuf>("input").unwrap();
  let output = matches.get_one::<PathBuf>("output").unwrap();

  let grammar = Grammar::from_path(input)?;
  let tables: Tables<{ lrk_cli::LOOKAHEAD }> = Builder::build(&grammar)?;
  let bytes = lrk_codec::encode(&tables)?;
  std::fs::write(output, bytes)?;
  Ok(())
}

fn main() -> ExitCode {
  match run() {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("lrk-generator: {err}");
      ExitCode::FAILURE
    }
  }
}
