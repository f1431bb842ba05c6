use std::fmt::{self, Display};

/// Every error a grammar load, analysis, build, encode, decode, or parse can
/// produce. No partial results are ever produced alongside an `Err`: callers
/// that write output files should build the full output before touching disk.
#[derive(Clone, Debug)]
pub enum LrkError {
  /// Malformed production line, missing `->`, or a grammar with no `S`
  /// non-terminal.
  GrammarSyntax(String),
  /// A shift/reduce or reduce/reduce conflict was found while building the
  /// canonical LR(k) tables.
  BuildConflict(String),
  /// The table file's `k` does not match the runtime's compile-time `K`.
  KMismatch { expected: i32, found: i32 },
  /// A file could not be opened, read, or written.
  IOError(String),
  /// The input text contains a word that is not a known symbol name.
  UnknownToken(String),
  /// No action is defined for the current `(state, lookahead)` pair.
  SyntaxError { position: usize },
  /// The binary table is internally inconsistent: a missing GOTO after a
  /// SHIFT, mismatched state counts, or an out-of-range index.
  CorruptTable(String),
}

use LrkError::*;

impl Display for LrkError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GrammarSyntax(msg) => write!(f, "grammar syntax error: {msg}"),
      BuildConflict(msg) => write!(f, "build conflict: {msg}"),
      KMismatch { expected, found } => {
        write!(f, "lookahead mismatch: table was built with k={found}, runtime expects k={expected}")
      }
      IOError(msg) => write!(f, "io error: {msg}"),
      UnknownToken(tok) => write!(f, "unknown token: {tok}"),
      SyntaxError { position } => write!(f, "syntax error at token {position}"),
      CorruptTable(msg) => write!(f, "corrupt table: {msg}"),
    }
  }
}

impl std::error::Error for LrkError {}

impl From<std::io::Error> for LrkError {
  fn from(err: std::io::Error) -> Self {
    IOError(err.to_string())
  }
}

impl From<std::num::TryFromIntError> for LrkError {
  fn from(err: std::num::TryFromIntError) -> Self {
    CorruptTable(format!("value out of range for the table wire format: {err}"))
  }
}

pub type LrkResult<T> = Result<T, LrkError>;
