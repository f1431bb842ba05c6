//! Drives a parse against a built `Tables<K>`: tokenizes on whitespace, then
//! runs the shift/reduce/accept stack machine described in SPEC_FULL.md §4.5.
//! Grounded on `RuntimeParser::parse` in the original C++ implementation.

use lrk_core::{error::LrkError, kstring::KString, tables::Action, LrkResult, Tables};

/// Wraps a decoded or freshly built `Tables<K>` and exposes tokenization and
/// the parse driver. Holds no grammar or item-set state: once a `Tables<K>`
/// exists, the runtime never needs the intermediate build artifacts again.
pub struct Runtime<const K: usize> {
  tables: Tables<K>,
}

impl<const K: usize> Runtime<K> {
  pub fn new(tables: Tables<K>) -> Self {
    Runtime { tables }
  }

  pub fn tables(&self) -> &Tables<K> {
    &self.tables
  }

  /// Splits `text` on whitespace and maps each piece to its symbol id.
  /// `UnknownToken` if a piece names no symbol in the table.
  pub fn tokenize(&self, text: &str) -> LrkResult<Vec<u32>> {
    text
      .split_whitespace()
      .map(|word| self.tables.symbols.id_of(word).ok_or_else(|| LrkError::UnknownToken(word.to_string())))
      .collect()
  }

  /// Runs the table-driven parse, returning the ordered list of reduced rule
  /// ids (a right-most derivation in reverse). Deterministic and
  /// allocation-only for a conflict-free grammar: there is no backtracking.
  pub fn parse(&self, text: &str) -> LrkResult<Vec<u32>> {
    let tokens = self.tokenize(text)?;
    self.parse_tokens(&tokens)
  }

  pub fn parse_tokens(&self, tokens: &[u32]) -> LrkResult<Vec<u32>> {
    let mut result = Vec::new();
    // Alternates (state, symbol, state, symbol, ..., state); the top of
    // `stack` is always a state id.
    let mut stack: Vec<u32> = vec![0];
    let mut index = 0usize;

    loop {
      let top_state = *stack.last().unwrap();
      let lookahead = self.lookahead_at(tokens, index);

      let action = self
        .tables
        .action
        .get(top_state as usize)
        .and_then(|row| row.get(&lookahead))
        .copied()
        .ok_or(LrkError::SyntaxError { position: index })?;

      match action {
        Action::Shift => {
          if index >= tokens.len() {
            return Err(LrkError::SyntaxError { position: index });
          }
          let symbol = tokens[index];
          let target = self.goto(top_state, symbol)?;
          stack.push(symbol);
          stack.push(target);
          index += 1;
        }
        Action::Reduce(rule_id) => {
          result.push(rule_id);
          let rhs_len = self.tables.rhs_len(rule_id) as usize;
          stack.truncate(stack.len() - 2 * rhs_len);
          let new_top = *stack.last().unwrap();
          let lhs = self.tables.lhs(rule_id);
          let target = self.goto(new_top, lhs)?;
          stack.push(lhs);
          stack.push(target);
        }
        Action::Accept => {
          if index != tokens.len() {
            return Err(LrkError::SyntaxError { position: index });
          }
          return Ok(result);
        }
      }
    }
  }

  fn lookahead_at(&self, tokens: &[u32], index: usize) -> KString<K> {
    let mut syms = [0u32; K];
    let mut len = 0u8;
    for (slot, &token) in syms.iter_mut().zip(tokens[index..].iter()) {
      *slot = token;
      len += 1;
    }
    KString::from_raw(syms, len)
  }

  fn goto(&self, state: u32, symbol: u32) -> LrkResult<u32> {
    self
      .tables
      .goto
      .get(state as usize)
      .and_then(|row| row.get(&symbol))
      .copied()
      .ok_or_else(|| LrkError::CorruptTable(format!("no goto entry for state {state} on symbol {symbol}")))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use lrk_core::{Builder, Grammar};

  const BASE_GRAMMAR: &str = "S -> a S b S\nS -> eps\n";

  fn runtime_k1() -> Runtime<1> {
    let g = Grammar::parse(BASE_GRAMMAR).unwrap();
    let tables = Builder::build(&g).unwrap();
    Runtime::new(tables)
  }

  #[test]
  fn parses_nested_base_grammar() {
    let rt = runtime_k1();
    // S -> a S b S, S -> a S b S, S -> eps, S -> eps, S -> eps : "a a b b"
    let derivation = rt.parse("a a b b").unwrap();
    assert!(!derivation.is_empty());
  }

  #[test]
  fn base_grammar_k1_exact_derivation() {
    let rt = runtime_k1();
    let derivation = rt.parse("a a b a b a a b b b a b").unwrap();
    assert_eq!(derivation, vec![1, 1, 1, 1, 0, 1, 0, 0, 0, 1, 1, 0, 0]);
  }

  #[test]
  fn base_grammar_k1_malformed_input_is_syntax_error() {
    let rt = runtime_k1();
    let err = rt.parse("a b b a b a").unwrap_err();
    assert!(matches!(err, LrkError::SyntaxError { .. }));
  }

  #[test]
  fn parses_empty_input_as_single_reduction() {
    let rt = runtime_k1();
    let derivation = rt.parse("").unwrap();
    // S -> eps is the only reachable reduction on empty input.
    assert_eq!(derivation.len(), 1);
  }

  #[test]
  fn unknown_token_is_rejected() {
    let rt = runtime_k1();
    let err = rt.parse("a q b").unwrap_err();
    assert!(matches!(err, LrkError::UnknownToken(ref t) if t == "q"));
  }

  #[test]
  fn malformed_input_is_a_syntax_error() {
    let rt = runtime_k1();
    // A lone `b` can never be shifted from the start state.
    let err = rt.parse("b").unwrap_err();
    assert!(matches!(err, LrkError::SyntaxError { .. }));
  }

  #[test]
  fn trailing_garbage_after_accept_point_is_a_syntax_error() {
    let rt = runtime_k1();
    let err = rt.parse("a a b b a").unwrap_err();
    assert!(matches!(err, LrkError::SyntaxError { .. }));
  }
}
