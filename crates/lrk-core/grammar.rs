use crate::{
  error::{LrkError, LrkResult},
  symbol::{NonterminalSet, SymbolTable, EPS, SEPARATOR, START_NAME},
};

/// A single numbered production `lhs -> rhs`. The RHS is a span into the
/// grammar's shared `rhs_storage` buffer rather than an owned `Vec`, so
/// productions sharing a grammar share one contiguous allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Production {
  pub lhs:       u32,
  rhs_start: u32,
  rhs_len:   u32,
}

/// A loaded, augmented grammar: read-only once construction finishes.
#[derive(Clone, Debug)]
pub struct Grammar {
  pub symbols:       SymbolTable,
  productions:   Vec<Production>,
  rhs_storage:   Vec<u32>,
  pub nonterminals:  NonterminalSet,
  /// The augmented start symbol `S'`.
  pub start_symbol:    u32,
  /// The id of the augmentation production `S' -> S`.
  pub start_production: u32,
}

impl Grammar {
  pub fn productions(&self) -> &[Production] {
    &self.productions
  }

  pub fn rhs(&self, production_id: u32) -> &[u32] {
    let p = &self.productions[production_id as usize];
    &self.rhs_storage[p.rhs_start as usize..(p.rhs_start + p.rhs_len) as usize]
  }

  pub fn rhs_len(&self, production_id: u32) -> u32 {
    self.productions[production_id as usize].rhs_len
  }

  pub fn is_nonterminal(&self, symbol: u32) -> bool {
    self.nonterminals.contains(&symbol)
  }

  /// Every production whose LHS is `lhs`, in file order.
  pub fn productions_of(&self, lhs: u32) -> impl Iterator<Item = u32> + '_ {
    self.productions.iter().enumerate().filter_map(move |(id, p)| (p.lhs == lhs).then_some(id as u32))
  }

  /// Parses a grammar from its textual source. See SPEC_FULL.md §4.1.
  pub fn parse(text: &str) -> LrkResult<Self> {
    let mut symbols = SymbolTable::new();
    let mut productions = Vec::new();
    let mut rhs_storage = Vec::new();

    for line in text.lines() {
      let tokens: Vec<&str> = line.split_whitespace().collect();
      if tokens.is_empty() {
        continue;
      }
      let lhs_name = tokens[0];
      if tokens.len() < 2 {
        return Err(LrkError::GrammarSyntax(format!("incorrect production: `{line}`")));
      }
      if tokens[1] != SEPARATOR {
        return Err(LrkError::GrammarSyntax(format!("incorrect production: `{line}` (missing `->`)")));
      }
      let lhs = symbols.intern(lhs_name);
      let rhs_tokens = &tokens[2..];

      let rhs_start = rhs_storage.len() as u32;
      let mut rhs_len = 0u32;
      if !(rhs_tokens.len() == 1 && rhs_tokens[0] == EPS) {
        for &tok in rhs_tokens {
          if tok == EPS {
            continue;
          }
          rhs_storage.push(symbols.intern(tok));
          rhs_len += 1;
        }
      }
      productions.push(Production { lhs, rhs_start, rhs_len });
    }

    let Some(original_start) = symbols.id_of(START_NAME) else {
      return Err(LrkError::GrammarSyntax("no start nonterminal `S` defined".into()));
    };

    let mut start_name = "S_0".to_string();
    while symbols.id_of(&start_name).is_some() {
      start_name.push('0');
    }
    let start_symbol = symbols.intern(&start_name);
    let start_production = productions.len() as u32;
    let rhs_start = rhs_storage.len() as u32;
    rhs_storage.push(original_start);
    productions.push(Production { lhs: start_symbol, rhs_start, rhs_len: 1 });

    let nonterminals: NonterminalSet = productions.iter().map(|p| p.lhs).collect();

    Ok(Grammar { symbols, productions, rhs_storage, nonterminals, start_symbol, start_production })
  }

  pub fn from_path(path: impl AsRef<std::path::Path>) -> LrkResult<Self> {
    let text = std::fs::read_to_string(path)?;
    Self::parse(&text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const BASE_GRAMMAR: &str = "S -> a S b S\nS -> eps\n";

  #[test]
  fn loads_base_grammar() {
    let g = Grammar::parse(BASE_GRAMMAR).unwrap();
    // 2 user productions + 1 augmentation production.
    assert_eq!(g.productions().len(), 3);
    let s = g.symbols.id_of("S").unwrap();
    let a = g.symbols.id_of("a").unwrap();
    let b = g.symbols.id_of("b").unwrap();
    assert_eq!(g.rhs(0), &[a, s, b, s]);
    assert_eq!(g.rhs(1), &[] as &[u32]);
    assert_eq!(g.rhs(2), &[s]);
    assert_eq!(g.nonterminals.len(), 2);
    assert!(g.is_nonterminal(s));
    assert!(g.is_nonterminal(g.start_symbol));
  }

  #[test]
  fn rejects_missing_arrow() {
    let err = Grammar::parse("S a b\n").unwrap_err();
    assert!(matches!(err, LrkError::GrammarSyntax(_)));
  }

  #[test]
  fn rejects_lhs_only() {
    let err = Grammar::parse("S\n").unwrap_err();
    assert!(matches!(err, LrkError::GrammarSyntax(_)));
  }

  #[test]
  fn rejects_missing_start() {
    let err = Grammar::parse("A -> a\n").unwrap_err();
    assert!(matches!(err, LrkError::GrammarSyntax(_)));
  }

  #[test]
  fn skips_blank_lines() {
    let g = Grammar::parse("S -> a S b S\n\n\nS -> eps\n").unwrap();
    assert_eq!(g.productions().len(), 3);
  }

  #[test]
  fn synthesizes_unique_start_name() {
    let g = Grammar::parse("S -> a\nS_0 -> b\n").unwrap();
    assert_ne!(g.symbols.name_of(g.start_symbol), "S_0");
    assert!(g.symbols.name_of(g.start_symbol).starts_with("S_0"));
  }
}
