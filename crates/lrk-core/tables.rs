use std::collections::BTreeMap;

use crate::{kstring::KString, symbol::SymbolTable};

/// `0 = SHIFT`, `1 = ACCEPT`, `n + 2 = REDUCE(n)`. Mirrors the single-integer
/// encoding used by the original C++ bytecode and kept as the on-disk and
/// in-memory tag so codec and runtime agree on one vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
  Shift,
  Accept,
  Reduce(u32),
}

impl Action {
  pub fn to_code(self) -> u32 {
    match self {
      Action::Shift => 0,
      Action::Accept => 1,
      Action::Reduce(rule_id) => rule_id + 2,
    }
  }

  pub fn from_code(code: u32) -> Self {
    match code {
      0 => Action::Shift,
      1 => Action::Accept,
      n => Action::Reduce(n - 2),
    }
  }
}

/// A single numbered production as stored for codec/runtime consumption:
/// the RHS is copied out of the grammar's shared storage into an owned
/// `Vec` here since `Tables<K>` outlives the `Grammar` it was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableProduction {
  pub lhs: u32,
  pub rhs: Vec<u32>,
}

/// The immutable artifact produced by `Builder::<K>::build` and consumed by
/// both the codec and the runtime. Once returned from `build`, a `Tables<K>`
/// is never mutated again.
/// `HashMap` inside `SymbolTable` implements `PartialEq` but not `Eq`, so
/// `Tables<K>` stops there too: enough for the build-idempotence test, not
/// for use as a `HashMap`/`HashSet` key.
#[derive(Clone, Debug, PartialEq)]
pub struct Tables<const K: usize> {
  pub symbols:     SymbolTable,
  pub productions: Vec<TableProduction>,
  pub goto:        Vec<BTreeMap<u32, u32>>,
  pub action:      Vec<BTreeMap<KString<K>, Action>>,
}

impl<const K: usize> Tables<K> {
  pub fn state_count(&self) -> usize {
    self.goto.len()
  }

  pub fn rhs_len(&self, rule_id: u32) -> u32 {
    self.productions[rule_id as usize].rhs.len() as u32
  }

  pub fn lhs(&self, rule_id: u32) -> u32 {
    self.productions[rule_id as usize].lhs
  }
}
