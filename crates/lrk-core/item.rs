use std::collections::{HashSet, VecDeque};

use crate::{first_k::FirstKTable, grammar::Grammar, kstring::KString};

/// `(rule_id, dot_position, lookahead)`. Well-formed when
/// `0 <= dot <= rhs_len(rule_id)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item<const K: usize> {
  pub rule_id:   u32,
  pub dot:       u32,
  pub lookahead: KString<K>,
}

impl<const K: usize> Item<K> {
  pub fn new(rule_id: u32, dot: u32, lookahead: KString<K>) -> Self {
    Item { rule_id, dot, lookahead }
  }

  pub fn is_complete(&self, grammar: &Grammar) -> bool {
    self.dot == grammar.rhs_len(self.rule_id)
  }

  /// The symbol immediately after the dot, if any.
  pub fn next_symbol(&self, grammar: &Grammar) -> Option<u32> {
    grammar.rhs(self.rule_id).get(self.dot as usize).copied()
  }

  pub fn advanced(&self) -> Self {
    Item { dot: self.dot + 1, ..*self }
  }
}

/// A kernel is a canonicalized (sorted, deduplicated) vector of items; two
/// kernels denote the same state iff their sorted sequences are equal.
pub type Kernel<const K: usize> = Vec<Item<K>>;

pub fn canonicalize<const K: usize>(mut items: Kernel<K>) -> Kernel<K> {
  items.sort();
  items.dedup();
  items
}

/// `possible_lookaheads(grammar, first_k, rhs, from, trailing)`: computes
/// `FIRST_k(rhs[from..]) ⊕ {trailing}`, used both by closure (§4.3, with
/// `from = dot + 1`) and by shift-lookahead prediction (`from = dot`).
pub(crate) fn possible_lookaheads<const K: usize>(
  grammar: &Grammar,
  first_k: &FirstKTable<K>,
  rhs: &[u32],
  from: usize,
  trailing: KString<K>,
) -> Vec<KString<K>> {
  let mut lookaheads = vec![KString::empty()];
  for &sym in &rhs[from..] {
    lookaheads = crate::kstring::concat_sets(&lookaheads, first_k.get(sym));
  }
  crate::kstring::concat_sets(&lookaheads, &[trailing])
}

/// The closure of a kernel: the kernel plus every item derivable by the
/// closure rule, repeated until no new items appear. Grounded on
/// `Builder::closure` in the original C++ implementation.
pub fn closure<const K: usize>(grammar: &Grammar, first_k: &FirstKTable<K>, kernel: &[Item<K>]) -> Vec<Item<K>> {
  let mut result: Vec<Item<K>> = kernel.to_vec();
  let mut seen: HashSet<Item<K>> = result.iter().copied().collect();
  let mut worklist: VecDeque<usize> = (0..result.len()).collect();

  while let Some(index) = worklist.pop_front() {
    let item = result[index];
    let rhs = grammar.rhs(item.rule_id);
    let Some(next) = rhs.get(item.dot as usize).copied() else {
      continue;
    };
    if !grammar.is_nonterminal(next) {
      continue;
    }
    let lookaheads = possible_lookaheads(grammar, first_k, rhs, item.dot as usize + 1, item.lookahead);
    for rule_id in grammar.productions_of(next) {
      for &lookahead in &lookaheads {
        let candidate = Item::new(rule_id, 0, lookahead);
        if seen.insert(candidate) {
          result.push(candidate);
          worklist.push_back(result.len() - 1);
        }
      }
    }
  }
  result
}

pub(crate) use possible_lookaheads as shift_lookaheads;

#[cfg(test)]
mod tests {
  use super::*;
  use crate::first_k::FirstKTable;

  const BASE_GRAMMAR: &str = "S -> a S b S\nS -> eps\n";

  #[test]
  fn closure_of_start_item() {
    let g = Grammar::parse(BASE_GRAMMAR).unwrap();
    let first_k: FirstKTable<1> = FirstKTable::compute(&g);
    let start = Item::new(g.start_production, 0, KString::empty());
    let c = closure(&g, &first_k, &[start]);
    // start item + S->aSbS at dot 0 + S->eps at dot 0, all under lookahead ε.
    assert_eq!(c.len(), 3);
    assert!(c.contains(&start));
    assert!(c.contains(&Item::new(0, 0, KString::empty())));
    assert!(c.contains(&Item::new(1, 0, KString::empty())));
  }

  #[test]
  fn closure_of_complete_item_is_itself() {
    let g = Grammar::parse(BASE_GRAMMAR).unwrap();
    let first_k: FirstKTable<1> = FirstKTable::compute(&g);
    let complete = Item::new(0, 4, KString::empty());
    let c = closure(&g, &first_k, &[complete]);
    assert_eq!(c, vec![complete]);
  }

  #[test]
  fn closure_of_empty_kernel_is_empty() {
    let g = Grammar::parse(BASE_GRAMMAR).unwrap();
    let first_k: FirstKTable<1> = FirstKTable::compute(&g);
    let c: Vec<Item<1>> = closure(&g, &first_k, &[]);
    assert!(c.is_empty());
  }
}
