use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
  grammar::Grammar,
  kstring::{concat_sets, merge_sets, KString, LookaheadSet},
};

/// `FIRST_k(X)` for every symbol `X` in a grammar, computed once up front and
/// reused by every closure call during the build. Grounded on the fixed-point
/// loop in the original `GrammarAnalysis::compute_first_k`.
#[derive(Clone, Debug)]
pub struct FirstKTable<const K: usize> {
  sets: Vec<LookaheadSet<K>>,
}

impl<const K: usize> FirstKTable<K> {
  pub fn get(&self, symbol: u32) -> &[KString<K>] {
    &self.sets[symbol as usize]
  }

  /// Runs the fixed-point computation described in SPEC_FULL.md §4.2, driven
  /// by a worklist rather than repeated full passes: terminals start (and
  /// stay) as `{ [X] }`; non-terminals start empty and are recomputed from
  /// their own productions only when something they depend on has just
  /// changed. Grounded on `GrammarAnalysis::build_kfirst`'s reverse-dependency
  /// multimap (`original_source/lr-k/include/first_k.hpp`): for every
  /// nonterminal that appears in a production's RHS, that production's LHS is
  /// recorded as a dependent, so a change to the nonterminal's set re-enqueues
  /// every LHS that needs to see it. An "already enqueued" `HashSet` keeps
  /// the worklist from holding duplicates, mirroring `item::closure`.
  pub fn compute(grammar: &Grammar) -> Self {
    let symbol_count = grammar.symbols.len();
    let mut sets: Vec<LookaheadSet<K>> = Vec::with_capacity(symbol_count);
    for id in 0..symbol_count as u32 {
      if grammar.is_nonterminal(id) {
        sets.push(Vec::new());
      } else {
        sets.push(vec![KString::single(id)]);
      }
    }

    let mut depends: HashMap<u32, Vec<u32>> = HashMap::new();
    for (rhs_id, production) in grammar.productions().iter().enumerate() {
      for &sym in grammar.rhs(rhs_id as u32) {
        if grammar.is_nonterminal(sym) {
          depends.entry(sym).or_default().push(production.lhs);
        }
      }
    }

    let mut worklist: VecDeque<u32> = VecDeque::new();
    let mut enqueued: HashSet<u32> = HashSet::new();
    for id in 0..symbol_count as u32 {
      if grammar.is_nonterminal(id) {
        worklist.push_back(id);
        enqueued.insert(id);
      }
    }

    while let Some(nt) = worklist.pop_front() {
      enqueued.remove(&nt);

      let mut result: LookaheadSet<K> = Vec::new();
      for production_id in grammar.productions_of(nt) {
        let rhs = grammar.rhs(production_id);
        let mut first_of_rhs = vec![KString::empty()];
        for &sym in rhs {
          first_of_rhs = concat_sets(&first_of_rhs, &sets[sym as usize]);
        }
        merge_sets(&mut result, &first_of_rhs);
      }

      if merge_sets(&mut sets[nt as usize], &result) {
        if let Some(dependents) = depends.get(&nt) {
          for &dependent in dependents {
            if enqueued.insert(dependent) {
              worklist.push_back(dependent);
            }
          }
        }
      }
    }

    FirstKTable { sets }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const BASE_GRAMMAR: &str = "S -> a S b S\nS -> eps\n";

  #[test]
  fn terminal_first_is_itself() {
    let g = Grammar::parse(BASE_GRAMMAR).unwrap();
    let table: FirstKTable<1> = FirstKTable::compute(&g);
    let a = g.symbols.id_of("a").unwrap();
    assert_eq!(table.get(a), &[KString::single(a)]);
  }

  #[test]
  fn nonterminal_first_k1_includes_epsilon_and_a() {
    let g = Grammar::parse(BASE_GRAMMAR).unwrap();
    let table: FirstKTable<1> = FirstKTable::compute(&g);
    let s = g.symbols.id_of("S").unwrap();
    let a = g.symbols.id_of("a").unwrap();
    let first_s = table.get(s);
    assert!(first_s.contains(&KString::empty()));
    assert!(first_s.contains(&KString::single(a)));
    assert_eq!(first_s.len(), 2);
  }

  #[test]
  fn start_symbol_first_matches_original_start() {
    let g = Grammar::parse(BASE_GRAMMAR).unwrap();
    let table: FirstKTable<1> = FirstKTable::compute(&g);
    let s = g.symbols.id_of("S").unwrap();
    assert_eq!(table.get(g.start_symbol), table.get(s));
  }

  #[test]
  fn k_zero_collapses_every_first_set_to_epsilon() {
    let g = Grammar::parse(BASE_GRAMMAR).unwrap();
    let table: FirstKTable<0> = FirstKTable::compute(&g);
    let s = g.symbols.id_of("S").unwrap();
    assert_eq!(table.get(s), &[KString::empty()]);
  }

  #[test]
  fn first_3_exact_sets_reconstructed_from_spec_scenario() {
    // S -> A B C, with A/B/C chosen so that FIRST_3 comes out to exactly
    // { abb, acd, ad, bbc, bbd, cdc, d } for S.
    let text = "S -> A B C\nA -> a\nA -> eps\nB -> b b\nB -> eps\nC -> c d c\nC -> d\n";
    let g = Grammar::parse(text).unwrap();
    let table: FirstKTable<3> = FirstKTable::compute(&g);

    let k3 = |s: &str| -> KString<3> {
      let mut out = KString::empty();
      for ch in s.chars() {
        let id = g.symbols.id_of(&ch.to_string()).unwrap();
        out = out.concat(&KString::single(id));
      }
      out
    };
    let sorted = |mut v: Vec<KString<3>>| {
      v.sort();
      v
    };

    let a = g.symbols.id_of("A").unwrap();
    let b = g.symbols.id_of("B").unwrap();
    let c = g.symbols.id_of("C").unwrap();
    let s = g.symbols.id_of("S").unwrap();

    let mut expect_a = vec![k3("a"), KString::empty()];
    expect_a.sort();
    assert_eq!(sorted(table.get(a).to_vec()), expect_a);

    let mut expect_b = vec![k3("bb"), KString::empty()];
    expect_b.sort();
    assert_eq!(sorted(table.get(b).to_vec()), expect_b);

    let mut expect_c = vec![k3("cdc"), k3("d")];
    expect_c.sort();
    assert_eq!(sorted(table.get(c).to_vec()), expect_c);

    let mut expect_s = vec![k3("abb"), k3("acd"), k3("ad"), k3("bbc"), k3("bbd"), k3("cdc"), k3("d")];
    expect_s.sort();
    assert_eq!(sorted(table.get(s).to_vec()), expect_s);
  }

  #[test]
  fn first_3_exact_set_on_recursive_grammar() {
    // S -> a S | eps : FIRST_3(S) = { eps, a, aa, aaa }
    let g = Grammar::parse("S -> a S\nS -> eps\n").unwrap();
    let table: FirstKTable<3> = FirstKTable::compute(&g);
    let s = g.symbols.id_of("S").unwrap();
    let a = g.symbols.id_of("a").unwrap();
    let mut expect = vec![
      KString::<3>::empty(),
      KString::<3>::single(a),
      KString::<3>::single(a).concat(&KString::single(a)),
      KString::<3>::single(a).concat(&KString::single(a)).concat(&KString::single(a)),
    ];
    expect.sort();
    let mut got = table.get(s).to_vec();
    got.sort();
    assert_eq!(got, expect);
  }
}
