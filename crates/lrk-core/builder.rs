use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::{
  error::{LrkError, LrkResult},
  first_k::FirstKTable,
  grammar::Grammar,
  item::{canonicalize, closure, shift_lookaheads, Item, Kernel},
  kstring::KString,
  tables::{Action, TableProduction, Tables},
};

/// Version tag for the diagnostic text printed by `auto_print_errors`, kept
/// stable so CI logs that grep for it don't silently drift across releases.
pub const DIAGNOSTICS_VERSION: &str = "lrk-builder-diagnostics-v1";

/// Builds the canonical LR(k) tables for `grammar` under lookahead bound `K`.
/// Grounded on `Builder::build` / `Builder::closure` in the original C++
/// implementation, translated to Rust's ownership model: kernels are
/// interned by value in a `HashMap<Kernel<K>, u32>` rather than by pointer
/// into a `std::deque`, since Rust has no stable-address growable deque
/// equivalent to reach for here.
pub struct Builder<'g, const K: usize> {
  grammar:  &'g Grammar,
  first_k:  FirstKTable<K>,
}

impl<'g, const K: usize> Builder<'g, K> {
  pub fn new(grammar: &'g Grammar) -> Self {
    Builder { grammar, first_k: FirstKTable::compute(grammar) }
  }

  pub fn build(grammar: &'g Grammar) -> LrkResult<Tables<K>> {
    Builder::new(grammar).run()
  }

  fn run(&self) -> LrkResult<Tables<K>> {
    let grammar = self.grammar;

    let mut states: Vec<Kernel<K>> = Vec::new();
    let mut index: HashMap<Kernel<K>, u32> = HashMap::new();
    let mut goto: Vec<BTreeMap<u32, u32>> = Vec::new();
    let mut action: Vec<BTreeMap<KString<K>, Action>> = Vec::new();

    let initial = canonicalize(vec![Item::new(grammar.start_production, 0, KString::empty())]);
    index.insert(initial.clone(), 0);
    states.push(initial);
    goto.push(BTreeMap::new());
    action.push(BTreeMap::new());

    let mut worklist: VecDeque<u32> = VecDeque::from([0]);

    while let Some(state) = worklist.pop_front() {
      let closed = closure(grammar, &self.first_k, &states[state as usize]);

      let mut buckets: Vec<(u32, Vec<Item<K>>)> = Vec::new();
      let mut bucket_of: HashMap<u32, usize> = HashMap::new();

      for item in closed {
        let rhs = grammar.rhs(item.rule_id);

        if item.dot as usize == rhs.len() {
          self.install_reduce(&mut action[state as usize], state, item)?;
          continue;
        }

        let next = rhs[item.dot as usize];
        let slot = *bucket_of.entry(next).or_insert_with(|| {
          buckets.push((next, Vec::new()));
          buckets.len() - 1
        });
        buckets[slot].1.push(item.advanced());

        if !grammar.is_nonterminal(next) {
          let lookaheads = shift_lookaheads(grammar, &self.first_k, rhs, item.dot as usize, item.lookahead);
          for lookahead in lookaheads {
            self.install_shift(&mut action[state as usize], state, lookahead)?;
          }
        }
      }

      for (symbol, items) in buckets {
        let kernel = canonicalize(items);
        let target = if let Some(&existing) = index.get(&kernel) {
          existing
        } else {
          let id = states.len() as u32;
          index.insert(kernel.clone(), id);
          states.push(kernel);
          goto.push(BTreeMap::new());
          action.push(BTreeMap::new());
          worklist.push_back(id);
          id
        };
        goto[state as usize].insert(symbol, target);
      }
    }

    self.install_accept(grammar, &mut goto, &mut action)?;

    let productions = grammar
      .productions()
      .iter()
      .enumerate()
      .map(|(id, p)| TableProduction { lhs: p.lhs, rhs: grammar.rhs(id as u32).to_vec() })
      .collect();

    Ok(Tables { symbols: grammar.symbols.clone(), productions, goto, action })
  }

  fn install_reduce(&self, cell: &mut BTreeMap<KString<K>, Action>, state: u32, item: Item<K>) -> LrkResult<()> {
    if item.rule_id > u32::MAX - 2 {
      return Err(LrkError::BuildConflict(format!(
        "rule id {} in state {state} has no room in the action code space (reduce codes start at 2)",
        item.rule_id
      )));
    }
    match cell.get(&item.lookahead) {
      Some(Action::Reduce(_)) => self.conflict(state, item.lookahead, "reduce/reduce"),
      Some(Action::Shift) => self.conflict(state, item.lookahead, "shift/reduce"),
      Some(Action::Accept) => self.conflict(state, item.lookahead, "accept/reduce"),
      None => {
        cell.insert(item.lookahead, Action::Reduce(item.rule_id));
        Ok(())
      }
    }
  }

  fn install_shift(&self, cell: &mut BTreeMap<KString<K>, Action>, state: u32, lookahead: KString<K>) -> LrkResult<()> {
    match cell.get(&lookahead) {
      Some(Action::Reduce(_)) => self.conflict(state, lookahead, "shift/reduce"),
      Some(Action::Shift) | None => {
        cell.insert(lookahead, Action::Shift);
        Ok(())
      }
      Some(Action::Accept) => self.conflict(state, lookahead, "shift/accept"),
    }
  }

  fn conflict(&self, state: u32, lookahead: KString<K>, kind: &str) -> LrkResult<()> {
    let message = format!("{kind} conflict in state {state} on lookahead {:?}", lookahead.as_slice());
    #[cfg(feature = "auto_print_errors")]
    eprintln!("[{DIAGNOSTICS_VERSION}] {message}");
    Err(LrkError::BuildConflict(message))
  }

  fn install_accept(
    &self,
    grammar: &Grammar,
    goto: &mut [BTreeMap<u32, u32>],
    action: &mut [BTreeMap<KString<K>, Action>],
  ) -> LrkResult<()> {
    let start_rhs = grammar.rhs(grammar.start_production);
    let accept_symbol = start_rhs[0];
    let Some(&accept_state) = goto[0].get(&accept_symbol) else {
      return Err(LrkError::CorruptTable(format!(
        "no state reachable from state 0 on start symbol {accept_symbol}"
      )));
    };
    // Mirrors the original's unconditional `operator[]` assignment: the
    // augmentation production's own completed item would otherwise sit here
    // as a `Reduce`, and accept is meant to replace it, not conflict with it.
    action[accept_state as usize].insert(KString::empty(), Action::Accept);
    Ok(())
  }
}
