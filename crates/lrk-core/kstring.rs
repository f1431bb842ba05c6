use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A bounded sequence of up to `K` terminal ids, with an explicit length. The
/// original C++ implementation used a fixed-size `std::array<int, K>` plus a
/// `len` field so that lookahead strings never allocate; the const generic
/// `K` gives the same shape in Rust.
#[derive(Clone, Copy, Debug)]
pub struct KString<const K: usize> {
  syms: [u32; K],
  len:  u8,
}

impl<const K: usize> Default for KString<K> {
  fn default() -> Self {
    Self::empty()
  }
}

impl<const K: usize> KString<K> {
  pub fn empty() -> Self {
    KString { syms: [0; K], len: 0 }
  }

  /// A length-1 `KString` holding a single terminal. Only meaningful when
  /// `K > 0`; for `K == 0` every `KString` collapses to the empty string, as
  /// specified for the FIRST_0 analyzer.
  pub fn single(sym: u32) -> Self {
    let mut syms = [0; K];
    if K > 0 {
      syms[0] = sym;
      return KString { syms, len: 1 };
    }
    KString { syms, len: 0 }
  }

  pub fn len(&self) -> usize {
    self.len as usize
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn as_slice(&self) -> &[u32] {
    &self.syms[..self.len as usize]
  }

  /// Reconstructs a `KString` from its raw parts, used by the codec when
  /// decoding a stored `(syms, len)` pair back into a value of this type.
  pub fn from_raw(syms: [u32; K], len: u8) -> Self {
    KString { syms, len }
  }

  pub fn syms(&self) -> &[u32; K] {
    &self.syms
  }

  /// `a ⊕ b`: truncation of `a · b` to at most `K` symbols. Identity when
  /// either side is empty or `self` is already at length `K`.
  pub fn concat(&self, other: &Self) -> Self {
    if self.len as usize == K {
      return *self;
    }
    let mut result = *self;
    for &sym in other.as_slice() {
      if result.len as usize >= K {
        break;
      }
      result.syms[result.len as usize] = sym;
      result.len += 1;
    }
    result
  }
}

impl<const K: usize> PartialEq for KString<K> {
  fn eq(&self, other: &Self) -> bool {
    self.as_slice() == other.as_slice()
  }
}

impl<const K: usize> Eq for KString<K> {}

impl<const K: usize> PartialOrd for KString<K> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<const K: usize> Ord for KString<K> {
  /// Lexicographic by `(prefix, length)`, matching the original's
  /// `operator<=>`: compare shared symbols first, then break ties by length.
  fn cmp(&self, other: &Self) -> Ordering {
    self.as_slice().cmp(other.as_slice())
  }
}

impl<const K: usize> Hash for KString<K> {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.as_slice().hash(state);
  }
}

/// A sorted, deduplicated set of `KString<K>`s.
pub type LookaheadSet<const K: usize> = Vec<KString<K>>;

/// Merges two already-sorted, deduplicated lookahead sets. Returns `true` if
/// `into` changed, mirroring `GrammarAnalysis::merge_lookahead_lists`'s report
/// of whether the fixed-point is still moving.
pub fn merge_sets<const K: usize>(into: &mut Vec<KString<K>>, other: &[KString<K>]) -> bool {
  if into.as_slice() == other {
    return false;
  }
  let mut merged = Vec::with_capacity(into.len() + other.len());
  let (mut i, mut j) = (0, 0);
  while i < into.len() || j < other.len() {
    let take_left = j == other.len() || (i != into.len() && into[i] < other[j]);
    let candidate = if take_left { into[i] } else { other[j] };
    if merged.last() != Some(&candidate) {
      merged.push(candidate);
    }
    if take_left {
      i += 1;
    } else {
      j += 1;
    }
  }
  let changed = *into != merged;
  *into = merged;
  changed
}

/// `⊕` lifted to sets: the cartesian concatenation of every pair, sorted and
/// deduplicated. Mirrors `GrammarAnalysis::k_concat`.
pub fn concat_sets<const K: usize>(lhs: &[KString<K>], rhs: &[KString<K>]) -> Vec<KString<K>> {
  let mut result = Vec::with_capacity(lhs.len() * rhs.len().max(1));
  for l in lhs {
    if l.len() == K {
      result.push(*l);
      continue;
    }
    for r in rhs {
      result.push(l.concat(r));
    }
  }
  result.sort();
  result.dedup();
  result
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn concat_truncates_to_k() {
    let a = KString::<2>::single(1);
    let b = KString::<2>::single(2);
    let c = a.concat(&b);
    assert_eq!(c.as_slice(), &[1, 2]);
    let d = c.concat(&KString::<2>::single(3));
    assert_eq!(d.as_slice(), &[1, 2]);
  }

  #[test]
  fn empty_is_identity() {
    let a = KString::<3>::single(7);
    assert_eq!(a.concat(&KString::empty()), a);
    assert_eq!(KString::<3>::empty().concat(&a), a);
  }

  #[test]
  fn concat_is_associative() {
    let a = KString::<3>::single(1);
    let b = KString::<3>::single(2);
    let c = KString::<3>::single(3);
    assert_eq!(a.concat(&b).concat(&c), a.concat(&b.concat(&c)));
  }

  #[test]
  fn ordering_is_lexicographic_then_length() {
    let short = KString::<3>::single(1);
    let mut long = short;
    long = long.concat(&KString::single(0));
    assert!(short < long);
  }

  #[test]
  fn k_zero_collapses_to_empty() {
    let a = KString::<0>::single(5);
    assert!(a.is_empty());
    assert_eq!(a, KString::<0>::empty());
  }

  #[test]
  fn merge_sets_reports_change() {
    let mut a = vec![KString::<1>::single(1)];
    let changed = merge_sets(&mut a, &[KString::single(1)]);
    assert!(!changed);
    let changed = merge_sets(&mut a, &[KString::single(1), KString::single(2)]);
    assert!(changed);
    assert_eq!(a.len(), 2);
  }
}
