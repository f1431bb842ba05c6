use std::collections::{BTreeSet, HashMap};

/// `eps` denotes the empty right-hand side and is never assigned an id.
pub const EPS: &str = "eps";
/// Separates a production's LHS from its RHS.
pub const SEPARATOR: &str = "->";
/// The original grammar's start non-terminal must be defined under this name.
pub const START_NAME: &str = "S";

/// Name↔id mapping for every terminal and non-terminal in a grammar, built up
/// by the loader in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SymbolTable {
  names: Vec<String>,
  ids:   HashMap<String, u32>,
}

impl SymbolTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Rebuilds a table from an id-ordered list of names, used by the codec
  /// when decoding a table file back into a `SymbolTable`.
  pub fn from_names(names: Vec<String>) -> Self {
    let ids = names.iter().enumerate().map(|(id, name)| (name.clone(), id as u32)).collect();
    SymbolTable { names, ids }
  }

  /// Returns the id for `name`, interning it if this is the first time it has
  /// been seen.
  pub fn intern(&mut self, name: &str) -> u32 {
    if let Some(&id) = self.ids.get(name) {
      return id;
    }
    let id = self.names.len() as u32;
    self.names.push(name.to_string());
    self.ids.insert(name.to_string(), id);
    id
  }

  pub fn id_of(&self, name: &str) -> Option<u32> {
    self.ids.get(name).copied()
  }

  pub fn name_of(&self, id: u32) -> &str {
    &self.names[id as usize]
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  pub fn names(&self) -> &[String] {
    &self.names
  }
}

/// The set of ids that appear as the left-hand side of at least one
/// production, derived post-parse per the data model ("any id appearing as a
/// LHS is nonterminal").
pub type NonterminalSet = BTreeSet<u32>;
