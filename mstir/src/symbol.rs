//! Interned variable names and dense symbol indexing.
//!
//! A [`Symbol`] is a cheap handle on a process-wide interned string. Two
//! symbols are equal iff their names are equal, regardless of which thread
//! created them. A [`SymbolIndexer`] assigns every distinct symbol of an
//! expression a dense slot `0..n`, which compiled expressions use to address
//! their arguments without hashing.

use std::{
    borrow::Borrow,
    collections::{HashMap, HashSet},
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{EvalError, EvalResult},
    expression::Bindings,
    mst::Mst,
};

static INTERNER: Lazy<Mutex<HashSet<Arc<str>>>> = Lazy::new(|| Mutex::new(HashSet::new()));

fn intern(name: &str) -> Arc<str> {
    let mut table = INTERNER.lock();
    if let Some(existing) = table.get(name) {
        return existing.clone();
    }
    let fresh: Arc<str> = Arc::from(name);
    table.insert(fresh.clone());
    fresh
}

/// Named placeholder for a value supplied at invocation time.
#[derive(Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "String", into = "String")
)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Symbol(intern(name))
    }

    /// Name of the symbol.
    pub fn identity(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl Eq for Symbol {}

// Hashes exactly like the underlying `str` so `Borrow<str>` lookups work.
impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state)
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.identity().cmp(other.identity())
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        self.identity()
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Symbol::new(&name)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.identity().to_owned()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identity())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.identity())
    }
}

/// Ordered, deduplicated set of symbols with dense positions.
///
/// Positions are stable: the first occurrence of a symbol fixes its slot.
///
/// ```
/// use mstir::{parser::parse, symbol::{Symbol, SymbolIndexer}};
/// let tree = parse("y * x + y").unwrap();
/// let indexer = SymbolIndexer::of(&tree);
/// assert_eq!(indexer.index(&Symbol::new("y")), 0);
/// assert_eq!(indexer.index(&Symbol::new("x")), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolIndexer {
    symbols: Vec<Symbol>,
    positions: HashMap<Symbol, usize>,
}

impl SymbolIndexer {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let mut indexer = SymbolIndexer::default();
        for symbol in symbols {
            indexer.push(symbol.into());
        }
        indexer
    }

    /// Indexer over the free symbols of `tree`, in order of first appearance
    /// in a left-to-right depth-first walk.
    pub fn of(tree: &Mst) -> Self {
        SymbolIndexer::new(tree.symbols())
    }

    /// Appends `symbol` if it is not yet indexed and returns its slot.
    pub fn push(&mut self, symbol: Symbol) -> usize {
        if let Some(&slot) = self.positions.get(&symbol) {
            return slot;
        }
        let slot = self.symbols.len();
        self.positions.insert(symbol.clone(), slot);
        self.symbols.push(symbol);
        slot
    }

    /// Slot of `symbol`.
    ///
    /// # Panics
    /// Panics if `symbol` was never indexed.
    pub fn index(&self, symbol: &Symbol) -> usize {
        match self.try_index(symbol) {
            Some(slot) => slot,
            None => panic!("symbol `{symbol}` is not part of this indexer"),
        }
    }

    pub fn try_index(&self, symbol: &Symbol) -> Option<usize> {
        self.positions.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Collects the values of `bindings` into slot order.
    pub fn arguments<T: Clone>(&self, bindings: &Bindings<T>) -> EvalResult<Vec<T>> {
        self.symbols
            .iter()
            .map(|symbol| {
                bindings
                    .get(symbol)
                    .cloned()
                    .ok_or_else(|| EvalError::UnboundSymbol {
                        symbol: symbol.clone(),
                    })
            })
            .collect()
    }
}

impl<S: Into<Symbol>> FromIterator<S> for SymbolIndexer {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SymbolIndexer::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interned_symbols_share_storage() {
        let a = Symbol::new("alpha");
        let b = Symbol::from(String::from("alpha"));
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn symbols_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(Symbol::new("x"), 3);
        assert_eq!(map.get("x"), Some(&3));
    }

    #[test]
    fn indexer_keeps_first_occurrence() {
        let indexer = SymbolIndexer::new(["b", "a", "b", "c"]);
        assert_eq!(indexer.len(), 3);
        assert_eq!(indexer.index(&Symbol::new("b")), 0);
        assert_eq!(indexer.index(&Symbol::new("a")), 1);
        assert_eq!(indexer.index(&Symbol::new("c")), 2);
        assert_eq!(indexer.try_index(&Symbol::new("d")), None);
    }

    #[test]
    #[should_panic(expected = "not part of this indexer")]
    fn unknown_symbol_is_contract_violation() {
        SymbolIndexer::new(["x"]).index(&Symbol::new("y"));
    }

    #[test]
    fn arguments_report_first_missing_symbol() {
        let indexer = SymbolIndexer::new(["x", "y"]);
        let mut bindings = Bindings::new();
        bindings.insert(Symbol::new("x"), 1.0);
        let err = indexer.arguments(&bindings).unwrap_err();
        assert_eq!(
            err,
            EvalError::UnboundSymbol {
                symbol: Symbol::new("y")
            }
        );
        bindings.insert(Symbol::new("y"), 2.0);
        assert_eq!(indexer.arguments(&bindings).unwrap(), vec![1.0, 2.0]);
    }
}
