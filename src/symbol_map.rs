//! Symbol-keyed associative containers
//!
//! `SymbolMap` is the ordered name → value table every concept map is built
//! from. It is a persistent-style value: `insert` and `merge` consume the map
//! and hand back a new one, and an existing key is never overwritten.
//!
//! The `const fn` helpers at the bottom are the compile-time half of the same
//! contract; the static totality check in `model` is written against them.

use std::collections::{BTreeMap, BTreeSet};

/// Name of a clause. Two names are the same symbol when their text is equal.
pub type Name = &'static str;

// =============================================================================
// SYMBOL MAP
// =============================================================================

/// Ordered map from clause names to values with first-insert-wins semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMap<V> {
    entries: BTreeMap<Name, V>,
}

impl<V> Default for SymbolMap<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V> SymbolMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Value bound to `name`, or `None` when the map does not contain it.
    pub fn at(&self, name: &str) -> Option<&V> {
        self.entries.get(name)
    }

    /// Add `name ↦ value` unless `name` is already bound.
    pub fn insert(mut self, name: Name, value: V) -> Self {
        self.entries.entry(name).or_insert(value);
        self
    }

    /// Fold `other` into `self`. Entries already in `self` dominate.
    pub fn merge(self, other: SymbolMap<V>) -> Self {
        other
            .entries
            .into_iter()
            .fold(self, |map, (name, value)| map.insert(name, value))
    }

    /// Like [`merge`](Self::merge), but reports every key clash to
    /// `on_collision(name, kept, incoming)` first. An error aborts the merge.
    pub fn merge_with<E, F>(mut self, other: SymbolMap<V>, mut on_collision: F) -> Result<Self, E>
    where
        F: FnMut(Name, &V, &V) -> Result<(), E>,
    {
        for (name, incoming) in other.entries {
            match self.entries.get(name) {
                Some(kept) => on_collision(name, kept, &incoming)?,
                None => {
                    self.entries.insert(name, incoming);
                }
            }
        }
        Ok(self)
    }

    pub fn keys(&self) -> KeySet {
        KeySet(self.entries.keys().copied().collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, &V)> + '_ {
        self.entries.iter().map(|(&name, value)| (name, value))
    }
}

impl<V> FromIterator<(Name, V)> for SymbolMap<V> {
    fn from_iter<I: IntoIterator<Item = (Name, V)>>(pairs: I) -> Self {
        pairs
            .into_iter()
            .fold(Self::new(), |map, (name, value)| map.insert(name, value))
    }
}

// =============================================================================
// KEY SET
// =============================================================================

/// Ordered set of names, as produced by [`SymbolMap::keys`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet(BTreeSet<Name>);

impl KeySet {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_subset(&self, other: &KeySet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Names in `self` that `other` lacks, in order.
    pub fn missing_from(&self, other: &KeySet) -> Vec<Name> {
        self.0.difference(&other.0).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Name> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Name> for KeySet {
    fn from_iter<I: IntoIterator<Item = Name>>(names: I) -> Self {
        Self(names.into_iter().collect())
    }
}

// =============================================================================
// CONST HELPERS
// =============================================================================

/// Symbol equality usable in constant evaluation.
pub const fn same_name(a: Name, b: Name) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

pub const fn names_contain(names: &[Name], name: Name) -> bool {
    let mut i = 0;
    while i < names.len() {
        if same_name(names[i], name) {
            return true;
        }
        i += 1;
    }
    false
}
