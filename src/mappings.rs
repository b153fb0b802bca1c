//! Explicit `(clause, function)` bindings
//!
//! [`Mappings`] collects the bindings a model (or a default provider) supplies
//! for one concept. Each binding is kept as the concrete function value it
//! was given, together with an eraser monomorphized for the clause it was
//! bound under. Nothing is erased until the erasure adapter asks for it.

use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::warn;

use crate::clause::{Binding, ClauseInfo};
use crate::concept::Concept;
use crate::config::DuplicatePolicy;
use crate::error::ConceptMapError;
use crate::symbol_map::{Name, SymbolMap};

type Eraser = fn(&Arc<dyn Any + Send + Sync>) -> Option<Box<dyn Any + Send + Sync>>;

fn erase_entry<K, T, F>(function: &Arc<dyn Any + Send + Sync>) -> Option<Box<dyn Any + Send + Sync>>
where
    K: Binding<T, F>,
    T: 'static,
    F: Send + Sync + 'static,
{
    let function = Arc::clone(function).downcast::<F>().ok()?;
    Some(Box::new(K::erase(function)))
}

// =============================================================================
// ENTRY
// =============================================================================

/// One bound function of a concept map.
#[derive(Clone)]
pub struct Entry {
    clause: ClauseInfo,
    function: Arc<dyn Any + Send + Sync>,
    function_type: &'static str,
    eraser: Eraser,
    origin: &'static str,
}

impl Entry {
    fn new<K, T, F>(function: F, origin: &'static str) -> Self
    where
        K: Binding<T, F>,
        T: 'static,
        F: Send + Sync + 'static,
    {
        Self {
            clause: K::INFO,
            function: Arc::new(function),
            function_type: type_name::<F>(),
            eraser: erase_entry::<K, T, F>,
            origin,
        }
    }

    pub fn clause(&self) -> &ClauseInfo {
        &self.clause
    }

    /// Where the function was bound: a concept name, or a default provider.
    pub fn origin(&self) -> &'static str {
        self.origin
    }

    pub fn function_type(&self) -> &'static str {
        self.function_type
    }

    /// The bound function as its own static type.
    pub fn function<F: Send + Sync + 'static>(&self) -> Option<Arc<F>> {
        Arc::clone(&self.function).downcast::<F>().ok()
    }

    /// `Arc<Erased>` of the clause this entry was bound under, boxed.
    pub(crate) fn erase(&self) -> Option<Box<dyn Any + Send + Sync>> {
        (self.eraser)(&self.function)
    }

    /// Whether both entries hold the very same function instance.
    pub fn same_function(&self, other: &Entry) -> bool {
        Arc::ptr_eq(&self.function, &other.function)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("clause", &self.clause.name)
            .field("signature", &self.clause.signature)
            .field("origin", &self.origin)
            .finish()
    }
}

// =============================================================================
// MAPPINGS
// =============================================================================

/// Bindings supplied at one customization site for concept `C` and model `T`.
pub struct Mappings<C, T> {
    origin: &'static str,
    entries: Vec<Entry>,
    _marker: PhantomData<fn() -> (C, T)>,
}

impl<C: Concept, T: 'static> Mappings<C, T> {
    pub(crate) fn new(origin: &'static str) -> Self {
        Self {
            origin,
            entries: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Bind `function` as the implementation of `clause` for `T`.
    ///
    /// Only functions with exactly the clause's signature are accepted.
    pub fn bind<K, F>(mut self, _clause: K, function: F) -> Self
    where
        K: Binding<T, F>,
        F: Send + Sync + 'static,
    {
        self.entries.push(Entry::new::<K, T, F>(function, self.origin));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<Name> {
        self.entries.iter().map(|entry| entry.clause.name).collect()
    }

    /// Build the explicit map. Repeated names keep the first binding or
    /// fail, depending on `policy`.
    pub(crate) fn into_symbol_map(self, policy: DuplicatePolicy) -> Result<SymbolMap<Entry>, ConceptMapError> {
        let model = type_name::<T>();
        let mut map = SymbolMap::new();
        for entry in self.entries {
            let name = entry.clause.name;
            if map.contains(name) {
                match policy {
                    DuplicatePolicy::FirstWins => {
                        warn!(
                            concept = C::NAME,
                            model,
                            clause = name,
                            "duplicate binding ignored, first binding wins"
                        );
                        continue;
                    }
                    DuplicatePolicy::Reject => {
                        return Err(ConceptMapError::DuplicateBinding {
                            concept: C::NAME,
                            model,
                            name,
                        });
                    }
                }
            }
            map = map.insert(name, entry);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clause, Clause, Concept};

    clause! { struct Double = "double": fn(i32) -> i32; }
    clause! { struct Show = "show": for<T> fn(&T) -> String; }

    #[derive(Concept)]
    #[concept(clauses(Double, Show))]
    struct Numeric;

    struct Seven;

    fn doubler(x: i32) -> i32 {
        x * 2
    }

    #[test]
    fn bind_records_names_in_order() {
        let mappings = Mappings::<Numeric, Seven>::new("Numeric")
            .bind(Show, |_: &Seven| "7".to_string())
            .bind(Double, doubler as fn(i32) -> i32);

        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings.names(), vec![Show::NAME, Double::NAME]);
    }

    #[test]
    fn entry_keeps_static_type() {
        let map = Mappings::<Numeric, Seven>::new("Numeric")
            .bind(Double, doubler as fn(i32) -> i32)
            .into_symbol_map(DuplicatePolicy::FirstWins)
            .unwrap();

        let entry = map.at("double").unwrap();
        let function = entry.function::<fn(i32) -> i32>().unwrap();
        assert_eq!(function(21), 42);
        assert!(entry.function::<fn(i64) -> i64>().is_none());
        assert_eq!(entry.origin(), "Numeric");
    }

    #[test]
    fn duplicate_first_wins() {
        let map = Mappings::<Numeric, Seven>::new("Numeric")
            .bind(Double, |x: i32| x * 2)
            .bind(Double, |x: i32| x * 3)
            .into_symbol_map(DuplicatePolicy::FirstWins)
            .unwrap();

        let erased = map.at("double").unwrap().erase().unwrap();
        let double = erased
            .downcast::<Arc<dyn Fn(i32) -> i32 + Send + Sync>>()
            .unwrap();
        assert_eq!(double(5), 10);
    }

    #[test]
    fn duplicate_rejected() {
        let err = Mappings::<Numeric, Seven>::new("Numeric")
            .bind(Double, |x: i32| x * 2)
            .bind(Double, |x: i32| x * 3)
            .into_symbol_map(DuplicatePolicy::Reject)
            .unwrap_err();

        assert!(matches!(
            err,
            ConceptMapError::DuplicateBinding { name: "double", concept: "Numeric", .. }
        ));
    }

    #[test]
    fn clones_share_the_function() {
        let map = Mappings::<Numeric, Seven>::new("Numeric")
            .bind(Double, doubler as fn(i32) -> i32)
            .into_symbol_map(DuplicatePolicy::FirstWins)
            .unwrap();

        let entry = map.at("double").unwrap();
        assert!(entry.same_function(&entry.clone()));
    }
}
