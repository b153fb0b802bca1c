//! Erasure adapter
//!
//! The narrow interface a vtable layer consumes: given a clause, hand back the
//! bound function behind the uniformly-typed `dyn Fn` the clause declares.

use std::any::type_name;
use std::sync::Arc;

use crate::clause::{Binding, Signature};
use crate::concept::Concept;
use crate::error::ConceptMapError;
use crate::model::ConceptMap;

/// Erased callable of clause `K` for model `T`.
pub type Erased<K, T> = Arc<<K as Signature<T>>::Erased>;

impl<C: Concept, T: 'static> ConceptMap<C, T> {
    /// The function bound to `clause`, erased to the clause's signature.
    ///
    /// Fails when the map has no such clause, or when the name was bound
    /// under a clause with a different signature.
    pub fn erased<K: Signature<T>>(&self, _clause: K) -> Result<Erased<K, T>, ConceptMapError> {
        let entry = self.entry(K::NAME).ok_or_else(|| self.missing(K::NAME))?;
        entry
            .erase()
            .and_then(|erased| erased.downcast::<Erased<K, T>>().ok())
            .map(|erased| *erased)
            .ok_or(ConceptMapError::SignatureMismatch {
                name: K::NAME,
                requested: type_name::<K::Erased>(),
                bound: entry.clause().signature,
            })
    }
}

/// Erase a standalone function as clause `K` would for model `T`.
pub fn erase<K, T, F>(function: F) -> Erased<K, T>
where
    K: Binding<T, F>,
    T: 'static,
{
    K::erase(Arc::new(function))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clause, concept_map, Concept};

    clause! { struct Succ = "succ": fn(i32) -> i32; }
    clause! { struct SuccWide = "succ": fn(i64) -> i64; }
    clause! { struct Pred = "pred": fn(i32) -> i32; }
    clause! { struct Fail = "fail": for<T> fn(&T) -> u8; }

    #[derive(Concept)]
    #[concept(clauses(Succ, Fail))]
    struct Counter;

    struct Unit;

    concept_map! {
        impl Models<Counter> for Unit {
            Succ => |x: i32| x + 1,
            Fail => |_: &Unit| -> u8 { panic!("boom") },
        }
    }

    #[test]
    fn erased_calls_the_bound_function() {
        let map = crate::concept_map::<Counter, Unit>().unwrap();
        let succ = map.erased(Succ).unwrap();
        assert_eq!(succ(5), 6);
    }

    #[test]
    fn erased_preserves_panics() {
        let map = crate::concept_map::<Counter, Unit>().unwrap();
        let fail = map.erased(Fail).unwrap();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| fail(&Unit)));
        assert!(result.is_err());
    }

    #[test]
    fn missing_clause_is_reported() {
        let map = crate::concept_map::<Counter, Unit>().unwrap();
        let err = map.erased(Pred).err().expect("`pred` is not bound");
        assert_eq!(
            err,
            ConceptMapError::MissingFunction {
                concept: "Counter",
                model: type_name::<Unit>(),
                name: "pred",
            }
        );
    }

    #[test]
    fn same_name_with_other_signature_is_a_mismatch() {
        let map = crate::concept_map::<Counter, Unit>().unwrap();
        assert!(matches!(
            map.erased(SuccWide),
            Err(ConceptMapError::SignatureMismatch { name: "succ", .. })
        ));
    }

    #[test]
    fn erase_standalone_function() {
        let succ: Erased<Succ, Unit> = erase::<Succ, Unit, _>(|x: i32| x + 1);
        assert_eq!(succ(41), 42);
    }
}
