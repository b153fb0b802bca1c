//! Concept maps and their construction
//!
//! `impl Models<C> for T` is the customization point saying how `T` models
//! `C`. Trait coherence allows exactly one such impl per `(C, T)`. Building
//! the concept map merges, from highest to lowest priority:
//! 1. the model's explicit bindings
//! 2. the default concept map for `(C, T)`
//! 3. the concept map for `(A, T)` of every concept `A` in `C::Refines`, in
//!    declaration order
//!
//! Totality is checked twice. [`Resolution::COMPLETE`] walks the declared
//! binding names of the whole merge chain during compilation and stops the
//! build with the name of the first clause nobody binds. The materialized
//! table is then checked against [`all_clauses`] before it is frozen.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::clause::ClauseInfo;
use crate::concept::{all_clauses, ClauseTree, Concept, ConceptId, Refinements, Requirements};
use crate::config::{self, DuplicatePolicy, ResolutionConfig};
use crate::defaults::{default_concept_map, DefaultModel};
use crate::error::ConceptMapError;
use crate::mappings::{Entry, Mappings};
use crate::registry::{self, Key};
use crate::symbol_map::{names_contain, KeySet, Name, SymbolMap};

// =============================================================================
// CUSTOMIZATION POINT
// =============================================================================

/// How `Self` models concept `C`.
///
/// `BINDINGS` must name exactly the clauses bound in `bindings`;
/// [`concept_map!`](crate::concept_map!) writes both from one list.
pub trait Models<C: Concept>: Sized + 'static {
    /// Provider of the default concept map, [`NoDefaults`](crate::NoDefaults)
    /// when the concept has none for this model.
    type Defaults: DefaultModel<C, Self>;

    const BINDINGS: &'static [Name] = &[];

    fn bindings(mappings: Mappings<C, Self>) -> Mappings<C, Self> {
        mappings
    }
}

/// Implemented by a concept's `Refines` tuple when `T` models every concept
/// in it.
pub trait ModeledBy<T: 'static>: Refinements {
    const PROVIDED: &'static [&'static Provided];

    /// Fold the concept maps of the refined concepts into `merge`, in order.
    fn merge_ancestors(merge: &mut AncestorMerge) -> Result<(), ConceptMapError>;
}

impl<T: 'static> ModeledBy<T> for () {
    const PROVIDED: &'static [&'static Provided] = &[];

    fn merge_ancestors(_: &mut AncestorMerge) -> Result<(), ConceptMapError> {
        Ok(())
    }
}

macro_rules! impl_modeled_by {
    ($($concept:ident),+) => {
        impl<T, $($concept),+> ModeledBy<T> for ($($concept,)+)
        where
            T: 'static $(+ Models<$concept>)+,
            $($concept: Concept, $concept::Refines: ModeledBy<T>,)+
        {
            const PROVIDED: &'static [&'static Provided] =
                &[$(Resolution::<$concept, T>::PROVIDED),+];

            fn merge_ancestors(merge: &mut AncestorMerge) -> Result<(), ConceptMapError> {
                $(
                    let ancestor = concept_map::<$concept, T>()?;
                    merge.absorb($concept::NAME, &ancestor.map)?;
                )+
                Ok(())
            }
        }
    };
}

impl_modeled_by!(A);
impl_modeled_by!(A, B);
impl_modeled_by!(A, B, C);
impl_modeled_by!(A, B, C, D);
impl_modeled_by!(A, B, C, D, E);
impl_modeled_by!(A, B, C, D, E, F);
impl_modeled_by!(A, B, C, D, E, F, G);
impl_modeled_by!(A, B, C, D, E, F, G, H);

// =============================================================================
// STATIC TOTALITY CHECK
// =============================================================================

/// Declared binding names available to one `(concept, model)` resolution.
#[derive(Debug)]
pub struct Provided {
    pub concept: &'static str,
    pub explicit: &'static [Name],
    pub defaults: &'static [Name],
    pub ancestors: &'static [&'static Provided],
}

impl Provided {
    pub const fn provides(&self, name: Name) -> bool {
        if names_contain(self.explicit, name) || names_contain(self.defaults, name) {
            return true;
        }
        let mut i = 0;
        while i < self.ancestors.len() {
            if self.ancestors[i].provides(name) {
                return true;
            }
            i += 1;
        }
        false
    }
}

/// First clause required by `tree` that `provided` does not bind.
pub const fn first_unsatisfied(tree: &'static ClauseTree, provided: &Provided) -> Option<&'static ClauseInfo> {
    let mut i = 0;
    while i < tree.clauses.len() {
        if !provided.provides(tree.clauses[i].name) {
            return Some(&tree.clauses[i]);
        }
        i += 1;
    }
    let mut j = 0;
    while j < tree.refines.len() {
        if let Some(clause) = first_unsatisfied(tree.refines[j], provided) {
            return Some(clause);
        }
        j += 1;
    }
    None
}

/// Compile-time facts about how `T` models `C`.
pub struct Resolution<C, T>(PhantomData<fn() -> (C, T)>);

impl<C, T> Resolution<C, T>
where
    C: Concept,
    T: Models<C>,
    C::Refines: ModeledBy<T>,
{
    pub const PROVIDED: &'static Provided = &Provided {
        concept: C::NAME,
        explicit: T::BINDINGS,
        defaults: <T::Defaults as DefaultModel<C, T>>::BINDINGS,
        ancestors: <C::Refines as ModeledBy<T>>::PROVIDED,
    };

    /// Evaluating this constant fails the build when some clause `C`
    /// requires is bound nowhere in the merge chain.
    pub const COMPLETE: () = {
        let () = Requirements::<C>::ACYCLIC;
        if let Some(clause) = first_unsatisfied(Requirements::<C>::TREE, Self::PROVIDED) {
            panic!("{}", clause.unsatisfied);
        }
    };
}

// =============================================================================
// CONCEPT MAP
// =============================================================================

/// Immutable table of the functions realizing concept `C` for model `T`.
///
/// Each entry keeps the function with its own static type; use
/// [`erased`](Self::erased) to obtain the uniformly-typed callable a clause
/// declares, or [`function`](Self::function) to get the function back as
/// itself.
pub struct ConceptMap<C, T> {
    pub(crate) map: SymbolMap<Entry>,
    /// Names bound at this map's own level, not inherited from a refined
    /// concept.
    pub(crate) own: KeySet,
    _marker: PhantomData<fn() -> (C, T)>,
}

impl<C: Concept, T: 'static> ConceptMap<C, T> {
    pub(crate) fn new(map: SymbolMap<Entry>, own: KeySet) -> Self {
        Self {
            map,
            own,
            _marker: PhantomData,
        }
    }

    pub fn concept_id(&self) -> ConceptId {
        ConceptId::of::<C>()
    }

    pub fn concept_name(&self) -> &'static str {
        C::NAME
    }

    pub fn model_name(&self) -> &'static str {
        type_name::<T>()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains(name)
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.map.at(name)
    }

    pub fn keys(&self) -> KeySet {
        self.map.keys()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The function bound to `name`, as its own static type `F`.
    pub fn function<F: Send + Sync + 'static>(&self, name: Name) -> Result<Arc<F>, ConceptMapError> {
        let entry = self.entry(name).ok_or_else(|| self.missing(name))?;
        entry.function::<F>().ok_or(ConceptMapError::SignatureMismatch {
            name: entry.clause().name,
            requested: type_name::<F>(),
            bound: entry.function_type(),
        })
    }

    /// Whether every clause `C` requires is bound.
    pub fn is_complete(&self) -> bool {
        all_clauses::<C>().keys().is_subset(&self.map.keys())
    }

    pub fn report(&self) -> ConceptMapReport {
        ConceptMapReport {
            concept: C::NAME,
            model: type_name::<T>(),
            complete: self.is_complete(),
            bindings: self
                .map
                .iter()
                .map(|(name, entry)| BindingReport {
                    name,
                    signature: entry.clause().signature,
                    origin: entry.origin(),
                })
                .collect(),
        }
    }

    pub(crate) fn missing(&self, name: Name) -> ConceptMapError {
        ConceptMapError::MissingFunction {
            concept: C::NAME,
            model: type_name::<T>(),
            name,
        }
    }
}

impl<C: Concept, T: 'static> fmt::Debug for ConceptMap<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConceptMap")
            .field("concept", &C::NAME)
            .field("model", &type_name::<T>())
            .field("bindings", &self.map.keys())
            .finish()
    }
}

/// Serializable summary of a concept map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptMapReport {
    pub concept: &'static str,
    pub model: &'static str,
    pub complete: bool,
    pub bindings: Vec<BindingReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingReport {
    pub name: Name,
    pub signature: &'static str,
    pub origin: &'static str,
}

// =============================================================================
// MERGING
// =============================================================================

/// Accumulates the concept maps of refined concepts, first writer wins.
///
/// Names in `shadowed` are bound at a higher priority and never taken from
/// an ancestor, so sibling conflicts on them are not reported. Without a
/// policy, conflicts are left to the full concept map that consumes this
/// merge.
pub struct AncestorMerge {
    concept: &'static str,
    model: &'static str,
    policy: Option<DuplicatePolicy>,
    shadowed: KeySet,
    entries: SymbolMap<Entry>,
}

impl AncestorMerge {
    pub(crate) fn new(
        concept: &'static str,
        model: &'static str,
        policy: Option<DuplicatePolicy>,
        shadowed: KeySet,
    ) -> Self {
        Self {
            concept,
            model,
            policy,
            shadowed,
            entries: SymbolMap::new(),
        }
    }

    /// Merge one ancestor's table. The same function reached twice (through a
    /// diamond) is not a conflict.
    pub(crate) fn absorb(&mut self, ancestor: &'static str, map: &SymbolMap<Entry>) -> Result<(), ConceptMapError> {
        trace!(
            concept = self.concept,
            model = self.model,
            ancestor,
            bindings = map.len(),
            "merging refined concept map"
        );
        let (concept, model, policy) = (self.concept, self.model, self.policy);
        let shadowed = &self.shadowed;
        let entries = std::mem::take(&mut self.entries);
        self.entries = entries.merge_with(map.clone(), |name, kept, incoming| {
            if kept.same_function(incoming) || shadowed.contains(name) {
                return Ok(());
            }
            match policy {
                None => {
                    trace!(concept, model, clause = name, "deferring ancestor conflict");
                    Ok(())
                }
                Some(DuplicatePolicy::FirstWins) => {
                    warn!(
                        concept,
                        model,
                        clause = name,
                        kept = kept.origin(),
                        ignored = incoming.origin(),
                        "ambiguous binding, first refined concept wins"
                    );
                    Ok(())
                }
                Some(DuplicatePolicy::Reject) => Err(ConceptMapError::AmbiguousBinding {
                    concept,
                    model,
                    name,
                    first: kept.origin(),
                    second: incoming.origin(),
                }),
            }
        })?;
        Ok(())
    }

    pub(crate) fn into_entries(self) -> SymbolMap<Entry> {
        self.entries
    }
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

/// Canonical concept map of `T` for `C`, built on first use.
///
/// Every call for the same pair returns the same `Arc`.
pub fn concept_map<C, T>() -> Result<Arc<ConceptMap<C, T>>, ConceptMapError>
where
    C: Concept,
    T: Models<C>,
    C::Refines: ModeledBy<T>,
{
    registry::memoize(Key::concept_map::<C, T>(), make_concept_map::<C, T>)
}

/// Build a fresh concept map of `T` for `C` with the process-wide config.
pub fn make_concept_map<C, T>() -> Result<ConceptMap<C, T>, ConceptMapError>
where
    C: Concept,
    T: Models<C>,
    C::Refines: ModeledBy<T>,
{
    make_concept_map_with::<C, T>(config::current())
}

/// Build a fresh concept map of `T` for `C` with an explicit config.
///
/// Ancestor and default maps still come from the registry.
pub fn make_concept_map_with<C, T>(config: &ResolutionConfig) -> Result<ConceptMap<C, T>, ConceptMapError>
where
    C: Concept,
    T: Models<C>,
    C::Refines: ModeledBy<T>,
{
    let () = Resolution::<C, T>::COMPLETE;
    let model = type_name::<T>();

    let explicit = T::bindings(Mappings::new(C::NAME)).into_symbol_map(config.duplicates)?;
    let defaults = default_concept_map::<C, T>()?;

    let own = explicit.keys();
    let shadowed = own.iter().chain(defaults.own.iter()).collect();
    let mut ancestors = AncestorMerge::new(C::NAME, model, Some(config.duplicates), shadowed);
    <C::Refines as ModeledBy<T>>::merge_ancestors(&mut ancestors)?;

    let explicit_count = explicit.len();
    let merged = explicit
        .merge(defaults.map.clone())
        .merge(ancestors.into_entries());

    let missing = all_clauses::<C>().keys().missing_from(&merged.keys());
    if !missing.is_empty() {
        return Err(ConceptMapError::Unsatisfied {
            concept: C::NAME,
            model,
            missing,
        });
    }

    debug!(
        concept = C::NAME,
        model,
        explicit = explicit_count,
        bindings = merged.len(),
        "built concept map"
    );
    Ok(ConceptMap::new(merged, own))
}
