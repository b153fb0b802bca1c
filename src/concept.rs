//! Concept declaration model
//!
//! A concept is a zero-sized type listing its own clauses and the concepts it
//! directly refines. Both are compile-time data: `CLAUSES` is a const slice,
//! `Refines` a tuple of concept types. [`Requirements`] folds them into a
//! static tree of every clause the concept transitively requires.
//!
//! Refinement must form a DAG. A cycle makes `Requirements::<C>::DEPTH`
//! depend on itself, which the compiler reports as a cycle during const
//! evaluation; chains deeper than [`MAX_REFINEMENT_DEPTH`] are rejected with an
//! explicit assertion.

use std::any::TypeId;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::warn;

use crate::clause::ClauseInfo;
use crate::registry::{self, Key};
use crate::symbol_map::SymbolMap;

/// Longest refinement chain a concept may sit on top of.
pub const MAX_REFINEMENT_DEPTH: usize = 64;

/// A named set of required clauses plus the concepts it refines.
///
/// Usually implemented through `#[derive(Concept)]`.
pub trait Concept: 'static {
    const NAME: &'static str;
    /// Own clauses, in declaration order.
    const CLAUSES: &'static [ClauseInfo];
    /// Directly refined concepts as a tuple, e.g. `(Printable, Comparable)`.
    type Refines: Refinements;
}

// =============================================================================
// CLAUSE TREE
// =============================================================================

/// Static view of a concept and everything it refines.
#[derive(Debug)]
pub struct ClauseTree {
    pub concept: &'static str,
    pub clauses: &'static [ClauseInfo],
    pub refines: &'static [&'static ClauseTree],
    pub depth: usize,
}

/// Compile-time derived data of a concept.
pub struct Requirements<C>(PhantomData<fn() -> C>);

impl<C: Concept> Requirements<C> {
    pub const DEPTH: usize = <C::Refines as Refinements>::DEPTH + 1;

    pub const TREE: &'static ClauseTree = &ClauseTree {
        concept: C::NAME,
        clauses: C::CLAUSES,
        refines: <C::Refines as Refinements>::TREES,
        depth: Self::DEPTH,
    };

    /// Evaluating this constant rejects cyclic or runaway refinement.
    pub const ACYCLIC: () = assert!(
        Self::DEPTH <= MAX_REFINEMENT_DEPTH,
        "concept refinement is too deep; concepts must refine each other as a finite DAG"
    );
}

/// The ordered list of concepts a concept directly refines.
pub trait Refinements: 'static {
    const TREES: &'static [&'static ClauseTree];
    /// Depth of the deepest refined concept, 0 for none.
    const DEPTH: usize;

    fn concepts() -> Vec<ConceptId>;
}

const fn deepest(depths: &[usize]) -> usize {
    let mut deepest = 0;
    let mut i = 0;
    while i < depths.len() {
        if depths[i] > deepest {
            deepest = depths[i];
        }
        i += 1;
    }
    deepest
}

impl Refinements for () {
    const TREES: &'static [&'static ClauseTree] = &[];
    const DEPTH: usize = 0;

    fn concepts() -> Vec<ConceptId> {
        Vec::new()
    }
}

macro_rules! impl_refinements {
    ($($concept:ident),+) => {
        impl<$($concept: Concept),+> Refinements for ($($concept,)+) {
            const TREES: &'static [&'static ClauseTree] =
                &[$(Requirements::<$concept>::TREE),+];
            const DEPTH: usize = deepest(&[$(Requirements::<$concept>::DEPTH),+]);

            fn concepts() -> Vec<ConceptId> {
                vec![$(ConceptId::of::<$concept>()),+]
            }
        }
    };
}

impl_refinements!(A);
impl_refinements!(A, B);
impl_refinements!(A, B, C);
impl_refinements!(A, B, C, D);
impl_refinements!(A, B, C, D, E);
impl_refinements!(A, B, C, D, E, F);
impl_refinements!(A, B, C, D, E, F, G);
impl_refinements!(A, B, C, D, E, F, G, H);

// =============================================================================
// CONCEPT IDENTITY
// =============================================================================

/// Runtime token for a concept type.
#[derive(Clone, Copy)]
pub struct ConceptId {
    type_id: TypeId,
    name: &'static str,
    tree: &'static ClauseTree,
    refines: fn() -> Vec<ConceptId>,
}

impl ConceptId {
    pub fn of<C: Concept>() -> Self {
        let () = Requirements::<C>::ACYCLIC;
        Self {
            type_id: TypeId::of::<C>(),
            name: C::NAME,
            tree: Requirements::<C>::TREE,
            refines: <C::Refines as Refinements>::concepts,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Own clauses of this concept.
    pub fn clauses(&self) -> &'static [ClauseInfo] {
        self.tree.clauses
    }

    pub fn refined(&self) -> Vec<ConceptId> {
        (self.refines)()
    }

    pub fn depth(&self) -> usize {
        self.tree.depth
    }
}

impl PartialEq for ConceptId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ConceptId {}

impl std::hash::Hash for ConceptId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConceptId({})", self.name)
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// =============================================================================
// DERIVED VIEWS
// =============================================================================

/// Concepts `C` directly refines, in declaration order.
pub fn refined_concepts<C: Concept>() -> Vec<ConceptId> {
    ConceptId::of::<C>().refined()
}

/// Every concept `C` transitively refines, depth-first in declaration order,
/// each one once.
pub fn ancestors<C: Concept>() -> Vec<ConceptId> {
    fn visit(concept: ConceptId, seen: &mut HashSet<TypeId>, out: &mut Vec<ConceptId>) {
        for parent in concept.refined() {
            if seen.insert(parent.type_id) {
                out.push(parent);
                visit(parent, seen, out);
            }
        }
    }

    let root = ConceptId::of::<C>();
    let mut seen = HashSet::from([root.type_id]);
    let mut out = Vec::new();
    visit(root, &mut seen, &mut out);
    out
}

/// Own clauses of `C` followed by those of every refined concept, left to
/// right; the first declaration of a name wins.
pub fn all_clauses<C: Concept>() -> Arc<SymbolMap<ClauseInfo>> {
    let () = Requirements::<C>::ACYCLIC;
    registry::memoize_infallible(Key::clauses::<C>(), || {
        collect_clauses(Requirements::<C>::TREE, SymbolMap::new())
    })
}

fn collect_clauses(tree: &'static ClauseTree, clauses: SymbolMap<ClauseInfo>) -> SymbolMap<ClauseInfo> {
    let own = tree.clauses.iter().fold(clauses, |clauses, info| {
        if let Some(first) = clauses.at(info.name) {
            if first.signature != info.signature {
                warn!(
                    concept = tree.concept,
                    clause = info.name,
                    kept = first.signature,
                    ignored = info.signature,
                    "clause declared with two different signatures"
                );
            }
        }
        clauses.insert(info.name, *info)
    });
    tree.refines
        .iter()
        .fold(own, |clauses, parent| collect_clauses(parent, clauses))
}
