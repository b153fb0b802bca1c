//! Canonical instance table
//!
//! Every derived value that must exist at most once per concept (clause sets)
//! or per `(concept, model)` pair (concept maps, default concept maps) lives
//! here. Values are built outside the lock, so building one entry may recurse
//! into building others. When two threads race, the first value inserted is
//! the canonical one and both callers get it.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Slot {
    Clauses,
    DefaultConceptMap,
    ConceptMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Key {
    slot: Slot,
    concept: TypeId,
    model: Option<TypeId>,
}

impl Key {
    pub(crate) fn clauses<C: 'static>() -> Self {
        Self {
            slot: Slot::Clauses,
            concept: TypeId::of::<C>(),
            model: None,
        }
    }

    pub(crate) fn concept_map<C: 'static, T: 'static>() -> Self {
        Self {
            slot: Slot::ConceptMap,
            concept: TypeId::of::<C>(),
            model: Some(TypeId::of::<T>()),
        }
    }

    pub(crate) fn default_concept_map<C: 'static, T: 'static>() -> Self {
        Self {
            slot: Slot::DefaultConceptMap,
            concept: TypeId::of::<C>(),
            model: Some(TypeId::of::<T>()),
        }
    }
}

type Table = RwLock<HashMap<Key, Arc<dyn Any + Send + Sync>>>;

fn table() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(Table::default)
}

fn lookup<V: Send + Sync + 'static>(key: Key) -> Option<Arc<V>> {
    let table = table().read().unwrap_or_else(PoisonError::into_inner);
    let value = table.get(&key)?.clone();
    value.downcast::<V>().ok()
}

/// Canonical value for `key`, building it with `build` on first use.
/// A failed build is not recorded; the next request tries again.
pub(crate) fn memoize<V, E, F>(key: Key, build: F) -> Result<Arc<V>, E>
where
    V: Send + Sync + 'static,
    F: FnOnce() -> Result<V, E>,
{
    if let Some(value) = lookup::<V>(key) {
        trace!(slot = ?key.slot, "registry hit");
        return Ok(value);
    }

    let built = Arc::new(build()?);
    let canonical = {
        let mut table = table().write().unwrap_or_else(PoisonError::into_inner);
        table
            .entry(key)
            .or_insert_with(|| {
                let erased: Arc<dyn Any + Send + Sync> = built.clone();
                erased
            })
            .clone()
    };
    Ok(canonical.downcast::<V>().unwrap_or(built))
}

pub(crate) fn memoize_infallible<V, F>(key: Key, build: F) -> Arc<V>
where
    V: Send + Sync + 'static,
    F: FnOnce() -> V,
{
    match memoize::<V, Infallible, _>(key, || Ok(build())) {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
