//! Default concept maps
//!
//! A concept author can ship fallback bindings for a model through a
//! [`DefaultModel`] provider. The default map of `(C, T)` sits between the
//! model's explicit bindings and the concept maps of `C`'s refined concepts,
//! and may be partial.
//!
//! Providers are ordinary types, so one provider can serve a whole family of
//! models:
//!
//! ```
//! use std::fmt::Display;
//! use concept_map::{clause, concept_map, Concept, DefaultModel, Mappings, Name};
//!
//! clause! { pub struct Print = "print": for<T> fn(&T) -> String; }
//!
//! #[derive(Concept)]
//! #[concept(clauses(Print))]
//! pub struct Printable;
//!
//! pub struct ViaDisplay;
//!
//! impl<T: Display + 'static> DefaultModel<Printable, T> for ViaDisplay {
//!     const BINDINGS: &'static [Name] = &["print"];
//!
//!     fn bindings(mappings: Mappings<Printable, T>) -> Mappings<Printable, T> {
//!         mappings.bind(Print, |value: &T| value.to_string())
//!     }
//! }
//!
//! concept_map! {
//!     impl Models<Printable> for u16 {
//!         type Defaults = ViaDisplay;
//!     }
//! }
//!
//! let print = concept_map::<Printable, u16>().unwrap().erased(Print).unwrap();
//! assert_eq!(print(&7), "7");
//! ```

use std::any::type_name;
use std::sync::Arc;

use tracing::debug;

use crate::concept::Concept;
use crate::config::{self, ResolutionConfig};
use crate::error::ConceptMapError;
use crate::mappings::Mappings;
use crate::model::{AncestorMerge, ConceptMap, ModeledBy, Models};
use crate::registry::{self, Key};
use crate::symbol_map::Name;

/// Supplier of fallback bindings of concept `C` for model `T`.
///
/// `BINDINGS` names the clauses `bindings` binds; it feeds the compile-time
/// totality check of every model using this provider.
pub trait DefaultModel<C: Concept, T: 'static> {
    const BINDINGS: &'static [Name] = &[];

    fn bindings(mappings: Mappings<C, T>) -> Mappings<C, T> {
        mappings
    }
}

/// The empty default concept map.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDefaults;

impl<C: Concept, T: 'static> DefaultModel<C, T> for NoDefaults {}

/// Canonical default concept map of `T` for `C`, from `T`'s chosen provider.
pub fn default_concept_map<C, T>() -> Result<Arc<ConceptMap<C, T>>, ConceptMapError>
where
    C: Concept,
    T: Models<C>,
    C::Refines: ModeledBy<T>,
{
    registry::memoize(
        Key::default_concept_map::<C, T>(),
        make_default_concept_map::<C, T, T::Defaults>,
    )
}

/// Build the default concept map of provider `D` with the process-wide config.
pub fn make_default_concept_map<C, T, D>() -> Result<ConceptMap<C, T>, ConceptMapError>
where
    C: Concept,
    T: 'static,
    C::Refines: ModeledBy<T>,
    D: DefaultModel<C, T>,
{
    make_default_concept_map_with::<C, T, D>(config::current())
}

/// Build the default concept map of provider `D`. The result is allowed to
/// leave clauses unbound. Conflicting ancestor bindings are kept first-wins
/// here and judged when the full concept map is built, where a higher
/// priority binding may still shadow them.
pub fn make_default_concept_map_with<C, T, D>(
    config: &ResolutionConfig,
) -> Result<ConceptMap<C, T>, ConceptMapError>
where
    C: Concept,
    T: 'static,
    C::Refines: ModeledBy<T>,
    D: DefaultModel<C, T>,
{
    let provider = type_name::<D>();
    let model = type_name::<T>();

    let own = D::bindings(Mappings::new(provider)).into_symbol_map(config.duplicates)?;

    let own_keys = own.keys();
    let mut ancestors = AncestorMerge::new(C::NAME, model, None, own_keys.clone());
    <C::Refines as ModeledBy<T>>::merge_ancestors(&mut ancestors)?;

    let own_count = own.len();
    let merged = own.merge(ancestors.into_entries());

    debug!(
        concept = C::NAME,
        model,
        provider,
        own = own_count,
        bindings = merged.len(),
        "built default concept map"
    );
    Ok(ConceptMap::new(merged, own_keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clause, concept_map, Concept};

    clause! { struct Width = "width": for<T> fn(&T) -> u32; }
    clause! { struct Height = "height": for<T> fn(&T) -> u32; }

    #[derive(Concept)]
    #[concept(clauses(Width, Height))]
    struct Sized2d;

    struct Square(u32);

    struct SquareSides;

    impl DefaultModel<Sized2d, Square> for SquareSides {
        const BINDINGS: &'static [Name] = &["width"];

        fn bindings(mappings: Mappings<Sized2d, Square>) -> Mappings<Sized2d, Square> {
            mappings.bind(Width, |s: &Square| s.0)
        }
    }

    concept_map! {
        impl Models<Sized2d> for Square {
            type Defaults = SquareSides;
            Height => |s: &Square| s.0,
        }
    }

    #[test]
    fn default_map_may_be_partial() {
        let defaults = default_concept_map::<Sized2d, Square>().unwrap();
        assert!(defaults.contains("width"));
        assert!(!defaults.contains("height"));
        assert!(!defaults.is_complete());
        assert_eq!(defaults.entry("width").unwrap().origin(), type_name::<SquareSides>());
    }

    #[test]
    fn no_defaults_is_empty() {
        let empty = make_default_concept_map::<Sized2d, Square, NoDefaults>().unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn default_map_is_memoized_separately() {
        let defaults = default_concept_map::<Sized2d, Square>().unwrap();
        let full = crate::concept_map::<Sized2d, Square>().unwrap();

        assert!(Arc::ptr_eq(&defaults, &default_concept_map::<Sized2d, Square>().unwrap()));
        assert_eq!(defaults.len(), 1);
        assert_eq!(full.len(), 2);
        assert!(full.is_complete());
    }
}
