//! Procedural macros for concept-map
//!
//! - `#[derive(Concept)]` - Declare a concept from a unit struct

use proc_macro::TokenStream;

mod concept;

/// Derive macro for concept declarations.
///
/// Generates the `Concept` impl: the concept's name, its own clauses and the
/// tuple of concepts it directly refines.
///
/// # Attributes
///
/// - `#[concept(name = "...")]` - Concept name (defaults to the struct name)
/// - `#[concept(refines(A, B))]` - Directly refined concepts, in merge order
/// - `#[concept(clauses(X, Y))]` - Own clause types, declared with `clause!`
///
/// # Example
///
/// ```ignore
/// #[derive(Concept)]
/// #[concept(refines(Printable), clauses(Draw, Area))]
/// pub struct Shape;
/// ```
#[proc_macro_derive(Concept, attributes(concept))]
pub fn derive_concept(input: TokenStream) -> TokenStream {
    concept::derive_concept_impl(input.into()).into()
}
