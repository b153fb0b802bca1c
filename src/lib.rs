//! concept-map - Compile-time concept maps for type erasure
//!
//! A *concept* is a named set of required operations (*clauses*), possibly
//! refining other concepts. A *concept map* is the table of functions that
//! make a concrete type model a concept. This crate assembles that table from
//! three sources and proves it total before the program runs:
//! 1. the model's explicit bindings (`impl Models<C> for T`)
//! 2. the default concept map for `(C, T)` (`DefaultModel<C, T>`)
//! 3. the concept maps of every concept `C` refines
//!
//! A storage/vtable layer then asks the finished map for one erased function
//! per clause with [`ConceptMap::erased`].
//!
//! ## Quick Start
//!
//! ```rust
//! use concept_map::{clause, concept_map, Concept};
//!
//! clause! { pub struct Describe = "describe": for<T> fn(&T) -> String; }
//! clause! { pub struct Area = "area": for<T> fn(&T) -> f64; }
//!
//! #[derive(Concept)]
//! #[concept(clauses(Describe))]
//! pub struct Printable;
//!
//! #[derive(Concept)]
//! #[concept(refines(Printable), clauses(Area))]
//! pub struct Shape;
//!
//! pub struct Square(f64);
//!
//! concept_map! {
//!     impl Models<Printable> for Square {
//!         Describe => |s: &Square| format!("square {}", s.0),
//!     }
//! }
//!
//! concept_map! {
//!     impl Models<Shape> for Square {
//!         Area => |s: &Square| s.0 * s.0,
//!     }
//! }
//!
//! let map = concept_map::<Shape, Square>().unwrap();
//! let describe = map.erased(Describe).unwrap();
//! let area = map.erased(Area).unwrap();
//! assert_eq!(describe(&Square(2.0)), "square 2");
//! assert_eq!(area(&Square(2.0)), 4.0);
//! ```
//!
//! ## Compile-time rejections
//!
//! A model that leaves a required clause unbound does not compile:
//!
//! ```rust,compile_fail
//! use concept_map::{clause, concept_map, Concept};
//!
//! clause! { pub struct Area = "area": for<T> fn(&T) -> f64; }
//! clause! { pub struct Perimeter = "perimeter": for<T> fn(&T) -> f64; }
//!
//! #[derive(Concept)]
//! #[concept(clauses(Area, Perimeter))]
//! pub struct Shape;
//!
//! pub struct Circle(f64);
//!
//! concept_map! {
//!     impl Models<Shape> for Circle {
//!         Area => |c: &Circle| 3.0 * c.0 * c.0,
//!     }
//! }
//!
//! fn main() {
//!     let _ = concept_map::<Shape, Circle>();
//! }
//! ```
//!
//! Neither does a refinement cycle:
//!
//! ```rust,compile_fail
//! use concept_map::Concept;
//!
//! #[derive(Concept)]
//! #[concept(refines(Back))]
//! pub struct Forth;
//!
//! #[derive(Concept)]
//! #[concept(refines(Forth))]
//! pub struct Back;
//!
//! fn main() {
//!     let _ = concept_map::all_clauses::<Forth>();
//! }
//! ```
//!
//! Nor a model that skips a refined concept:
//!
//! ```rust,compile_fail
//! use concept_map::{clause, concept_map, Concept};
//!
//! clause! { pub struct Describe = "describe": for<T> fn(&T) -> String; }
//!
//! #[derive(Concept)]
//! #[concept(clauses(Describe))]
//! pub struct Printable;
//!
//! #[derive(Concept)]
//! #[concept(refines(Printable))]
//! pub struct Shape;
//!
//! pub struct Square;
//!
//! concept_map! { impl Models<Shape> for Square {} }
//!
//! fn main() {
//!     let _ = concept_map::<Shape, Square>();
//! }
//! ```
//!
//! Nor a binding whose signature differs from the clause:
//!
//! ```rust,compile_fail
//! use concept_map::{clause, concept_map, Concept};
//!
//! clause! { pub struct Area = "area": for<T> fn(&T) -> f64; }
//!
//! #[derive(Concept)]
//! #[concept(clauses(Area))]
//! pub struct Shape;
//!
//! pub struct Square(u32);
//!
//! concept_map! {
//!     impl Models<Shape> for Square {
//!         Area => |s: &Square| s.0 * s.0,
//!     }
//! }
//! ```

// The derive expands to `::concept_map::` paths, also inside this crate.
extern crate self as concept_map;

// Core error handling
pub mod error;

// Resolution configuration
pub mod config;

// Declaration model
pub mod clause;
pub mod concept;
mod macros;
pub mod symbol_map;

// Construction and merge
pub mod defaults;
pub mod mappings;
pub mod model;
mod registry;

// Erasure adapter consumed by vtable layers
pub mod erase;

pub use clause::{Binding, Clause, ClauseInfo, Signature};
pub use concept::{
    all_clauses, ancestors, refined_concepts, ClauseTree, Concept, ConceptId, Refinements,
    Requirements, MAX_REFINEMENT_DEPTH,
};
pub use concept_map_macros::Concept;
pub use config::{configure, DuplicatePolicy, ResolutionConfig};
pub use defaults::{
    default_concept_map, make_default_concept_map, make_default_concept_map_with, DefaultModel,
    NoDefaults,
};
pub use erase::{erase, Erased};
pub use error::{ConceptMapError, ConfigError};
pub use mappings::{Entry, Mappings};
pub use model::{
    concept_map, make_concept_map, make_concept_map_with, BindingReport, ConceptMap,
    ConceptMapReport, ModeledBy, Models, Provided, Resolution,
};
pub use symbol_map::{KeySet, Name, SymbolMap};
