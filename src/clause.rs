//! Operation clauses
//!
//! A clause is one required operation of a concept: a name plus a function
//! signature written against a placeholder for the modeled type. Clauses are
//! zero-sized types, normally declared with [`clause!`](crate::clause):
//!
//! ```
//! use concept_map::clause;
//!
//! clause! {
//!     /// Render the model as text.
//!     pub struct Describe = "describe": for<T> fn(&T) -> String;
//! }
//! ```
//!
//! The declaration yields three impls:
//! - [`Clause`]: the name, the stringified signature and the diagnostic used
//!   when no binding for the clause can be found
//! - [`Signature<T>`]: the uniformly-typed callable (`dyn Fn(..)`) the clause
//!   erases to for a given model `T`
//! - [`Binding<T, F>`]: accepts any function `F` with that exact signature
//!   and knows how to erase it

use serde::Serialize;
use std::sync::Arc;

use crate::symbol_map::Name;

/// Const descriptor of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClauseInfo {
    pub name: Name,
    /// Signature as declared, placeholder included.
    pub signature: &'static str,
    #[serde(skip)]
    pub unsatisfied: &'static str,
}

pub trait Clause: 'static {
    const NAME: Name;
    const SIGNATURE: &'static str;
    /// Compile error emitted when a concept map cannot bind this clause.
    const UNSATISFIED: &'static str;

    const INFO: ClauseInfo = ClauseInfo {
        name: Self::NAME,
        signature: Self::SIGNATURE,
        unsatisfied: Self::UNSATISFIED,
    };
}

/// The erased form of a clause for model `T`.
pub trait Signature<T: 'static>: Clause {
    type Erased: ?Sized + Send + Sync + 'static;
}

/// Implemented by a clause for every function type `F` it can be bound to.
pub trait Binding<T: 'static, F>: Signature<T> {
    fn erase(function: Arc<F>) -> Arc<<Self as Signature<T>>::Erased>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause;

    clause! {
        struct Increment = "increment": fn(i32) -> i32;
    }

    clause! {
        struct Label = "label": for<M> fn(&M, usize) -> String;
    }

    clause! {
        struct Reset = "reset": for<M> fn(&mut M);
    }

    #[test]
    fn clause_info_carries_declaration() {
        assert_eq!(Increment::NAME, "increment");
        assert_eq!(Label::INFO.name, "label");
        assert!(Label::SIGNATURE.contains("usize"));
        assert!(Increment::UNSATISFIED.contains("`increment`"));
    }

    #[test]
    fn binding_erases_to_declared_signature() {
        let erased = <Increment as Binding<(), _>>::erase(Arc::new(|x: i32| x + 1));
        assert_eq!(erased(41), 42);

        let label = <Label as Binding<Vec<u8>, _>>::erase(Arc::new(|v: &Vec<u8>, n: usize| {
            format!("{}:{}", v.len(), n)
        }));
        assert_eq!(label(&vec![1, 2, 3], 7), "3:7");
    }

    #[test]
    fn unit_return_clause() {
        let reset = <Reset as Binding<Vec<u8>, _>>::erase(Arc::new(|v: &mut Vec<u8>| v.clear()));
        let mut data = vec![1, 2];
        reset(&mut data);
        assert!(data.is_empty());
    }
}
