//! Error types
//!
//! Most ways of getting a concept map wrong are rejected by the compiler.
//! `ConceptMapError` covers what can only be seen once the bound functions
//! exist: a model whose declared binding names disagree with its bindings,
//! conflicting bindings under the strict duplicate policy, and erasure
//! requests that do not match the table.

use thiserror::Error;

use crate::symbol_map::Name;

// =============================================================================
// RESOLUTION ERRORS
// =============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConceptMapError {
    #[error(
        "unsatisfied concept requirement: `{model}` does not model `{concept}`, no binding for {}",
        quoted(.missing)
    )]
    Unsatisfied {
        concept: &'static str,
        model: &'static str,
        missing: Vec<Name>,
    },

    #[error("`{name}` is bound more than once in the concept map of `{model}` for `{concept}`")]
    DuplicateBinding {
        concept: &'static str,
        model: &'static str,
        name: Name,
    },

    #[error(
        "ambiguous binding for `{name}` in the concept map of `{model}` for `{concept}`: \
         `{first}` and `{second}` provide different functions"
    )]
    AmbiguousBinding {
        concept: &'static str,
        model: &'static str,
        name: Name,
        first: &'static str,
        second: &'static str,
    },

    #[error("the concept map of `{model}` for `{concept}` has no function `{name}`")]
    MissingFunction {
        concept: &'static str,
        model: &'static str,
        name: Name,
    },

    #[error("`{name}` was requested as `{requested}` but is bound as `{bound}`")]
    SignatureMismatch {
        name: Name,
        requested: &'static str,
        bound: &'static str,
    },
}

fn quoted(names: &[Name]) -> String {
    names
        .iter()
        .map(|name| format!("`{}`", name))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid duplicate policy '{0}': expected 'first-wins' or 'reject'")]
    InvalidPolicy(String),

    #[error("invalid resolution config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("resolution config is already installed")]
    AlreadyConfigured,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsatisfied_lists_every_missing_clause() {
        let err = ConceptMapError::Unsatisfied {
            concept: "Shape",
            model: "demo::Circle",
            missing: vec!["area", "draw"],
        };
        assert_eq!(
            err.to_string(),
            "unsatisfied concept requirement: `demo::Circle` does not model `Shape`, \
             no binding for `area`, `draw`"
        );
    }

    #[test]
    fn ambiguous_names_both_sources() {
        let err = ConceptMapError::AmbiguousBinding {
            concept: "Widget",
            model: "Button",
            name: "draw",
            first: "Drawable",
            second: "Printable",
        };
        let message = err.to_string();
        assert!(message.contains("`Drawable`"));
        assert!(message.contains("`Printable`"));
    }

    #[test]
    fn invalid_policy_message() {
        let err = ConfigError::InvalidPolicy("last-wins".into());
        assert!(err.to_string().contains("'last-wins'"));
    }
}
