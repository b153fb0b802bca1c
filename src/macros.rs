//! Declaration macros
//!
//! - [`clause!`](crate::clause) declares a clause type
//! - [`concept_map!`](crate::concept_map!) writes an `impl Models<C> for T`
//!   whose declared binding names can never drift from its bindings
//!
//! Concepts themselves are declared with `#[derive(Concept)]`.

/// Declare a clause.
///
/// The signature is a function type. Write `for<T>` in front of it to name the
/// placeholder that stands in for the modeled type:
///
/// ```
/// use concept_map::clause;
///
/// clause! { pub struct Area = "area": for<T> fn(&T) -> f64; }
/// clause! { pub struct Scale = "scale": for<T> fn(&mut T, f64); }
/// clause! { pub struct Increment = "increment": fn(i32) -> i32; }
/// ```
///
/// Parameters are written without explicit lifetimes; references are
/// higher-ranked in the erased `dyn Fn`.
#[macro_export]
macro_rules! clause {
    (
        @define [$(#[$meta:meta])*] $vis:vis $clause:ident, $name:literal, $model:ident,
        ($($arg:ty),*), ($($ret:ty)?), [$($signature:tt)*]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        $vis struct $clause;

        impl $crate::Clause for $clause {
            const NAME: $crate::Name = $name;
            const SIGNATURE: &'static str = stringify!($($signature)*);
            const UNSATISFIED: &'static str = concat!(
                "unsatisfied concept requirement: no binding for clause `",
                $name,
                "` (",
                stringify!($($signature)*),
                "); bind it in the concept map, in the default concept map, \
                 or in the concept map of a refined concept"
            );
        }

        impl<$model: 'static> $crate::Signature<$model> for $clause {
            type Erased = dyn Fn($($arg),*) $(-> $ret)? + Send + Sync;
        }

        impl<$model: 'static, F> $crate::Binding<$model, F> for $clause
        where
            F: Fn($($arg),*) $(-> $ret)? + Send + Sync + 'static,
        {
            fn erase(
                function: ::std::sync::Arc<F>,
            ) -> ::std::sync::Arc<dyn Fn($($arg),*) $(-> $ret)? + Send + Sync> {
                function
            }
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $clause:ident = $name:literal :
            for<$model:ident> fn($($arg:ty),* $(,)?) $(-> $ret:ty)?;
    ) => {
        $crate::clause! {
            @define [$(#[$meta])*] $vis $clause, $name, $model,
            ($($arg),*), ($($ret)?), [for<$model> fn($($arg),*) $(-> $ret)?]
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $clause:ident = $name:literal :
            fn($($arg:ty),* $(,)?) $(-> $ret:ty)?;
    ) => {
        $crate::clause! {
            @define [$(#[$meta])*] $vis $clause, $name, __ConceptModel,
            ($($arg),*), ($($ret)?), [fn($($arg),*) $(-> $ret)?]
        }
    };
}

/// Define how a model type satisfies a concept.
///
/// ```
/// use concept_map::{clause, concept_map, Concept};
///
/// clause! { pub struct Title = "title": for<T> fn(&T) -> String; }
///
/// #[derive(Concept)]
/// #[concept(clauses(Title))]
/// pub struct Named;
///
/// pub struct Planet(&'static str);
///
/// concept_map! {
///     impl Models<Named> for Planet {
///         Title => |p: &Planet| p.0.to_string(),
///     }
/// }
///
/// let map = concept_map::<Named, Planet>().unwrap();
/// let title = map.erased(Title).unwrap();
/// assert_eq!(title(&Planet("Mars")), "Mars");
/// ```
///
/// A default provider is selected with `type Defaults = Provider;` as the
/// first item; without it the model uses [`NoDefaults`](crate::NoDefaults).
/// Closure parameters must carry type annotations.
#[macro_export]
macro_rules! concept_map {
    (
        @impl $concept:ty, $model:ty, $defaults:ty, [$($clause:path => $function:expr),*]
    ) => {
        impl $crate::Models<$concept> for $model {
            type Defaults = $defaults;

            const BINDINGS: &'static [$crate::Name] = &[$(<$clause as $crate::Clause>::NAME),*];

            fn bindings(
                mappings: $crate::Mappings<$concept, Self>,
            ) -> $crate::Mappings<$concept, Self> {
                mappings $(.bind($clause, $function))*
            }
        }
    };
    (
        impl Models<$concept:ty> for $model:ty {
            type Defaults = $defaults:ty;
            $($clause:path => $function:expr),* $(,)?
        }
    ) => {
        $crate::concept_map!(@impl $concept, $model, $defaults, [$($clause => $function),*]);
    };
    (
        impl Models<$concept:ty> for $model:ty {
            $($clause:path => $function:expr),* $(,)?
        }
    ) => {
        $crate::concept_map!(@impl $concept, $model, $crate::NoDefaults, [$($clause => $function),*]);
    };
}

#[cfg(test)]
mod tests {
    use crate::{clause, concept_map, Concept, DefaultModel, Mappings, Models, Name, NoDefaults};
    use std::any::type_name;

    clause! { struct Label = "label": for<T> fn(&T) -> String; }
    clause! { struct Weight = "weight": for<T> fn(&T) -> u32; }

    #[derive(Concept)]
    #[concept(clauses(Label, Weight))]
    struct Parcel;

    struct Standard;

    impl<T: 'static> DefaultModel<Parcel, T> for Standard {
        const BINDINGS: &'static [Name] = &["weight"];

        fn bindings(mappings: Mappings<Parcel, T>) -> Mappings<Parcel, T> {
            mappings.bind(Weight, |_: &T| 1u32)
        }
    }

    struct Letter;
    struct Crate;
    struct Envelope;

    concept_map! {
        impl Models<Parcel> for Letter {
            type Defaults = Standard;
            Label => |_: &Letter| "letter".to_string(),
        }
    }

    concept_map! {
        impl Models<Parcel> for Envelope {
            type Defaults = Standard;
            Label => |_: &Envelope| "envelope".to_string()
        }
    }

    concept_map! {
        impl Models<Parcel> for Crate {
            Label => |_: &Crate| "crate".to_string(),
            Weight => |_: &Crate| 40u32,
        }
    }

    fn defaults_of<T: Models<Parcel>>() -> &'static str {
        type_name::<T::Defaults>()
    }

    #[test]
    fn defaults_form_selects_the_provider() {
        assert_eq!(defaults_of::<Letter>(), type_name::<Standard>());
        assert_eq!(defaults_of::<Envelope>(), type_name::<Standard>());
        assert_eq!(<Letter as Models<Parcel>>::BINDINGS, &["label"]);

        let weight = crate::concept_map::<Parcel, Letter>().unwrap().erased(Weight).unwrap();
        assert_eq!(weight(&Letter), 1);
    }

    #[test]
    fn bare_form_uses_no_defaults() {
        assert_eq!(defaults_of::<Crate>(), type_name::<NoDefaults>());
        assert_eq!(<Crate as Models<Parcel>>::BINDINGS, &["label", "weight"]);

        let weight = crate::concept_map::<Parcel, Crate>().unwrap().erased(Weight).unwrap();
        assert_eq!(weight(&Crate), 40);
    }
}
