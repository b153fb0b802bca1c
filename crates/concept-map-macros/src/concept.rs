//! Implementation of #[derive(Concept)] macro

use proc_macro2::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{parenthesized, DeriveInput, Fields, LitStr, Token, Type};

pub fn derive_concept_impl(input: TokenStream) -> TokenStream {
    match syn::parse2::<DeriveInput>(input).and_then(|input| expand(&input)) {
        Ok(expanded) => expanded,
        Err(err) => err.to_compile_error(),
    }
}

#[derive(Default)]
struct ConceptAttrs {
    name: Option<LitStr>,
    refines: Vec<Type>,
    clauses: Vec<Type>,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let ident = &input.ident;

    // Validate: concepts are plain unit structs
    match &input.data {
        syn::Data::Struct(data) if matches!(data.fields, Fields::Unit) => {}
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Concept requires a unit struct: struct MyConcept;",
            ))
        }
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Concept cannot be derived for generic structs",
        ));
    }

    let attrs = parse_concept_attrs(&input.attrs)?;
    let name = match attrs.name {
        Some(name) => name,
        None => LitStr::new(&ident.to_string(), ident.span()),
    };
    let clauses = &attrs.clauses;
    let refines = &attrs.refines;

    Ok(quote! {
        impl ::concept_map::Concept for #ident {
            const NAME: &'static str = #name;
            const CLAUSES: &'static [::concept_map::ClauseInfo] = &[
                #(<#clauses as ::concept_map::Clause>::INFO),*
            ];
            type Refines = (#(#refines,)*);
        }
    })
}

fn parse_concept_attrs(attrs: &[syn::Attribute]) -> syn::Result<ConceptAttrs> {
    let mut parsed = ConceptAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("concept") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                parsed.name = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("refines") {
                parsed.refines.extend(parse_type_list(&meta)?);
            } else if meta.path.is_ident("clauses") {
                parsed.clauses.extend(parse_type_list(&meta)?);
            } else {
                return Err(meta.error("expected `name`, `refines` or `clauses`"));
            }
            Ok(())
        })?;
    }

    Ok(parsed)
}

fn parse_type_list(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<Vec<Type>> {
    let content;
    parenthesized!(content in meta.input);
    let types = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
    Ok(types.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(input: TokenStream) -> String {
        derive_concept_impl(input).to_string()
    }

    #[test]
    fn unit_struct_without_attributes() {
        let out = expand_str(quote! { struct Empty; });

        assert!(out.contains("impl :: concept_map :: Concept for Empty"));
        assert!(out.contains("const NAME : & 'static str = \"Empty\""));
        assert!(out.contains("type Refines = ()"));
    }

    #[test]
    fn name_refines_and_clauses() {
        let out = expand_str(quote! {
            #[concept(name = "shape", refines(Printable, geometry::Sized), clauses(Draw, Area))]
            pub struct Shape;
        });

        assert!(out.contains("\"shape\""));
        assert!(out.contains("type Refines = (Printable , geometry :: Sized ,)"));
        assert!(out.contains("< Draw as :: concept_map :: Clause > :: INFO"));
        assert!(out.contains("< Area as :: concept_map :: Clause > :: INFO"));
    }

    #[test]
    fn attributes_accumulate_across_lines() {
        let out = expand_str(quote! {
            #[concept(refines(A))]
            #[concept(refines(B), clauses(X))]
            struct Both;
        });

        assert!(out.contains("type Refines = (A , B ,)"));
    }

    #[test]
    fn rejects_structs_with_fields() {
        let out = expand_str(quote! { struct NotUnit(u8); });
        assert!(out.contains("compile_error"));
        assert!(out.contains("unit struct"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let out = expand_str(quote! {
            #[concept(requires(X))]
            struct Unknown;
        });
        assert!(out.contains("compile_error"));
        assert!(out.contains("expected `name`"));
    }
}
