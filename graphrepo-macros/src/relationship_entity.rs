//! Implementation of #[derive(RelationshipEntity)] proc-macro.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use crate::attrs::{parse_fields, parse_label, require};

pub fn derive_relationship_entity_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let rel_type = parse_label(input, "type")?;
    let fields = parse_fields(input, "RelationshipEntity")?;
    let id = require(input, fields.id, "id", "RelationshipEntity")?;
    let start = require(input, fields.start, "start", "RelationshipEntity")?;
    let end = require(input, fields.end, "end", "RelationshipEntity")?;

    let type_name = name.to_string();
    let id_field = id.key;
    let start_field = start.key;
    let end_field = end.key;
    let (id, start, end) = (id.ident, start.ident, end.ident);

    Ok(quote! {
        impl #impl_generics ::graphrepo::entity::GraphEntity for #name #ty_generics #where_clause {
            const ENTITY_TYPE: ::graphrepo::entity::EntityType =
                ::graphrepo::entity::EntityType::relationship(
                    #type_name,
                    #rel_type,
                    #id_field,
                    #start_field,
                    #end_field,
                );

            fn graph_id(&self) -> ::core::option::Option<i64> {
                self.#id
            }

            fn endpoints(&self) -> ::core::option::Option<(i64, i64)> {
                ::core::option::Option::Some((self.#start, self.#end))
            }
        }

        impl #impl_generics ::graphrepo::entity::RelationshipBacked for #name #ty_generics #where_clause {
            fn relationship_id(&self) -> ::core::option::Option<i64> {
                self.#id
            }
        }
    })
}
