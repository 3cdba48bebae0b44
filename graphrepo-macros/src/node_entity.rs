//! Implementation of #[derive(NodeEntity)] proc-macro.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use crate::attrs::{parse_fields, parse_label, require};

pub fn derive_node_entity_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let label = parse_label(input, "label")?;
    let fields = parse_fields(input, "NodeEntity")?;
    let id = require(input, fields.id, "id", "NodeEntity")?;

    if let Some(extra) = fields.start.or(fields.end) {
        return Err(syn::Error::new_spanned(
            extra.ident,
            "`start`/`end` fields are only valid on a RelationshipEntity",
        ));
    }

    let type_name = name.to_string();
    let id_field = id.key;
    let id = id.ident;

    Ok(quote! {
        impl #impl_generics ::graphrepo::entity::GraphEntity for #name #ty_generics #where_clause {
            const ENTITY_TYPE: ::graphrepo::entity::EntityType =
                ::graphrepo::entity::EntityType::node(#type_name, #label, #id_field);

            fn graph_id(&self) -> ::core::option::Option<i64> {
                self.#id
            }
        }

        impl #impl_generics ::graphrepo::entity::NodeBacked for #name #ty_generics #where_clause {
            fn node_id(&self) -> ::core::option::Option<i64> {
                self.#id
            }
        }
    })
}
