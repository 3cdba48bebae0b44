//! Entity marker derive macros for graphrepo.
//!
//! This crate provides the two type-level markers a domain type can carry:
//! - `#[derive(NodeEntity)]` for types stored as graph vertices
//! - `#[derive(RelationshipEntity)]` for types stored as graph edges
//!
//! Both generate an `EntityType` constant, so the classification is fixed at
//! compile time. Generated code references `::graphrepo`.

use proc_macro::TokenStream;

mod attrs;
mod node_entity;
mod relationship_entity;

/// Derive macro marking a struct as a node-backed entity.
///
/// # Requirements
///
/// - Named fields only
/// - Exactly one field tagged `#[graph(id)]`, of type `Option<i64>`
/// - The struct must also derive `Serialize` and `Deserialize`
///
/// # Example
///
/// ```ignore
/// use graphrepo::NodeEntity;
///
/// #[derive(Serialize, Deserialize, NodeEntity)]
/// #[graph(label = "Person")]
/// pub struct Person {
///     #[graph(id)]
///     pub id: Option<i64>,
///     pub name: String,
/// }
///
/// // Generated implementations:
/// // impl GraphEntity for Person { const ENTITY_TYPE: EntityType = ...; ... }
/// // impl NodeBacked for Person { ... }
/// ```
#[proc_macro_derive(NodeEntity, attributes(graph))]
pub fn derive_node_entity(input: TokenStream) -> TokenStream {
    node_entity::derive_node_entity_impl(input)
}

/// Derive macro marking a struct as a relationship-backed entity.
///
/// # Requirements
///
/// - Named fields only
/// - A `#[graph(id)]` field of type `Option<i64>`
/// - `#[graph(start)]` and `#[graph(end)]` fields of type `i64` holding the
///   endpoint node ids
///
/// # Example
///
/// ```ignore
/// use graphrepo::RelationshipEntity;
///
/// #[derive(Serialize, Deserialize, RelationshipEntity)]
/// #[graph(type = "KNOWS")]
/// pub struct Knows {
///     #[graph(id)]
///     pub id: Option<i64>,
///     #[graph(start)]
///     pub from: i64,
///     #[graph(end)]
///     pub to: i64,
///     pub since: i32,
/// }
/// ```
#[proc_macro_derive(RelationshipEntity, attributes(graph))]
pub fn derive_relationship_entity(input: TokenStream) -> TokenStream {
    relationship_entity::derive_relationship_entity_impl(input)
}
