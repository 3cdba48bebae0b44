//! graphrepo - annotation-driven repositories over a Cypher graph database
//!
//! Domain types derive [`NodeEntity`] or [`RelationshipEntity`]. A
//! [`repository::GraphRepositoryFactory`] turns a repository declaration
//! into a proxy whose methods run either generic CRUD or a query template
//! attached to the method.

// Derive output refers to `::graphrepo::...`, which must also resolve here.
extern crate self as graphrepo;

pub mod cli;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod graph;
pub mod query;
pub mod repository;

pub use graphrepo_macros::{NodeEntity, RelationshipEntity};
