//! Backend implementations for different graph databases.
//!
//! Each backend implements [`CypherExecutor`](crate::graph::CypherExecutor)
//! and reports graph elements in the shared element shape.
//!
//! # Available Backends
//!
//! | Backend | Module | Feature |
//! |---------|--------|---------|
//! | Neo4j (Bolt) | [`neo4j`] | `neo4j` |
//!
//! # Implementing a Backend
//!
//! 1. Create a client struct (e.g., `Neo4jClient`)
//! 2. Implement `CypherExecutor` for it
//! 3. Return nodes as `{"id", "label", "properties"}` and relationships with
//!    additional `start_id`/`end_id` columns

#[cfg(feature = "neo4j")]
pub mod neo4j;
