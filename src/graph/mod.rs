//! Graph abstraction layer for backend-agnostic database access.
//!
//! Repositories and annotated queries never talk to a driver directly. They
//! run against a [`CypherExecutor`], which a backend implements (see
//! [`backends`]), and read results as [`Row`]s of JSON values.
//!
//! # Usage
//!
//! ```ignore
//! use graphrepo::graph::QueryExt;
//!
//! // Simple query
//! let rows = executor.query("MATCH (n:Person) RETURN n")
//!     .fetch_all()
//!     .await?;
//!
//! // Query with parameters
//! let row = executor.query("MATCH (n) WHERE id(n) = $id RETURN n")
//!     .param("id", 42)
//!     .fetch_one()
//!     .await?;
//!
//! // Write query (no results)
//! executor.query("CREATE (n:Person {name: $name})")
//!     .param("name", "Alice")
//!     .run()
//!     .await?;
//! ```

mod macros;
mod query;
mod row;
mod traits;

pub mod backends;

use std::sync::Arc;

// Re-export core types
pub use query::{Query, QueryExt};
pub use row::{Params, Row, RowStream};
pub use traits::CypherExecutor;

// Re-export macro (defined at crate root via #[macro_export])
#[doc(inline)]
pub use crate::cypher;

/// Shared handle to the database context.
pub type SharedExecutor = Arc<dyn CypherExecutor>;
