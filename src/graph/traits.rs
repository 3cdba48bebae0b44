//! The executor seam every graph backend implements.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppError;
use crate::graph::row::{Params, RowStream};

/// Executes Cypher queries against a graph database.
///
/// This is the database context repositories and annotated queries run
/// against. Implementations own connection management; callers only see
/// rows.
#[async_trait]
pub trait CypherExecutor: Send + Sync {
    /// Executes a Cypher query and returns a stream of result rows.
    ///
    /// # Arguments
    ///
    /// * `cypher` - The Cypher query string
    /// * `params` - Parameters to bind to the query
    async fn execute_cypher(&self, cypher: &str, params: Params)
        -> Result<RowStream<'_>, AppError>;

    /// Executes a Cypher query without returning results.
    ///
    /// Use this for mutations (CREATE, MERGE, DELETE, SET).
    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError>;
}

#[async_trait]
impl<E: CypherExecutor + ?Sized> CypherExecutor for Arc<E> {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        (**self).execute_cypher(cypher, params).await
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        (**self).run_cypher(cypher, params).await
    }
}
