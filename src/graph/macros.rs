//! Macro for convenient Cypher query construction.

/// Macro for inline Cypher queries with optional parameters.
///
/// This macro provides a shorthand for creating and parameterizing queries.
///
/// # Usage
///
/// ```ignore
/// use graphrepo::graph::{cypher, QueryExt};
///
/// // Query without parameters
/// let query = cypher!(executor, "MATCH (n:Person) RETURN n");
///
/// // Query with parameters
/// let query = cypher!(executor, "MATCH (n) WHERE id(n) = $id RETURN n", id = node_id);
///
/// // Multiple parameters
/// let query = cypher!(
///     executor,
///     "MATCH (n:Person) WHERE n.name = $name AND n.age > $age RETURN n",
///     name = "Alice",
///     age = 30
/// );
///
/// // Execute the query
/// let rows = query.fetch_all().await?;
/// ```
#[macro_export]
macro_rules! cypher {
    // Query without parameters
    ($executor:expr, $query:expr) => {
        $executor.query($query)
    };
    // Query with parameters
    ($executor:expr, $query:expr, $($name:ident = $value:expr),+ $(,)?) => {
        $executor.query($query)$(.param(stringify!($name), $value))+
    };
}
