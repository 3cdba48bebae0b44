//! Query execution service: runs Cypher and converts rows to a target type.

use serde_json::Value as JsonValue;

use crate::entity::{EntityType, GraphElement, GraphEntity};
use crate::error::AppError;
use crate::graph::{Params, QueryExt, Row, SharedExecutor};

/// The type each result row is converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// Raw column-name to value mappings, no conversion.
    Mapping,
    /// A domain entity, read from a graph element column.
    Entity(EntityType),
    /// A plain value (string, number, list...) read from a single column.
    Value(&'static str),
}

impl ElementType {
    pub fn entity<T: GraphEntity>() -> Self {
        ElementType::Entity(T::ENTITY_TYPE)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, ElementType::Mapping)
    }

    /// Display name, e.g. for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Mapping => "Map",
            ElementType::Entity(entity_type) => entity_type.name,
            ElementType::Value(name) => name,
        }
    }
}

/// Runs queries against the database context and shapes their rows.
///
/// Holds only a shared handle to the executor; cloning is cheap.
#[derive(Clone)]
pub struct QueryExecutor {
    graph: SharedExecutor,
}

impl QueryExecutor {
    pub fn new(graph: SharedExecutor) -> Self {
        Self { graph }
    }

    /// Executes a query that must produce exactly one row.
    pub async fn query_for_object(
        &self,
        cypher: &str,
        params: Params,
        target: &ElementType,
    ) -> Result<JsonValue, AppError> {
        let rows = self.query(cypher, params).await?;
        match rows.as_slice() {
            [row] => convert_row(row, target),
            _ => Err(AppError::IncorrectResultSize {
                expected: 1,
                actual: rows.len(),
            }),
        }
    }

    /// Executes a query and returns the raw rows.
    pub async fn query(&self, cypher: &str, params: Params) -> Result<Vec<Row>, AppError> {
        tracing::debug!(cypher, params = params.len(), "executing query");
        self.graph.query(cypher).params(params).fetch_all().await
    }

    /// Executes a query and converts every row to the target type.
    pub async fn query_typed(
        &self,
        cypher: &str,
        params: Params,
        target: &ElementType,
    ) -> Result<Vec<JsonValue>, AppError> {
        let rows = self.query(cypher, params).await?;
        rows.iter().map(|row| convert_row(row, target)).collect()
    }
}

/// Converts one row to the JSON form of the target type.
pub fn convert_row(row: &Row, target: &ElementType) -> Result<JsonValue, AppError> {
    match target {
        ElementType::Mapping => Ok(serde_json::to_value(row)?),
        ElementType::Entity(entity_type) => {
            let value = row.single_value()?;
            let element = GraphElement::from_value(value).ok_or_else(|| {
                AppError::Conversion(format!(
                    "expected a graph element for {}, got {}",
                    entity_type.name, value
                ))
            })?;
            entity_type.element_to_value(element)
        }
        ElementType::Value(_) => row.single_value().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use serde_json::json;

    use crate::graph::{CypherExecutor, RowStream};

    struct FixedRows(Vec<Row>);

    #[async_trait::async_trait]
    impl CypherExecutor for FixedRows {
        async fn execute_cypher(
            &self,
            _cypher: &str,
            _params: Params,
        ) -> Result<RowStream<'_>, AppError> {
            let rows: Vec<Result<Row, AppError>> = self.0.iter().cloned().map(Ok).collect();
            Ok(Box::pin(futures::stream::iter(rows)))
        }

        async fn run_cypher(&self, _cypher: &str, _params: Params) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn row(column: &str, value: JsonValue) -> Row {
        let mut data = HashMap::new();
        data.insert(column.to_string(), value);
        Row::new(data)
    }

    fn executor(rows: Vec<Row>) -> QueryExecutor {
        QueryExecutor::new(Arc::new(FixedRows(rows)))
    }

    const PERSON: EntityType = EntityType::node("Person", "Person", "id");

    #[tokio::test]
    async fn test_query_for_object_single_row() {
        let exec = executor(vec![row(
            "n",
            json!({"id": 1, "label": "Person", "properties": {"name": "Alice"}}),
        )]);
        let value = exec
            .query_for_object("MATCH (n) RETURN n", Params::new(), &ElementType::Entity(PERSON))
            .await
            .unwrap();
        assert_eq!(value, json!({"id": 1, "name": "Alice"}));
    }

    #[tokio::test]
    async fn test_query_for_object_no_rows() {
        let exec = executor(vec![]);
        let err = exec
            .query_for_object("MATCH (n) RETURN n", Params::new(), &ElementType::Value("String"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::IncorrectResultSize {
                expected: 1,
                actual: 0
            }
        ));
    }

    #[tokio::test]
    async fn test_query_for_object_many_rows() {
        let exec = executor(vec![row("c", json!(1)), row("c", json!(2))]);
        let err = exec
            .query_for_object("MATCH (n) RETURN n.c AS c", Params::new(), &ElementType::Value("i64"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IncorrectResultSize { actual: 2, .. }));
    }

    #[tokio::test]
    async fn test_query_typed_values() {
        let exec = executor(vec![row("name", json!("Alice")), row("name", json!("Bob"))]);
        let values = exec
            .query_typed("MATCH (n) RETURN n.name AS name", Params::new(), &ElementType::Value("String"))
            .await
            .unwrap();
        assert_eq!(values, vec![json!("Alice"), json!("Bob")]);
    }

    #[test]
    fn test_convert_mapping_keeps_all_columns() {
        let mut data = HashMap::new();
        data.insert("name".to_string(), json!("Alice"));
        data.insert("age".to_string(), json!(30));
        let value = convert_row(&Row::new(data), &ElementType::Mapping).unwrap();
        assert_eq!(value, json!({"name": "Alice", "age": 30}));
    }

    #[test]
    fn test_convert_entity_requires_element() {
        let result = convert_row(&row("n", json!("not a node")), &ElementType::Entity(PERSON));
        assert!(matches!(result, Err(AppError::Conversion(_))));
    }
}
