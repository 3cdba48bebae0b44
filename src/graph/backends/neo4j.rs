//! Neo4j backend over the `neo4rs` Bolt driver.
//!
//! # Example
//!
//! ```ignore
//! use graphrepo::graph::backends::neo4j::Neo4jClient;
//! use graphrepo::graph::QueryExt;
//!
//! let client = Neo4jClient::connect("127.0.0.1:7687", "neo4j", "secret").await?;
//! let rows = client.query("MATCH (n:Person) RETURN n").fetch_all().await?;
//! ```
//!
//! Nodes and relationships are returned as graph element objects
//! (`{"id", "label", "properties"}` plus `start_id`/`end_id` for
//! relationships), the same shape every backend produces.

use std::collections::HashMap;
use std::sync::Arc;

use async_stream::try_stream;
use async_trait::async_trait;
use neo4rs::{BoltList, BoltMap, BoltNull, BoltString, BoltType};
use serde_json::{Map, Value as JsonValue};

use crate::config::Neo4jConfig;
use crate::error::AppError;
use crate::graph::row::{Params, Row, RowStream};
use crate::graph::traits::CypherExecutor;

/// Neo4j graph client.
///
/// This type is cheap to clone - `neo4rs::Graph` pools its connections
/// internally and is shared behind an `Arc`.
#[derive(Clone)]
pub struct Neo4jClient {
    graph: Arc<neo4rs::Graph>,
}

impl Neo4jClient {
    /// Connects to a Neo4j server.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, AppError> {
        let graph = neo4rs::Graph::new(uri, user, password).await?;
        Ok(Self {
            graph: Arc::new(graph),
        })
    }

    /// Connects using the `[neo4j]` configuration section.
    pub async fn from_config(config: &Neo4jConfig) -> Result<Self, AppError> {
        Self::connect(
            &config.uri,
            &config.user,
            config.password.as_deref().unwrap_or(""),
        )
        .await
    }

    fn build_query(cypher: &str, params: Params) -> neo4rs::Query {
        params
            .into_iter()
            .fold(neo4rs::query(cypher), |query, (name, value)| {
                query.param(&name, json_to_bolt(value))
            })
    }
}

#[async_trait]
impl CypherExecutor for Neo4jClient {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        let query = Self::build_query(cypher, params);
        let mut result = self.graph.execute(query).await.map_err(|e| AppError::Query {
            message: e.to_string(),
            query: cypher.to_string(),
        })?;

        Ok(Box::pin(try_stream! {
            while let Some(row) = result.next().await.map_err(AppError::from)? {
                yield convert_row(&row)?;
            }
        }))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        let query = Self::build_query(cypher, params);
        self.graph.run(query).await.map_err(|e| AppError::Query {
            message: e.to_string(),
            query: cypher.to_string(),
        })
    }
}

/// Converts a JSON parameter into a Bolt value.
fn json_to_bolt(value: JsonValue) -> BoltType {
    match value {
        JsonValue::Null => BoltType::Null(BoltNull),
        JsonValue::Bool(b) => BoltType::from(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => BoltType::from(i),
            None => BoltType::from(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => BoltType::from(s),
        JsonValue::Array(items) => BoltType::List(BoltList::from(
            items.into_iter().map(json_to_bolt).collect::<Vec<_>>(),
        )),
        JsonValue::Object(entries) => {
            let mut map = BoltMap::with_capacity(entries.len());
            for (key, value) in entries {
                map.put(BoltString::from(key), json_to_bolt(value));
            }
            BoltType::Map(map)
        }
    }
}

/// Converts a Bolt row into our generic Row type.
fn convert_row(row: &neo4rs::Row) -> Result<Row, AppError> {
    let columns: HashMap<String, BoltType> = row
        .to()
        .map_err(|e| AppError::Conversion(format!("failed to read row: {}", e)))?;
    let data = columns
        .into_iter()
        .map(|(name, value)| (name, bolt_to_json(value).unwrap_or(JsonValue::Null)))
        .collect();
    Ok(Row::new(data))
}

/// Converts a Bolt value into JSON.
///
/// Nodes and relationships become element objects. Values without a JSON
/// form (temporal, spatial, paths) give `None`.
fn bolt_to_json(value: BoltType) -> Option<JsonValue> {
    let json = match value {
        BoltType::Null(_) => JsonValue::Null,
        BoltType::Boolean(b) => JsonValue::Bool(b.value),
        BoltType::Integer(i) => JsonValue::from(i.value),
        BoltType::Float(f) => serde_json::Number::from_f64(f.value)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        BoltType::String(s) => JsonValue::String(s.value),
        BoltType::Bytes(bytes) => JsonValue::from(bytes.value.to_vec()),
        BoltType::List(list) => JsonValue::Array(
            list.value
                .into_iter()
                .map(|item| bolt_to_json(item).unwrap_or(JsonValue::Null))
                .collect(),
        ),
        BoltType::Map(map) => JsonValue::Object(properties_to_json(map)),
        BoltType::Node(node) => {
            let label = node.labels.value.into_iter().find_map(|label| match label {
                BoltType::String(s) => Some(s.value),
                _ => None,
            });
            serde_json::json!({
                "id": node.id.value,
                "label": label.unwrap_or_default(),
                "properties": properties_to_json(node.properties),
            })
        }
        BoltType::Relation(rel) => serde_json::json!({
            "id": rel.id.value,
            "label": rel.typ.value,
            "start_id": rel.start_node_id.value,
            "end_id": rel.end_node_id.value,
            "properties": properties_to_json(rel.properties),
        }),
        _ => return None,
    };
    Some(json)
}

fn properties_to_json(map: BoltMap) -> Map<String, JsonValue> {
    map.value
        .into_iter()
        .filter_map(|(key, value)| bolt_to_json(value).map(|value| (key.value, value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use neo4rs::{BoltInteger, BoltNode, BoltRelation};
    use serde_json::json;

    #[test]
    fn test_json_to_bolt_scalars() {
        assert_eq!(json_to_bolt(json!(42)), BoltType::from(42_i64));
        assert_eq!(json_to_bolt(json!("Alice")), BoltType::from("Alice".to_string()));
        assert_eq!(json_to_bolt(json!(true)), BoltType::from(true));
        assert_eq!(json_to_bolt(JsonValue::Null), BoltType::Null(BoltNull));
    }

    #[test]
    fn test_json_to_bolt_nested() {
        let bolt = json_to_bolt(json!({"tags": ["a", "b"]}));
        assert!(matches!(bolt, BoltType::Map(_)));
    }

    fn props(name: &str) -> BoltMap {
        let mut map = BoltMap::with_capacity(1);
        map.put(BoltString::from("name"), BoltType::from(name));
        map
    }

    #[test]
    fn test_convert_row_builds_element_objects() {
        let node = BoltType::Node(BoltNode {
            id: BoltInteger::new(1),
            labels: BoltList::from(vec![BoltType::from("Person")]),
            properties: props("Alice"),
        });
        let rel = BoltType::Relation(BoltRelation {
            id: BoltInteger::new(7),
            start_node_id: BoltInteger::new(1),
            end_node_id: BoltInteger::new(2),
            typ: BoltString::from("KNOWS"),
            properties: BoltMap::with_capacity(0),
        });
        let row = neo4rs::Row::new(
            BoltList::from(vec![
                BoltType::from("n"),
                BoltType::from("r"),
                BoltType::from("total"),
            ]),
            BoltList::from(vec![node, rel, BoltType::from(3_i64)]),
        );

        let row = convert_row(&row).unwrap();
        assert_eq!(
            row.get_raw("n"),
            Some(&json!({"id": 1, "label": "Person", "properties": {"name": "Alice"}}))
        );
        assert_eq!(
            row.get_raw("r"),
            Some(&json!({
                "id": 7,
                "label": "KNOWS",
                "start_id": 1,
                "end_id": 2,
                "properties": {},
            }))
        );
        assert_eq!(row.get_raw("total"), Some(&json!(3)));
    }

    #[test]
    fn test_bolt_to_json_nested_values() {
        let list = BoltType::List(BoltList::from(vec![
            BoltType::from("a"),
            BoltType::Null(BoltNull),
            BoltType::from(true),
        ]));
        assert_eq!(bolt_to_json(list), Some(json!(["a", null, true])));
        assert_eq!(
            bolt_to_json(BoltType::Map(props("Bob"))),
            Some(json!({"name": "Bob"}))
        );
    }
}
