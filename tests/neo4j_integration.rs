//! Integration tests for the Neo4j backend.
//!
//! These tests require a running Neo4j instance.
//! Run with: `cargo test --features integration,neo4j --test neo4j_integration`
//!
//! Connection settings come from `GRAPHREPO_NEO4J__URI`,
//! `GRAPHREPO_NEO4J__USER` and `GRAPHREPO_NEO4J__PASSWORD`.

#![cfg(all(feature = "integration", feature = "neo4j"))]

use serde::{Deserialize, Serialize};
use serde_json::json;
use serial_test::serial;

use graphrepo::args;
use graphrepo::config::Config;
use graphrepo::context::Context;
use graphrepo::entity::NodeRef;
use graphrepo::graph::{CypherExecutor, Params, QueryExt};
use graphrepo::repository::{GraphRepository, GraphRepositoryFactory, RepositoryMetadata, ReturnType};
use graphrepo::{NodeEntity, RelationshipEntity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, NodeEntity)]
#[graph(label = "IntegrationPerson")]
struct Person {
    #[graph(id)]
    id: Option<i64>,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, RelationshipEntity)]
#[graph(type = "INTEGRATION_KNOWS")]
struct Knows {
    #[graph(id)]
    id: Option<i64>,
    #[graph(start)]
    from: i64,
    #[graph(end)]
    to: i64,
}

async fn create_context() -> Context {
    let config = Config::load().expect("Failed to load config");
    Context::connect(config)
        .await
        .expect("Failed to connect to test database")
}

/// Clean up test data before/after tests
async fn cleanup(ctx: &Context) {
    let _ = ctx
        .graph
        .run_cypher("MATCH (n:IntegrationPerson) DETACH DELETE n", Params::new())
        .await;
}

// All tests run serially since they share the IntegrationPerson label
#[serial]
mod database_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_result() {
        let ctx = create_context().await;
        cleanup(&ctx).await;

        let rows = ctx
            .graph
            .query("MATCH (n:IntegrationPerson) RETURN n")
            .fetch_all()
            .await
            .expect("Query failed");

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_find_node() {
        let ctx = create_context().await;
        cleanup(&ctx).await;

        let people = GraphRepositoryFactory::from_context(&ctx)
            .repository::<Person>(RepositoryMetadata::for_entity::<Person>("PersonRepository"))
            .expect("Failed to assemble repository");

        let saved = people
            .crud()
            .save(&Person {
                id: None,
                name: "Alice".into(),
            })
            .await
            .expect("Save failed");
        let id = saved.id.expect("Saved node has no id");

        let found = people.crud().find_by_id(id).await.expect("Find failed");
        assert_eq!(found, Some(saved));
        assert_eq!(people.crud().count().await.expect("Count failed"), 1);

        cleanup(&ctx).await;
    }

    #[tokio::test]
    async fn test_annotated_queries() {
        let ctx = create_context().await;
        cleanup(&ctx).await;

        let factory = GraphRepositoryFactory::from_context(&ctx);
        let people = factory
            .repository::<Person>(
                RepositoryMetadata::for_entity::<Person>("PersonRepository")
                    .query(
                        "find_by_name",
                        ReturnType::entity::<Person>(),
                        "MATCH (n:IntegrationPerson) WHERE n.name = '%s' RETURN n",
                    )
                    .query(
                        "friends_of",
                        ReturnType::entities::<Person>(),
                        "MATCH (p)-[:INTEGRATION_KNOWS]->(n) WHERE id(p) = %d RETURN n",
                    ),
            )
            .expect("Failed to assemble repository");
        let knows = factory
            .repository::<Knows>(RepositoryMetadata::for_entity::<Knows>("KnowsRepository"))
            .expect("Failed to assemble repository");

        let alice = people
            .crud()
            .save(&Person {
                id: None,
                name: "Alice".into(),
            })
            .await
            .expect("Save failed");
        let bob = people
            .crud()
            .save(&Person {
                id: None,
                name: "Bob".into(),
            })
            .await
            .expect("Save failed");
        let alice_id = alice.id.expect("no id");
        knows
            .crud()
            .save(&Knows {
                id: None,
                from: alice_id,
                to: bob.id.expect("no id"),
            })
            .await
            .expect("Relationship save failed");

        let found: Person = people
            .invoke("find_by_name", &args!["Alice"])
            .await
            .expect("Query failed")
            .into_object()
            .expect("Conversion failed");
        assert_eq!(found, alice);

        let friends: Vec<Person> = people
            .invoke("friends_of", &args![NodeRef(alice_id)])
            .await
            .expect("Query failed")
            .into_vec()
            .expect("Conversion failed");
        assert_eq!(friends, vec![bob]);

        cleanup(&ctx).await;
    }

    #[tokio::test]
    async fn test_scalar_columns() {
        let ctx = create_context().await;

        let row = ctx
            .graph
            .query("RETURN $value AS value")
            .param("value", json!({"nested": [1, 2]}))
            .fetch_one()
            .await
            .expect("Query failed")
            .expect("No row");

        assert_eq!(row.get_raw("value"), Some(&json!({"nested": [1, 2]})));
    }
}
