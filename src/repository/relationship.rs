//! Relationship-backed base repository.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::entity::{GraphEntity, GraphEntityInformation};
use crate::error::AppError;
use crate::graph::{QueryExt, SharedExecutor};
use crate::repository::crud::{GraphRepository, Page, PageRequest, Sort};
use crate::repository::support::{checked_label, persisted_id, EntityStore};

/// CRUD over edges of the entity's relationship type.
///
/// New relationships are created between the nodes named by the entity's
/// start and end fields. Both nodes must already exist.
pub struct RelationshipGraphRepository<T> {
    store: EntityStore<T>,
}

impl<T: GraphEntity> RelationshipGraphRepository<T> {
    pub fn new(graph: SharedExecutor) -> Result<Self, AppError> {
        let info = GraphEntityInformation::of::<T>()?;
        if !info.is_relationship_entity() {
            return Err(AppError::Validation(format!(
                "{} is a {} entity, not a relationship entity",
                info.type_name(),
                info.kind()
            )));
        }
        let pattern = format!("()-[n:{}]->()", checked_label(&info)?);
        Ok(Self {
            store: EntityStore::new(graph, info, pattern),
        })
    }

    pub fn entity_information(&self) -> &GraphEntityInformation {
        &self.store.info
    }

    async fn create(&self, entity: &T, properties: JsonValue) -> Result<T, AppError> {
        let (start, end) = entity.endpoints().ok_or_else(|| {
            AppError::Validation(format!(
                "{} has no start and end node",
                self.store.info.type_name()
            ))
        })?;
        let cypher = format!(
            "MATCH (a), (b) WHERE id(a) = $start AND id(b) = $end \
             CREATE (a)-[n:{}]->(b) SET n = $props RETURN n",
            self.store.label()
        );
        let rows = self
            .store
            .graph
            .query(&cypher)
            .param("start", start)
            .param("end", end)
            .param_raw("props", properties)
            .fetch_all()
            .await?;
        self.store.saved(rows)
    }
}

#[async_trait]
impl<T: GraphEntity> GraphRepository<T> for RelationshipGraphRepository<T> {
    async fn save(&self, entity: &T) -> Result<T, AppError> {
        let properties = JsonValue::Object(self.store.properties(entity)?);
        let Some(id) = self.store.info.id(entity) else {
            return self.create(entity, properties).await;
        };

        let cypher = format!(
            "MATCH {} WHERE id(n) = $id SET n = $props RETURN n",
            self.store.pattern()
        );
        let rows = self
            .store
            .graph
            .query(&cypher)
            .param("id", id)
            .param_raw("props", properties)
            .fetch_all()
            .await?;
        self.store.saved(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<T>, AppError> {
        self.store.find_by_id(id).await
    }

    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        self.store.exists(id).await
    }

    async fn find_all(&self) -> Result<Vec<T>, AppError> {
        self.store.find_all().await
    }

    async fn find_all_sorted(&self, sort: &Sort) -> Result<Vec<T>, AppError> {
        self.store.find_all_sorted(sort).await
    }

    async fn find_page(&self, request: &PageRequest) -> Result<Page<T>, AppError> {
        self.store.find_page(request).await
    }

    async fn count(&self) -> Result<u64, AppError> {
        self.store.count().await
    }

    async fn delete(&self, entity: &T) -> Result<(), AppError> {
        let id = persisted_id(&self.store.info, entity)?;
        self.delete_by_id(id).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        self.store.delete_matching("DELETE n", Some(id)).await
    }

    async fn delete_all(&self) -> Result<(), AppError> {
        self.store.delete_matching("DELETE n", None).await
    }

    async fn find_by_property_value(
        &self,
        property: &str,
        value: JsonValue,
    ) -> Result<Option<T>, AppError> {
        self.store.find_by_property_value(property, value).await
    }

    async fn find_all_by_property_value(
        &self,
        property: &str,
        value: JsonValue,
    ) -> Result<Vec<T>, AppError> {
        self.store.find_all_by_property_value(property, value).await
    }

    async fn find_all_by_range(
        &self,
        property: &str,
        from: JsonValue,
        to: JsonValue,
    ) -> Result<Vec<T>, AppError> {
        self.store.find_all_by_range(property, from, to).await
    }
}
