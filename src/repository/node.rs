//! Node-backed base repository.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::entity::{GraphEntity, GraphEntityInformation};
use crate::error::AppError;
use crate::graph::{QueryExt, SharedExecutor};
use crate::repository::crud::{GraphRepository, Page, PageRequest, Sort};
use crate::repository::support::{checked_label, persisted_id, EntityStore};

/// CRUD over vertices carrying the entity's label.
pub struct NodeGraphRepository<T> {
    store: EntityStore<T>,
}

impl<T: GraphEntity> NodeGraphRepository<T> {
    /// Fails when `T` is not a node entity or its label is not a plain
    /// identifier.
    pub fn new(graph: SharedExecutor) -> Result<Self, AppError> {
        let info = GraphEntityInformation::of::<T>()?;
        if !info.is_node_entity() {
            return Err(AppError::Validation(format!(
                "{} is a {} entity, not a node entity",
                info.type_name(),
                info.kind()
            )));
        }
        let pattern = format!("(n:{})", checked_label(&info)?);
        Ok(Self {
            store: EntityStore::new(graph, info, pattern),
        })
    }

    pub fn entity_information(&self) -> &GraphEntityInformation {
        &self.store.info
    }
}

#[async_trait]
impl<T: GraphEntity> GraphRepository<T> for NodeGraphRepository<T> {
    async fn save(&self, entity: &T) -> Result<T, AppError> {
        let properties = JsonValue::Object(self.store.properties(entity)?);
        let query = match self.store.info.id(entity) {
            None => self
                .store
                .graph
                .query(&format!("CREATE (n:{}) SET n = $props RETURN n", self.store.label())),
            Some(id) => self
                .store
                .graph
                .query(&format!(
                    "MATCH {} WHERE id(n) = $id SET n = $props RETURN n",
                    self.store.pattern()
                ))
                .param("id", id),
        };
        let rows = query.param_raw("props", properties).fetch_all().await?;
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

    /// Relationships attached to the node are removed with it.
    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        self.store.delete_matching("DETACH DELETE n", Some(id)).await
    }

    async fn delete_all(&self) -> Result<(), AppError> {
        self.store.delete_matching("DETACH DELETE n", None).await
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
