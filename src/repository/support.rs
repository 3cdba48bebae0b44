//! Query plumbing shared by the node and relationship repositories.

use std::marker::PhantomData;

use serde_json::{Map, Value as JsonValue};

use crate::entity::{GraphEntity, GraphEntityInformation};
use crate::error::AppError;
use crate::graph::{QueryExt, Row, SharedExecutor};
use crate::query::{convert_row, ElementType};
use crate::repository::crud::{validate_identifier, Page, PageRequest, Sort};

/// Matches and reads entities of one type through a fixed pattern.
///
/// The pattern binds the element to `n`, e.g. `(n:Person)` or
/// `()-[n:KNOWS]->()`.
pub(crate) struct EntityStore<T> {
    pub(crate) graph: SharedExecutor,
    pub(crate) info: GraphEntityInformation,
    pattern: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: GraphEntity> EntityStore<T> {
    pub(crate) fn new(
        graph: SharedExecutor,
        info: GraphEntityInformation,
        pattern: String,
    ) -> Self {
        Self {
            graph,
            info,
            pattern,
            _entity: PhantomData,
        }
    }

    pub(crate) fn pattern(&self) -> &str {
        &self.pattern
    }

    pub(crate) fn label(&self) -> &'static str {
        self.info.label()
    }

    pub(crate) fn properties(&self, entity: &T) -> Result<Map<String, JsonValue>, AppError> {
        self.info.entity_type().to_properties(entity)
    }

    pub(crate) fn to_entity(&self, row: &Row) -> Result<T, AppError> {
        let value = convert_row(row, &ElementType::Entity(*self.info.entity_type()))?;
        serde_json::from_value(value).map_err(|e| {
            AppError::Conversion(format!("failed to build {}: {}", self.info.type_name(), e))
        })
    }

    pub(crate) fn to_entities(&self, rows: &[Row]) -> Result<Vec<T>, AppError> {
        rows.iter().map(|row| self.to_entity(row)).collect()
    }

    /// Reads the single row a write query returns.
    pub(crate) fn saved(&self, rows: Vec<Row>) -> Result<T, AppError> {
        match rows.as_slice() {
            [row] => self.to_entity(row),
            _ => Err(AppError::IncorrectResultSize {
                expected: 1,
                actual: rows.len(),
            }),
        }
    }

    pub(crate) async fn find_by_id(&self, id: i64) -> Result<Option<T>, AppError> {
        let cypher = format!("MATCH {} WHERE id(n) = $id RETURN n", self.pattern);
        let row = crate::cypher!(self.graph, &cypher, id = id).fetch_one().await?;
        row.map(|row| self.to_entity(&row)).transpose()
    }

    pub(crate) async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let cypher = format!(
            "MATCH {} WHERE id(n) = $id RETURN count(n) AS count",
            self.pattern
        );
        let count = self.count_rows(&cypher, Some(id)).await?;
        Ok(count > 0)
    }

    pub(crate) async fn find_all(&self) -> Result<Vec<T>, AppError> {
        self.find_all_sorted(&Sort::unsorted()).await
    }

    pub(crate) async fn find_all_sorted(&self, sort: &Sort) -> Result<Vec<T>, AppError> {
        let cypher = format!("MATCH {} RETURN n{}", self.pattern, sort.to_cypher("n")?);
        let rows = self.graph.query(&cypher).fetch_all().await?;
        self.to_entities(&rows)
    }

    pub(crate) async fn find_page(&self, request: &PageRequest) -> Result<Page<T>, AppError> {
        request.validate()?;
        let cypher = format!(
            "MATCH {} RETURN n{} SKIP $skip LIMIT $limit",
            self.pattern,
            request.sort.to_cypher("n")?
        );
        let rows = self
            .graph
            .query(&cypher)
            .param("skip", request.offset())
            .param("limit", request.size)
            .fetch_all()
            .await?;

        Ok(Page {
            content: self.to_entities(&rows)?,
            page: request.page,
            size: request.size,
            total_elements: self.count().await?,
        })
    }

    pub(crate) async fn count(&self) -> Result<u64, AppError> {
        let cypher = format!("MATCH {} RETURN count(n) AS count", self.pattern);
        self.count_rows(&cypher, None).await
    }

    pub(crate) async fn find_all_by_property_value(
        &self,
        property: &str,
        value: JsonValue,
    ) -> Result<Vec<T>, AppError> {
        let property = validate_identifier("property", property)?;
        let cypher = format!(
            "MATCH {} WHERE n.{} = $value RETURN n",
            self.pattern, property
        );
        let rows = self
            .graph
            .query(&cypher)
            .param_raw("value", value)
            .fetch_all()
            .await?;
        self.to_entities(&rows)
    }

    pub(crate) async fn find_by_property_value(
        &self,
        property: &str,
        value: JsonValue,
    ) -> Result<Option<T>, AppError> {
        let mut found = self.find_all_by_property_value(property, value).await?;
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            actual => Err(AppError::IncorrectResultSize {
                expected: 1,
                actual,
            }),
        }
    }

    pub(crate) async fn find_all_by_range(
        &self,
        property: &str,
        from: JsonValue,
        to: JsonValue,
    ) -> Result<Vec<T>, AppError> {
        let property = validate_identifier("property", property)?;
        let cypher = format!(
            "MATCH {} WHERE n.{p} >= $from AND n.{p} <= $to RETURN n",
            self.pattern,
            p = property
        );
        let rows = self
            .graph
            .query(&cypher)
            .param_raw("from", from)
            .param_raw("to", to)
            .fetch_all()
            .await?;
        self.to_entities(&rows)
    }

    /// Runs a delete clause against the elements matched by id, or all of
    /// them when no id is given.
    pub(crate) async fn delete_matching(&self, clause: &str, id: Option<i64>) -> Result<(), AppError> {
        match id {
            Some(id) => {
                let cypher = format!("MATCH {} WHERE id(n) = $id {}", self.pattern, clause);
                self.graph.query(&cypher).param("id", id).run().await
            }
            None => {
                let cypher = format!("MATCH {} {}", self.pattern, clause);
                self.graph.query(&cypher).run().await
            }
        }
    }

    async fn count_rows(&self, cypher: &str, id: Option<i64>) -> Result<u64, AppError> {
        let mut query = self.graph.query(cypher);
        if let Some(id) = id {
            query = query.param("id", id);
        }
        match query.fetch_one().await? {
            Some(row) => row.get("count"),
            None => Ok(0),
        }
    }
}

/// The id to delete, or `NotPersisted` for an entity never saved.
pub(crate) fn persisted_id<T: GraphEntity>(
    info: &GraphEntityInformation,
    entity: &T,
) -> Result<i64, AppError> {
    info.id(entity)
        .ok_or_else(|| AppError::NotPersisted(info.type_name().to_string()))
}

/// Rejects labels that cannot be spliced into a pattern.
pub(crate) fn checked_label(info: &GraphEntityInformation) -> Result<&'static str, AppError> {
    validate_identifier("label", info.label())
}
