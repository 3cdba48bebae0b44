//! Method dispatch for an assembled repository.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::entity::GraphEntity;
use crate::error::AppError;
use crate::query::{Argument, QueryResult};
use crate::repository::crud::GraphRepository;
use crate::repository::factory::{RepositoryBase, TargetRepository};
use crate::repository::lookup::{AnnotatedQuery, RepositoryQuery};
use crate::repository::metadata::RepositoryMetadata;

/// A repository as seen by callers: annotated methods run their query,
/// generic CRUD methods run on the base repository.
pub struct GraphRepositoryProxy<T> {
    metadata: Arc<RepositoryMetadata>,
    target: TargetRepository<T>,
    queries: HashMap<String, AnnotatedQuery>,
}

impl<T: GraphEntity> GraphRepositoryProxy<T> {
    pub(crate) fn new(
        metadata: Arc<RepositoryMetadata>,
        target: TargetRepository<T>,
        queries: HashMap<String, AnnotatedQuery>,
    ) -> Self {
        Self {
            metadata,
            target,
            queries,
        }
    }

    pub fn metadata(&self) -> &RepositoryMetadata {
        &self.metadata
    }

    pub fn base(&self) -> RepositoryBase {
        self.target.base()
    }

    /// The typed base repository.
    pub fn crud(&self) -> &dyn GraphRepository<T> {
        self.target.as_crud()
    }

    /// The query object backing a method, if it is annotated.
    pub fn query(&self, method: &str) -> Option<&AnnotatedQuery> {
        self.queries.get(method)
    }

    /// Calls a repository method by name.
    ///
    /// `find_by_id`, `exists` and `delete_by_id` take the id as their only
    /// argument. A node or relationship handle works as well.
    pub async fn invoke(&self, method: &str, arguments: &[Argument]) -> Result<QueryResult, AppError> {
        if let Some(query) = self.queries.get(method) {
            return query.execute(arguments).await;
        }

        tracing::debug!(
            repository = self.metadata.repository_interface(),
            method,
            "dispatching to base repository"
        );
        let crud = self.crud();
        match method {
            "find_all" => {
                no_arguments(method, arguments)?;
                let entities = crud.find_all().await?;
                Ok(QueryResult::Elements(to_values(&entities)?))
            }
            "find_by_id" => {
                let found = crud.find_by_id(id_argument(method, arguments)?).await?;
                Ok(QueryResult::Object(serde_json::to_value(found)?))
            }
            "exists" => {
                let exists = crud.exists(id_argument(method, arguments)?).await?;
                Ok(QueryResult::Object(JsonValue::Bool(exists)))
            }
            "count" => {
                no_arguments(method, arguments)?;
                Ok(QueryResult::Object(JsonValue::from(crud.count().await?)))
            }
            "delete_by_id" => {
                crud.delete_by_id(id_argument(method, arguments)?).await?;
                Ok(QueryResult::Unit)
            }
            "delete_all" => {
                no_arguments(method, arguments)?;
                crud.delete_all().await?;
                Ok(QueryResult::Unit)
            }
            _ => Err(AppError::UnknownMethod {
                repository: self.metadata.repository_interface().to_string(),
                method: method.to_string(),
            }),
        }
    }
}

fn to_values<T: Serialize>(entities: &[T]) -> Result<Vec<JsonValue>, AppError> {
    entities
        .iter()
        .map(|entity| serde_json::to_value(entity).map_err(AppError::from))
        .collect()
}

fn id_argument(method: &str, arguments: &[Argument]) -> Result<i64, AppError> {
    let [argument] = arguments else {
        return Err(AppError::Validation(format!(
            "{} takes one id argument, got {}",
            method,
            arguments.len()
        )));
    };
    let value = argument.resolve()?;
    value
        .as_i64()
        .ok_or_else(|| AppError::Validation(format!("{} expects an integer id, got {}", method, value)))
}

fn no_arguments(method: &str, arguments: &[Argument]) -> Result<(), AppError> {
    if arguments.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{} takes no arguments, got {}",
            method,
            arguments.len()
        )))
    }
}
