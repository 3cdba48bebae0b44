//! Assembles repositories from their declarations.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ParameterMode;
use crate::context::Context;
use crate::entity::{EntityKind, EntityType, GraphEntity, GraphEntityInformation};
use crate::error::AppError;
use crate::graph::SharedExecutor;
use crate::query::QueryExecutor;
use crate::repository::crud::GraphRepository;
use crate::repository::lookup::GraphQueryLookupStrategy;
use crate::repository::metadata::RepositoryMetadata;
use crate::repository::node::NodeGraphRepository;
use crate::repository::proxy::GraphRepositoryProxy;
use crate::repository::relationship::RelationshipGraphRepository;

/// The generic base implementation selected for a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryBase {
    Node,
    Relationship,
}

/// The concrete base repository for one domain type.
pub enum TargetRepository<T> {
    Node(NodeGraphRepository<T>),
    Relationship(RelationshipGraphRepository<T>),
}

impl<T: GraphEntity> TargetRepository<T> {
    pub fn base(&self) -> RepositoryBase {
        match self {
            TargetRepository::Node(_) => RepositoryBase::Node,
            TargetRepository::Relationship(_) => RepositoryBase::Relationship,
        }
    }

    pub fn as_crud(&self) -> &dyn GraphRepository<T> {
        match self {
            TargetRepository::Node(repository) => repository,
            TargetRepository::Relationship(repository) => repository,
        }
    }
}

/// Builds repositories over one database context.
///
/// Construction does no I/O. Queries run only when repository methods are
/// called.
#[derive(Clone)]
pub struct GraphRepositoryFactory {
    graph: SharedExecutor,
    executor: QueryExecutor,
    mode: ParameterMode,
}

impl GraphRepositoryFactory {
    pub fn new(graph: SharedExecutor) -> Self {
        Self {
            executor: QueryExecutor::new(Arc::clone(&graph)),
            graph,
            mode: ParameterMode::default(),
        }
    }

    /// Uses the context's executor and its configured parameter mode.
    pub fn from_context(ctx: &Context) -> Self {
        Self::new(Arc::clone(&ctx.graph)).with_parameter_mode(ctx.config.query.parameter_mode)
    }

    pub fn with_parameter_mode(mut self, mode: ParameterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn parameter_mode(&self) -> ParameterMode {
        self.mode
    }

    /// Selects the node or relationship base from the domain type's markers.
    pub fn repository_base(&self, metadata: &RepositoryMetadata) -> Result<RepositoryBase, AppError> {
        Ok(match EntityKind::classify(metadata.domain_type())? {
            EntityKind::Node => RepositoryBase::Node,
            EntityKind::Relationship => RepositoryBase::Relationship,
        })
    }

    pub fn entity_information(&self, entity_type: EntityType) -> Result<GraphEntityInformation, AppError> {
        GraphEntityInformation::new(entity_type)
    }

    /// Builds the base repository for `T`.
    ///
    /// `T` must be the declared domain type.
    pub fn target_repository<T: GraphEntity>(
        &self,
        metadata: &RepositoryMetadata,
    ) -> Result<TargetRepository<T>, AppError> {
        if *metadata.domain_type() != T::ENTITY_TYPE {
            return Err(AppError::Validation(format!(
                "{} is declared for {}, not {}",
                metadata.repository_interface(),
                metadata.domain_type().name,
                T::ENTITY_TYPE.name
            )));
        }
        let graph = Arc::clone(&self.graph);
        Ok(match self.repository_base(metadata)? {
            RepositoryBase::Node => TargetRepository::Node(NodeGraphRepository::new(graph)?),
            RepositoryBase::Relationship => {
                TargetRepository::Relationship(RelationshipGraphRepository::new(graph)?)
            }
        })
    }

    pub fn query_lookup_strategy(&self) -> GraphQueryLookupStrategy {
        GraphQueryLookupStrategy::new(self.executor.clone(), self.mode)
    }

    /// Assembles a repository: the base for `T` plus one query object per
    /// annotated method.
    pub fn repository<T: GraphEntity>(
        &self,
        metadata: RepositoryMetadata,
    ) -> Result<GraphRepositoryProxy<T>, AppError> {
        let metadata = Arc::new(metadata);
        let target = self.target_repository::<T>(&metadata)?;
        let strategy = self.query_lookup_strategy();

        let mut queries = HashMap::new();
        for method in metadata.methods() {
            if let Some(query) = strategy.resolve_query(method, &metadata)? {
                queries.insert(method.name.clone(), query);
            }
        }

        tracing::debug!(
            repository = metadata.repository_interface(),
            base = ?target.base(),
            queries = queries.len(),
            "assembled repository"
        );
        Ok(GraphRepositoryProxy::new(metadata, target, queries))
    }
}
