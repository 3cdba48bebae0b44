//! Identity and classification of a domain type.

use crate::entity::{EntityKind, EntityType, GraphEntity};
use crate::error::AppError;

/// Entity information handed out by the repository factory.
///
/// The kind is classified on construction and kept. Building one is cheap
/// and holds no connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEntityInformation {
    entity_type: EntityType,
    kind: EntityKind,
}

impl GraphEntityInformation {
    /// Classifies the given type.
    ///
    /// Fails when the type carries neither marker, or both.
    pub fn new(entity_type: EntityType) -> Result<Self, AppError> {
        let kind = EntityKind::classify(&entity_type)?;
        Ok(Self { entity_type, kind })
    }

    /// Information for a statically known entity type.
    pub fn of<T: GraphEntity>() -> Result<Self, AppError> {
        Self::new(T::ENTITY_TYPE)
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn is_node_entity(&self) -> bool {
        self.kind == EntityKind::Node
    }

    pub fn is_relationship_entity(&self) -> bool {
        self.kind == EntityKind::Relationship
    }

    pub fn type_name(&self) -> &'static str {
        self.entity_type.name
    }

    pub fn label(&self) -> &'static str {
        self.entity_type.label
    }

    /// The graph id of an entity, if it has been saved.
    pub fn id<T: GraphEntity>(&self, entity: &T) -> Option<i64> {
        entity.graph_id()
    }

    /// True when the entity has not been saved yet.
    pub fn is_new<T: GraphEntity>(&self, entity: &T) -> bool {
        entity.graph_id().is_none()
    }
}
