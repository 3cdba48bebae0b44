//! Domain type metadata and the node/relationship markers.
//!
//! A domain type becomes storable by deriving one of the two markers:
//!
//! ```ignore
//! use graphrepo::{NodeEntity, RelationshipEntity};
//!
//! #[derive(Serialize, Deserialize, NodeEntity)]
//! #[graph(label = "Person")]
//! struct Person {
//!     #[graph(id)]
//!     id: Option<i64>,
//!     name: String,
//! }
//!
//! #[derive(Serialize, Deserialize, RelationshipEntity)]
//! #[graph(type = "KNOWS")]
//! struct Knows {
//!     #[graph(id)]
//!     id: Option<i64>,
//!     #[graph(start)]
//!     from: i64,
//!     #[graph(end)]
//!     to: i64,
//! }
//! ```
//!
//! The derive emits an [`EntityType`] constant. [`EntityKind`] is resolved from
//! it once, when [`GraphEntityInformation`] is built.

mod element;
mod information;

pub use element::GraphElement;
pub use information::GraphEntityInformation;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppError;

/// Whether a domain type is stored as a vertex or an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Node,
    Relationship,
}

impl EntityKind {
    /// Classifies a domain type by its markers.
    ///
    /// Exactly one marker must be present.
    pub fn classify(entity_type: &EntityType) -> Result<Self, AppError> {
        match (entity_type.markers.node, entity_type.markers.relationship) {
            (true, false) => Ok(EntityKind::Node),
            (false, true) => Ok(EntityKind::Relationship),
            (false, false) => Err(AppError::InvalidDomainClass(entity_type.name.to_string())),
            (true, true) => Err(AppError::AmbiguousDomainClass(entity_type.name.to_string())),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Node => write!(f, "node"),
            EntityKind::Relationship => write!(f, "relationship"),
        }
    }
}

/// Type-level markers declared on a domain type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EntityMarkers {
    pub node: bool,
    pub relationship: bool,
}

impl EntityMarkers {
    pub const NONE: Self = Self {
        node: false,
        relationship: false,
    };
    pub const NODE: Self = Self {
        node: true,
        relationship: false,
    };
    pub const RELATIONSHIP: Self = Self {
        node: false,
        relationship: true,
    };
}

/// Static metadata describing how a domain type maps onto the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityType {
    /// Rust type name, used in error messages.
    pub name: &'static str,
    /// Node label or relationship type.
    pub label: &'static str,
    pub markers: EntityMarkers,
    /// Field holding the graph id (`Option<i64>`).
    pub id_field: &'static str,
    /// Relationship field holding the start node id.
    pub start_field: Option<&'static str>,
    /// Relationship field holding the end node id.
    pub end_field: Option<&'static str>,
}

impl EntityType {
    /// Metadata for a node-backed type.
    pub const fn node(name: &'static str, label: &'static str, id_field: &'static str) -> Self {
        Self {
            name,
            label,
            markers: EntityMarkers::NODE,
            id_field,
            start_field: None,
            end_field: None,
        }
    }

    /// Metadata for a relationship-backed type.
    pub const fn relationship(
        name: &'static str,
        label: &'static str,
        id_field: &'static str,
        start_field: &'static str,
        end_field: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            markers: EntityMarkers::RELATIONSHIP,
            id_field,
            start_field: Some(start_field),
            end_field: Some(end_field),
        }
    }

    /// Metadata with explicit markers, for types that implement
    /// [`GraphEntity`] by hand.
    pub const fn with_markers(
        name: &'static str,
        label: &'static str,
        id_field: &'static str,
        markers: EntityMarkers,
    ) -> Self {
        Self {
            name,
            label,
            markers,
            id_field,
            start_field: None,
            end_field: None,
        }
    }

    pub fn kind(&self) -> Result<EntityKind, AppError> {
        EntityKind::classify(self)
    }

    /// Field names that live outside the stored property map.
    pub(crate) fn mapped_fields(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.id_field)
            .chain(self.start_field)
            .chain(self.end_field)
    }
}

/// A domain type that can be stored in the graph.
///
/// Implemented by `#[derive(NodeEntity)]` and `#[derive(RelationshipEntity)]`.
pub trait GraphEntity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const ENTITY_TYPE: EntityType;

    /// The graph id, or `None` if the entity has not been saved.
    fn graph_id(&self) -> Option<i64>;

    /// Start and end node ids of a relationship entity.
    fn endpoints(&self) -> Option<(i64, i64)> {
        None
    }
}

/// Something that identifies a graph vertex.
pub trait NodeBacked {
    fn node_id(&self) -> Option<i64>;
}

/// Something that identifies a graph edge.
pub trait RelationshipBacked {
    fn relationship_id(&self) -> Option<i64>;
}

/// A bare handle to an existing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(pub i64);

impl NodeBacked for NodeRef {
    fn node_id(&self) -> Option<i64> {
        Some(self.0)
    }
}

/// A bare handle to an existing relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationshipRef(pub i64);

impl RelationshipBacked for RelationshipRef {
    fn relationship_id(&self) -> Option<i64> {
        Some(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_node() {
        let ty = EntityType::node("Person", "Person", "id");
        assert_eq!(EntityKind::classify(&ty).unwrap(), EntityKind::Node);
    }

    #[test]
    fn test_classify_relationship() {
        let ty = EntityType::relationship("Knows", "KNOWS", "id", "from", "to");
        assert_eq!(ty.kind().unwrap(), EntityKind::Relationship);
    }

    #[test]
    fn test_classify_unmarked_fails() {
        let ty = EntityType::with_markers("Plain", "Plain", "id", EntityMarkers::NONE);
        let err = ty.kind().unwrap_err();
        assert!(matches!(err, AppError::InvalidDomainClass(name) if name == "Plain"));
    }

    #[test]
    fn test_classify_both_markers_fails() {
        let markers = EntityMarkers {
            node: true,
            relationship: true,
        };
        let ty = EntityType::with_markers("Both", "Both", "id", markers);
        assert!(matches!(ty.kind(), Err(AppError::AmbiguousDomainClass(_))));
    }

    #[test]
    fn test_mapped_fields() {
        let node = EntityType::node("Person", "Person", "id");
        assert_eq!(node.mapped_fields().collect::<Vec<_>>(), vec!["id"]);

        let rel = EntityType::relationship("Knows", "KNOWS", "id", "from", "to");
        assert_eq!(rel.mapped_fields().collect::<Vec<_>>(), vec!["id", "from", "to"]);
    }

    #[test]
    fn test_handles_expose_ids() {
        assert_eq!(NodeRef(42).node_id(), Some(42));
        assert_eq!(RelationshipRef(7).relationship_id(), Some(7));
    }
}
