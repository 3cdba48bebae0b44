//! Call arguments and their resolution to query values.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::entity::{NodeBacked, NodeRef, RelationshipBacked, RelationshipRef};
use crate::error::AppError;

/// One positional argument of a repository method call.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// A plain value, passed through unchanged.
    Value(JsonValue),
    /// A node handle, replaced by its id.
    Node {
        id: Option<i64>,
        type_name: &'static str,
    },
    /// A relationship handle, replaced by its id.
    Relationship {
        id: Option<i64>,
        type_name: &'static str,
    },
}

impl Argument {
    /// Wraps any serializable value.
    pub fn value<T: Serialize>(value: T) -> Result<Self, AppError> {
        Ok(Argument::Value(serde_json::to_value(value)?))
    }

    /// Passes a node-backed entity or handle by identity.
    pub fn node<N: NodeBacked>(node: &N) -> Self {
        Argument::Node {
            id: node.node_id(),
            type_name: std::any::type_name::<N>(),
        }
    }

    /// Passes a relationship-backed entity or handle by identity.
    pub fn relationship<R: RelationshipBacked>(relationship: &R) -> Self {
        Argument::Relationship {
            id: relationship.relationship_id(),
            type_name: std::any::type_name::<R>(),
        }
    }

    /// The value substituted into the query.
    ///
    /// Handles resolve to their integer id. A handle without an id belongs
    /// to an entity that was never saved.
    pub fn resolve(&self) -> Result<JsonValue, AppError> {
        match self {
            Argument::Value(value) => Ok(value.clone()),
            Argument::Node { id, type_name } | Argument::Relationship { id, type_name } => id
                .map(JsonValue::from)
                .ok_or_else(|| AppError::NotPersisted(type_name.to_string())),
        }
    }
}

/// Resolves each argument in order, keeping positions.
pub fn resolve_parameters(arguments: &[Argument]) -> Result<Vec<JsonValue>, AppError> {
    arguments.iter().map(Argument::resolve).collect()
}

impl From<JsonValue> for Argument {
    fn from(value: JsonValue) -> Self {
        Argument::Value(value)
    }
}

impl From<NodeRef> for Argument {
    fn from(node: NodeRef) -> Self {
        Argument::node(&node)
    }
}

impl From<RelationshipRef> for Argument {
    fn from(relationship: RelationshipRef) -> Self {
        Argument::relationship(&relationship)
    }
}

macro_rules! value_arguments {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Argument {
                fn from(value: $ty) -> Self {
                    Argument::Value(JsonValue::from(value))
                }
            }
        )*
    };
}

value_arguments!(&str, String, bool, i32, i64, u32, u64, f64);

/// Builds a `Vec<Argument>` from values convertible into [`Argument`].
///
/// ```ignore
/// let args = graphrepo::args!["Alice", 30, Argument::node(&friend)];
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::query::Argument::from($arg)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Person {
        id: Option<i64>,
    }

    impl NodeBacked for Person {
        fn node_id(&self) -> Option<i64> {
            self.id
        }
    }

    #[test]
    fn test_node_handle_resolves_to_id() {
        let resolved = Argument::from(NodeRef(42)).resolve().unwrap();
        assert_eq!(resolved, json!(42));
    }

    #[test]
    fn test_relationship_handle_resolves_to_id() {
        let resolved = Argument::from(RelationshipRef(7)).resolve().unwrap();
        assert_eq!(resolved, json!(7));
    }

    #[test]
    fn test_plain_values_pass_through() {
        let resolved = resolve_parameters(&crate::args!["Alice", 30, true]).unwrap();
        assert_eq!(resolved, vec![json!("Alice"), json!(30), json!(true)]);
    }

    #[test]
    fn test_mixed_arguments_keep_positions() {
        let person = Person { id: Some(5) };
        let args = crate::args!["knows", Argument::node(&person), 2];
        let resolved = resolve_parameters(&args).unwrap();
        assert_eq!(resolved, vec![json!("knows"), json!(5), json!(2)]);
    }

    #[test]
    fn test_unsaved_entity_is_rejected() {
        let person = Person { id: None };
        let err = Argument::node(&person).resolve().unwrap_err();
        assert!(matches!(err, AppError::NotPersisted(name) if name.ends_with("Person")));
    }

    #[test]
    fn test_value_from_serializable() {
        #[derive(Serialize)]
        struct Range {
            from: i32,
            to: i32,
        }
        let arg = Argument::value(Range { from: 1, to: 3 }).unwrap();
        assert_eq!(arg.resolve().unwrap(), json!({"from": 1, "to": 3}));
    }
}
