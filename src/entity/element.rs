//! Graph element JSON and its mapping onto entity values.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::entity::EntityType;
use crate::error::AppError;

/// A node or relationship as reported by a backend.
///
/// Nodes: `{"id": 1, "label": "Person", "properties": {...}}`.
/// Relationships additionally carry `start_id` and `end_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphElement {
    pub id: i64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub properties: Map<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_id: Option<i64>,
}

impl GraphElement {
    /// Reads an element from a result column.
    ///
    /// Returns `None` for values that are not element objects, such as
    /// scalars or projected property maps.
    pub fn from_value(value: &JsonValue) -> Option<Self> {
        let object = value.as_object()?;
        if !object.get("id").is_some_and(JsonValue::is_i64)
            || !object.get("properties").is_some_and(JsonValue::is_object)
        {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

impl EntityType {
    /// Builds the serialized form of an entity from a stored element.
    ///
    /// The stored properties are taken as they are. The graph id and,
    /// for relationships, the endpoint ids are put back under the
    /// entity's own field names.
    pub fn element_to_value(&self, element: GraphElement) -> Result<JsonValue, AppError> {
        let mut object = element.properties;
        object.insert(self.id_field.to_string(), JsonValue::from(element.id));

        if let Some(field) = self.start_field {
            let start = element.start_id.ok_or_else(|| missing_endpoint(self, "start_id"))?;
            object.insert(field.to_string(), JsonValue::from(start));
        }
        if let Some(field) = self.end_field {
            let end = element.end_id.ok_or_else(|| missing_endpoint(self, "end_id"))?;
            object.insert(field.to_string(), JsonValue::from(end));
        }

        Ok(JsonValue::Object(object))
    }

    /// Deserializes an entity from a stored element.
    pub fn from_element<T: DeserializeOwned>(&self, element: GraphElement) -> Result<T, AppError> {
        let value = self.element_to_value(element)?;
        serde_json::from_value(value)
            .map_err(|e| AppError::Conversion(format!("failed to build {}: {}", self.name, e)))
    }

    /// Serializes an entity into the property map that gets stored.
    ///
    /// The id and endpoint fields are removed, since the graph keeps
    /// them itself.
    pub fn to_properties<T: Serialize>(&self, entity: &T) -> Result<Map<String, JsonValue>, AppError> {
        match serde_json::to_value(entity)? {
            JsonValue::Object(mut object) => {
                for field in self.mapped_fields() {
                    object.remove(field);
                }
                Ok(object)
            }
            other => Err(AppError::Conversion(format!(
                "{} must serialize to an object, got {}",
                self.name, other
            ))),
        }
    }
}

fn missing_endpoint(entity_type: &EntityType, key: &str) -> AppError {
    AppError::Conversion(format!(
        "element for {} has no {}",
        entity_type.name, key
    ))
}
