//! Shaped results of a repository method call.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::graph::Row;

/// What a repository method returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    /// A single converted object.
    Object(JsonValue),
    /// Raw row mappings, returned for iterable mapping targets.
    Rows(Vec<Row>),
    /// Converted elements, one per row.
    Elements(Vec<JsonValue>),
    /// The method returns nothing.
    Unit,
}

impl QueryResult {
    /// Deserializes a single-object result.
    pub fn into_object<T: DeserializeOwned>(self) -> Result<T, AppError> {
        match self {
            QueryResult::Object(value) => Ok(serde_json::from_value(value)?),
            other => Err(shape_mismatch("a single object", &other)),
        }
    }

    /// Deserializes every element of an iterable result.
    ///
    /// Row results are deserialized from their column mappings.
    pub fn into_vec<T: DeserializeOwned>(self) -> Result<Vec<T>, AppError> {
        match self {
            QueryResult::Elements(values) => values
                .into_iter()
                .map(|value| serde_json::from_value(value).map_err(AppError::from))
                .collect(),
            QueryResult::Rows(rows) => rows
                .into_iter()
                .map(|row| {
                    let value = JsonValue::Object(row.into_inner().into_iter().collect());
                    serde_json::from_value(value).map_err(AppError::from)
                })
                .collect(),
            other => Err(shape_mismatch("an iterable", &other)),
        }
    }

    /// Returns the raw rows of a mapping result.
    pub fn into_rows(self) -> Result<Vec<Row>, AppError> {
        match self {
            QueryResult::Rows(rows) => Ok(rows),
            other => Err(shape_mismatch("row mappings", &other)),
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, QueryResult::Unit)
    }

    fn shape(&self) -> &'static str {
        match self {
            QueryResult::Object(_) => "a single object",
            QueryResult::Rows(_) => "row mappings",
            QueryResult::Elements(_) => "an iterable",
            QueryResult::Unit => "nothing",
        }
    }
}

fn shape_mismatch(expected: &str, actual: &QueryResult) -> AppError {
    AppError::Conversion(format!("expected {}, method returned {}", expected, actual.shape()))
}
