//! Row and streaming types for query results.

use crate::error::AppError;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::pin::Pin;

/// Parameters for Cypher queries, keyed by name without the `$` prefix.
pub type Params = HashMap<String, JsonValue>;

/// A stream of rows from a query result.
///
/// Uses `futures::Stream` for memory-efficient iteration over large result sets.
/// Rows are fetched on-demand, not loaded all at once.
pub type RowStream<'a> = Pin<Box<dyn Stream<Item = Result<Row, AppError>> + Send + 'a>>;

/// A single row from a query result.
///
/// Contains column values as JSON, with typed extraction via [`Row::get`].
/// Graph elements appear as element objects (see [`crate::entity::GraphElement`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    data: HashMap<String, JsonValue>,
}

impl Row {
    /// Creates a new row from a map of column names to values.
    pub fn new(data: HashMap<String, JsonValue>) -> Self {
        Self { data }
    }

    /// Gets a value from the row by column name, deserializing to the requested type.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not found or if deserialization fails.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let id: String = row.get("id")?;
    /// let count: i64 = row.get("count")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, AppError> {
        self.data
            .get(key)
            .ok_or_else(|| AppError::Conversion(format!("column not found: {}", key)))
            .and_then(|v| {
                serde_json::from_value(v.clone()).map_err(|e| {
                    AppError::Conversion(format!("failed to deserialize '{}': {}", key, e))
                })
            })
    }

    /// Gets a value from the row, returning `None` if the key doesn't exist.
    ///
    /// Still returns an error if the key exists but deserialization fails.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.data.get(key) {
            Some(v) if v.is_null() => Ok(None),
            Some(v) => serde_json::from_value(v.clone())
                .map(Some)
                .map_err(|e| AppError::Conversion(format!("failed to deserialize '{}': {}", key, e))),
            None => Ok(None),
        }
    }

    /// Returns the raw JSON value for a column, if it exists.
    pub fn get_raw(&self, key: &str) -> Option<&JsonValue> {
        self.data.get(key)
    }

    /// Returns the value of a row that has exactly one column.
    ///
    /// Typed query results are built from single-column rows such as
    /// `RETURN n` or `RETURN n.name`.
    pub fn single_value(&self) -> Result<&JsonValue, AppError> {
        let mut values = self.data.values();
        match (values.next(), values.next()) {
            (Some(value), None) => Ok(value),
            _ => Err(AppError::Conversion(format!(
                "expected a single column, found {}",
                self.data.len()
            ))),
        }
    }

    /// Returns all column names in this row.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|s| s.as_str())
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the row and returns the underlying data map.
    pub fn into_inner(self) -> HashMap<String, JsonValue> {
        self.data
    }
}

impl From<HashMap<String, JsonValue>> for Row {
    fn from(data: HashMap<String, JsonValue>) -> Self {
        Self::new(data)
    }
}
