//! The generic CRUD surface shared by node and relationship repositories.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::entity::GraphEntity;
use crate::error::AppError;
use crate::query::is_identifier;

/// CRUD operations over one domain type.
///
/// Ids are the database ids assigned on save.
#[async_trait]
pub trait GraphRepository<T: GraphEntity>: Send + Sync {
    /// Creates the entity when it has no id, otherwise replaces its
    /// properties. Returns the stored state with its id set.
    async fn save(&self, entity: &T) -> Result<T, AppError>;

    async fn save_all(&self, entities: &[T]) -> Result<Vec<T>, AppError> {
        let mut saved = Vec::with_capacity(entities.len());
        for entity in entities {
            saved.push(self.save(entity).await?);
        }
        Ok(saved)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<T>, AppError>;

    async fn exists(&self, id: i64) -> Result<bool, AppError>;

    async fn find_all(&self) -> Result<Vec<T>, AppError>;

    async fn find_all_sorted(&self, sort: &Sort) -> Result<Vec<T>, AppError>;

    async fn find_page(&self, request: &PageRequest) -> Result<Page<T>, AppError>;

    async fn count(&self) -> Result<u64, AppError>;

    /// Deletes a saved entity. Fails with `NotPersisted` if it has no id.
    async fn delete(&self, entity: &T) -> Result<(), AppError>;

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError>;

    async fn delete_all(&self) -> Result<(), AppError>;

    /// The single entity whose property equals the value.
    ///
    /// More than one match is an `IncorrectResultSize` error.
    async fn find_by_property_value(
        &self,
        property: &str,
        value: JsonValue,
    ) -> Result<Option<T>, AppError>;

    async fn find_all_by_property_value(
        &self,
        property: &str,
        value: JsonValue,
    ) -> Result<Vec<T>, AppError>;

    /// Entities whose property lies in `from..=to`.
    async fn find_all_by_range(
        &self,
        property: &str,
        from: JsonValue,
        to: JsonValue,
    ) -> Result<Vec<T>, AppError>;
}

/// Checks that a name is safe to splice into Cypher as a property or label.
pub(crate) fn validate_identifier<'a>(kind: &str, name: &'a str) -> Result<&'a str, AppError> {
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(AppError::Validation(format!("invalid {} name: {:?}", kind, name)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub property: String,
    pub direction: Direction,
}

/// Ordering for `find_all_sorted` and pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Ascending by one property.
    pub fn by(property: impl Into<String>) -> Self {
        Self::unsorted().then(property, Direction::Asc)
    }

    pub fn then(mut self, property: impl Into<String>, direction: Direction) -> Self {
        self.orders.push(Order {
            property: property.into(),
            direction,
        });
        self
    }

    /// Flips the direction of the last order.
    pub fn descending(mut self) -> Self {
        if let Some(order) = self.orders.last_mut() {
            order.direction = Direction::Desc;
        }
        self
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    /// ` ORDER BY n.a ASC, n.b DESC`, or nothing when unsorted.
    pub(crate) fn to_cypher(&self, variable: &str) -> Result<String, AppError> {
        if self.is_unsorted() {
            return Ok(String::new());
        }
        let keys = self
            .orders
            .iter()
            .map(|order| {
                let property = validate_identifier("sort property", &order.property)?;
                Ok(format!("{}.{} {}", variable, property, order.direction.keyword()))
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        Ok(format!(" ORDER BY {}", keys.join(", ")))
    }
}

/// A zero-based page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: Sort,
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: Sort::unsorted(),
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if self.size == 0 {
            return Err(AppError::Validation("page size must be at least 1".into()));
        }
        Ok(())
    }
}

/// One page of results plus the overall count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            0
        } else {
            self.total_elements.div_ceil(self.size)
        }
    }

    pub fn has_next(&self) -> bool {
        self.page.saturating_add(1) < self.total_pages()
    }
}
