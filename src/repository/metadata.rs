//! Repository declarations: the domain type and the declared methods.

use crate::entity::{EntityType, GraphEntity};
use crate::query::ElementType;

/// Statically declared return type of a repository method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnType {
    /// True for collection returns such as `Vec<T>`.
    pub iterable: bool,
    /// The element each result row converts to.
    pub element: ElementType,
}

impl ReturnType {
    pub const fn single(element: ElementType) -> Self {
        Self {
            iterable: false,
            element,
        }
    }

    pub const fn iterable(element: ElementType) -> Self {
        Self {
            iterable: true,
            element,
        }
    }

    /// A single entity, e.g. `Person`.
    pub fn entity<T: GraphEntity>() -> Self {
        Self::single(ElementType::entity::<T>())
    }

    /// A collection of entities, e.g. `Vec<Person>`.
    pub fn entities<T: GraphEntity>() -> Self {
        Self::iterable(ElementType::entity::<T>())
    }

    /// A collection of raw row maps, e.g. `Vec<Map<String, Value>>`.
    pub const fn mappings() -> Self {
        Self::iterable(ElementType::Mapping)
    }

    /// A single plain value such as a count or a name.
    pub const fn value(name: &'static str) -> Self {
        Self::single(ElementType::Value(name))
    }

    /// A collection of plain values.
    pub const fn values(name: &'static str) -> Self {
        Self::iterable(ElementType::Value(name))
    }
}

/// A query annotation on a repository method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQuery {
    /// The query template.
    pub value: String,
    /// Overrides the element type taken from the return type.
    pub element_type: Option<ElementType>,
}

impl GraphQuery {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            element_type: None,
        }
    }

    pub fn element_type(mut self, element_type: ElementType) -> Self {
        self.element_type = Some(element_type);
        self
    }
}

/// One declared repository method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMethod {
    pub name: String,
    pub return_type: ReturnType,
    pub query: Option<GraphQuery>,
}

impl QueryMethod {
    /// A method without a query annotation, served by the base repository.
    pub fn new(name: impl Into<String>, return_type: ReturnType) -> Self {
        Self {
            name: name.into(),
            return_type,
            query: None,
        }
    }

    pub fn with_query(mut self, query: GraphQuery) -> Self {
        self.query = Some(query);
        self
    }

    pub fn is_annotated(&self) -> bool {
        self.query.is_some()
    }
}

/// A user-declared repository and its domain type.
///
/// ```ignore
/// let metadata = RepositoryMetadata::for_entity::<Person>("PersonRepository")
///     .query(
///         "find_by_name",
///         ReturnType::entity::<Person>(),
///         "MATCH (n:Person) WHERE n.name = '%s' RETURN n",
///     )
///     .method(QueryMethod::new("find_all", ReturnType::entities::<Person>()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMetadata {
    repository_interface: String,
    domain_type: EntityType,
    methods: Vec<QueryMethod>,
}

impl RepositoryMetadata {
    pub fn new(repository_interface: impl Into<String>, domain_type: EntityType) -> Self {
        Self {
            repository_interface: repository_interface.into(),
            domain_type,
            methods: Vec::new(),
        }
    }

    pub fn for_entity<T: GraphEntity>(repository_interface: impl Into<String>) -> Self {
        Self::new(repository_interface, T::ENTITY_TYPE)
    }

    /// Declares a method.
    pub fn method(mut self, method: QueryMethod) -> Self {
        self.methods.push(method);
        self
    }

    /// Declares a method backed by a query template.
    pub fn query(self, name: impl Into<String>, return_type: ReturnType, template: &str) -> Self {
        self.method(QueryMethod::new(name, return_type).with_query(GraphQuery::new(template)))
    }

    pub fn repository_interface(&self) -> &str {
        &self.repository_interface
    }

    pub fn domain_type(&self) -> &EntityType {
        &self.domain_type
    }

    pub fn methods(&self) -> &[QueryMethod] {
        &self.methods
    }

    pub fn find_method(&self, name: &str) -> Option<&QueryMethod> {
        self.methods.iter().find(|method| method.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSON: EntityType = EntityType::node("Person", "Person", "id");

    #[test]
    fn test_builder_keeps_declaration_order() {
        let metadata = RepositoryMetadata::new("PersonRepository", PERSON)
            .query("by_name", ReturnType::single(ElementType::Entity(PERSON)), "MATCH (n) RETURN n")
            .method(QueryMethod::new("find_all", ReturnType::iterable(ElementType::Entity(PERSON))));

        let names: Vec<_> = metadata.methods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["by_name", "find_all"]);
        assert!(metadata.find_method("by_name").unwrap().is_annotated());
        assert!(!metadata.find_method("find_all").unwrap().is_annotated());
        assert!(metadata.find_method("missing").is_none());
    }

    #[test]
    fn test_return_type_shapes() {
        assert!(ReturnType::mappings().iterable);
        assert!(ReturnType::mappings().element.is_mapping());
        assert!(!ReturnType::value("i64").iterable);
        assert_eq!(ReturnType::values("String").element, ElementType::Value("String"));
    }

    #[test]
    fn test_explicit_element_type() {
        let query = GraphQuery::new("MATCH (n) RETURN n").element_type(ElementType::Mapping);
        assert_eq!(query.element_type, Some(ElementType::Mapping));
    }
}
