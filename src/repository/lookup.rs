//! Per-method query objects and the strategy that resolves them.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ParameterMode;
use crate::error::AppError;
use crate::query::{
    resolve_parameters, Argument, BoundQuery, ElementType, QueryExecutor, QueryResult, QueryTemplate,
};
use crate::repository::metadata::{QueryMethod, RepositoryMetadata};

/// Whether a method yields one result or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Single,
    Iterable,
}

/// A declared method together with the repository it belongs to.
#[derive(Debug, Clone)]
pub struct GraphQueryMethod {
    method: QueryMethod,
    metadata: Arc<RepositoryMetadata>,
}

impl GraphQueryMethod {
    pub fn new(method: QueryMethod, metadata: Arc<RepositoryMetadata>) -> Self {
        Self { method, metadata }
    }

    pub fn method(&self) -> &QueryMethod {
        &self.method
    }

    pub fn metadata(&self) -> &RepositoryMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.method.name
    }
}

/// A query object backing one repository method.
#[async_trait]
pub trait RepositoryQuery: Send + Sync {
    /// Runs the query with the caller's positional arguments.
    async fn execute(&self, arguments: &[Argument]) -> Result<QueryResult, AppError>;

    /// The method this query was built for.
    fn query_method(&self) -> &GraphQueryMethod;
}

/// A query built from a method's query annotation.
///
/// Everything except the arguments is resolved at construction: the parsed
/// template, the target element type and the result shape.
#[derive(Clone)]
pub struct AnnotatedQuery {
    method: GraphQueryMethod,
    template: QueryTemplate,
    target: ElementType,
    shape: ResultShape,
    mode: ParameterMode,
    executor: QueryExecutor,
}

impl AnnotatedQuery {
    /// Builds the query object for an annotated method.
    ///
    /// Fails when the method carries no annotation or its template does
    /// not parse.
    pub fn new(
        method: GraphQueryMethod,
        executor: QueryExecutor,
        mode: ParameterMode,
    ) -> Result<Self, AppError> {
        let declared = method.method();
        let annotation = declared.query.as_ref().ok_or_else(|| {
            AppError::Internal(format!("method {} has no query annotation", declared.name))
        })?;

        let template = QueryTemplate::parse(&annotation.value)?;
        let target = annotation
            .element_type
            .unwrap_or(declared.return_type.element);
        let shape = if declared.return_type.iterable {
            ResultShape::Iterable
        } else {
            ResultShape::Single
        };

        Ok(Self {
            method,
            template,
            target,
            shape,
            mode,
            executor,
        })
    }

    pub fn template(&self) -> &QueryTemplate {
        &self.template
    }

    pub fn target(&self) -> &ElementType {
        &self.target
    }

    pub fn shape(&self) -> ResultShape {
        self.shape
    }

    /// Resolves the arguments and renders the query text.
    pub fn prepare(&self, arguments: &[Argument]) -> Result<BoundQuery, AppError> {
        let values = resolve_parameters(arguments)?;
        Ok(self.template.render(self.mode, &values)?)
    }
}

#[async_trait]
impl RepositoryQuery for AnnotatedQuery {
    async fn execute(&self, arguments: &[Argument]) -> Result<QueryResult, AppError> {
        let BoundQuery { cypher, params } = self.prepare(arguments)?;
        tracing::debug!(
            method = self.method.name(),
            cypher = %cypher,
            params = params.len(),
            target = self.target.name(),
            "dispatching annotated query"
        );

        match self.shape {
            ResultShape::Single => self
                .executor
                .query_for_object(&cypher, params, &self.target)
                .await
                .map(QueryResult::Object),
            ResultShape::Iterable if self.target.is_mapping() => {
                self.executor.query(&cypher, params).await.map(QueryResult::Rows)
            }
            ResultShape::Iterable => self
                .executor
                .query_typed(&cypher, params, &self.target)
                .await
                .map(QueryResult::Elements),
        }
    }

    fn query_method(&self) -> &GraphQueryMethod {
        &self.method
    }
}

/// Decides, per declared method, whether a query object backs it.
#[derive(Clone)]
pub struct GraphQueryLookupStrategy {
    executor: QueryExecutor,
    mode: ParameterMode,
}

impl GraphQueryLookupStrategy {
    pub fn new(executor: QueryExecutor, mode: ParameterMode) -> Self {
        Self { executor, mode }
    }

    /// Returns the query object for an annotated method, or `None` when the
    /// method is left to the base repository.
    pub fn resolve_query(
        &self,
        method: &QueryMethod,
        metadata: &Arc<RepositoryMetadata>,
    ) -> Result<Option<AnnotatedQuery>, AppError> {
        if !method.is_annotated() {
            return Ok(None);
        }
        let method = GraphQueryMethod::new(method.clone(), Arc::clone(metadata));
        AnnotatedQuery::new(method, self.executor.clone(), self.mode).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::{json, Value as JsonValue};

    use crate::entity::{EntityType, NodeRef};
    use crate::error::TemplateError;
    use crate::graph::{CypherExecutor, Params, Row, RowStream};
    use crate::repository::metadata::{GraphQuery, ReturnType};

    const PERSON: EntityType = EntityType::node("Person", "Person", "id");

    /// Records every query and answers with fixed rows.
    struct Recorder {
        rows: Vec<Row>,
        seen: Mutex<Vec<(String, Params)>>,
    }

    impl Recorder {
        fn new(rows: Vec<Row>) -> Arc<Self> {
            Arc::new(Self {
                rows,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last(&self) -> (String, Params) {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl CypherExecutor for Recorder {
        async fn execute_cypher(
            &self,
            cypher: &str,
            params: Params,
        ) -> Result<RowStream<'_>, AppError> {
            self.seen.lock().unwrap().push((cypher.to_string(), params));
            let rows: Vec<Result<Row, AppError>> = self.rows.iter().cloned().map(Ok).collect();
            Ok(Box::pin(futures::stream::iter(rows)))
        }

        async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
            self.seen.lock().unwrap().push((cypher.to_string(), params));
            Ok(())
        }
    }

    fn row(column: &str, value: JsonValue) -> Row {
        let mut data = HashMap::new();
        data.insert(column.to_string(), value);
        Row::new(data)
    }

    fn person_element(id: i64, name: &str) -> JsonValue {
        json!({"id": id, "label": "Person", "properties": {"name": name}})
    }

    fn method(return_type: ReturnType, template: &str) -> GraphQueryMethod {
        let metadata = Arc::new(RepositoryMetadata::new("PersonRepository", PERSON));
        let method = QueryMethod::new("custom", return_type).with_query(GraphQuery::new(template));
        GraphQueryMethod::new(method, metadata)
    }

    fn annotated(
        graph: Arc<Recorder>,
        return_type: ReturnType,
        template: &str,
        mode: ParameterMode,
    ) -> AnnotatedQuery {
        AnnotatedQuery::new(method(return_type, template), QueryExecutor::new(graph), mode).unwrap()
    }

    #[test]
    fn test_lookup_declines_plain_method() {
        let strategy = GraphQueryLookupStrategy::new(
            QueryExecutor::new(Recorder::new(vec![])),
            ParameterMode::Bind,
        );
        let metadata = Arc::new(RepositoryMetadata::new("PersonRepository", PERSON));
        let plain = QueryMethod::new("find_all", ReturnType::iterable(ElementType::Entity(PERSON)));
        assert!(strategy.resolve_query(&plain, &metadata).unwrap().is_none());
    }

    #[test]
    fn test_lookup_binds_annotated_method() {
        let strategy = GraphQueryLookupStrategy::new(
            QueryExecutor::new(Recorder::new(vec![])),
            ParameterMode::Bind,
        );
        let metadata = Arc::new(RepositoryMetadata::new("PersonRepository", PERSON));
        let annotated = QueryMethod::new("by_name", ReturnType::single(ElementType::Entity(PERSON)))
            .with_query(GraphQuery::new("MATCH (n) WHERE n.name = '%s' RETURN n"));

        let query = strategy.resolve_query(&annotated, &metadata).unwrap().unwrap();
        assert_eq!(query.query_method().name(), "by_name");
        assert_eq!(query.query_method().metadata().repository_interface(), "PersonRepository");
        assert_eq!(query.shape(), ResultShape::Single);
    }

    #[test]
    fn test_malformed_template_fails_construction() {
        let result = AnnotatedQuery::new(
            method(ReturnType::value("i64"), "RETURN 100%"),
            QueryExecutor::new(Recorder::new(vec![])),
            ParameterMode::Bind,
        );
        assert!(matches!(
            result,
            Err(AppError::Template(TemplateError::DanglingPercent))
        ));
    }

    #[test]
    fn test_explicit_element_type_wins() {
        let metadata = Arc::new(RepositoryMetadata::new("PersonRepository", PERSON));
        let declared = QueryMethod::new("rows", ReturnType::iterable(ElementType::Entity(PERSON)))
            .with_query(GraphQuery::new("MATCH (n) RETURN n").element_type(ElementType::Mapping));
        let query = AnnotatedQuery::new(
            GraphQueryMethod::new(declared, metadata),
            QueryExecutor::new(Recorder::new(vec![])),
            ParameterMode::Bind,
        )
        .unwrap();
        assert!(query.target().is_mapping());
    }

    #[test]
    fn test_inline_mode_formats_spliced_text() {
        let query = annotated(
            Recorder::new(vec![]),
            ReturnType::single(ElementType::Entity(PERSON)),
            "MATCH (n) WHERE n.name = '%s' RETURN n",
            ParameterMode::Inline,
        );
        let bound = query.prepare(&crate::args!["Alice"]).unwrap();
        assert_eq!(bound.cypher, "MATCH (n) WHERE n.name = 'Alice' RETURN n");
        assert!(bound.params.is_empty());
    }

    #[tokio::test]
    async fn test_single_result_binds_node_id() {
        let graph = Recorder::new(vec![row("n", person_element(42, "Alice"))]);
        let query = annotated(
            Arc::clone(&graph),
            ReturnType::single(ElementType::Entity(PERSON)),
            "MATCH (n) WHERE id(n) = %d RETURN n",
            ParameterMode::Bind,
        );

        let result = query.execute(&crate::args![NodeRef(42)]).await.unwrap();
        assert_eq!(result, QueryResult::Object(json!({"id": 42, "name": "Alice"})));

        let (cypher, params) = graph.last();
        assert_eq!(cypher, "MATCH (n) WHERE id(n) = $p0 RETURN n");
        assert_eq!(params.get("p0"), Some(&json!(42)));
    }

    #[tokio::test]
    async fn test_single_result_propagates_size_mismatch() {
        let graph = Recorder::new(vec![
            row("n", person_element(1, "Alice")),
            row("n", person_element(2, "Alice")),
        ]);
        let query = annotated(
            graph,
            ReturnType::single(ElementType::Entity(PERSON)),
            "MATCH (n) WHERE n.name = '%s' RETURN n",
            ParameterMode::Bind,
        );
        let err = query.execute(&crate::args!["Alice"]).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::IncorrectResultSize {
                expected: 1,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_iterable_mapping_returns_raw_rows() {
        let mut data = HashMap::new();
        data.insert("name".to_string(), json!("Alice"));
        data.insert("age".to_string(), json!(30));
        let graph = Recorder::new(vec![Row::new(data.clone())]);
        let query = annotated(
            graph,
            ReturnType::mappings(),
            "MATCH (n) RETURN n.name AS name, n.age AS age",
            ParameterMode::Bind,
        );

        let result = query.execute(&[]).await.unwrap();
        assert_eq!(result, QueryResult::Rows(vec![Row::new(data)]));
    }

    #[tokio::test]
    async fn test_iterable_typed_converts_each_row() {
        let graph = Recorder::new(vec![
            row("n", person_element(1, "Alice")),
            row("n", person_element(2, "Bob")),
        ]);
        let query = annotated(
            graph,
            ReturnType::iterable(ElementType::Entity(PERSON)),
            "MATCH (n:Person) RETURN n",
            ParameterMode::Bind,
        );

        let result = query.execute(&[]).await.unwrap();
        assert_eq!(
            result,
            QueryResult::Elements(vec![
                json!({"id": 1, "name": "Alice"}),
                json!({"id": 2, "name": "Bob"}),
            ])
        );
    }

    #[tokio::test]
    async fn test_argument_count_mismatch_is_reported() {
        let graph = Recorder::new(vec![]);
        let query = annotated(
            Arc::clone(&graph),
            ReturnType::values("String"),
            "MATCH (n) WHERE n.name = '%s' RETURN n.name",
            ParameterMode::Bind,
        );
        let err = query.execute(&[]).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Template(TemplateError::MissingArgument { .. })
        ));
        assert!(graph.seen.lock().unwrap().is_empty());
    }
}
