//! Application error types.

use thiserror::Error;

/// Errors raised while formatting or binding a query template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("query template references argument {index} but only {supplied} were supplied")]
    MissingArgument { index: usize, supplied: usize },

    #[error("argument {index} is not referenced by any placeholder")]
    UnusedArgument { index: usize },

    #[error("unknown conversion '%{0}' in query template")]
    UnknownConversion(char),

    #[error("dangling '%' at the end of query template")]
    DanglingPercent,

    #[error("argument {index} cannot be formatted with '%{conversion}': {value}")]
    IllegalConversion {
        index: usize,
        conversion: char,
        value: String,
    },

    #[error("argument {index} is not a valid label or type name: {value}")]
    InvalidIdentifier { index: usize, value: String },
}

/// Application-level errors for graphrepo.
#[derive(Error, Debug)]
pub enum AppError {
    // Neo4j errors
    #[cfg(feature = "neo4j")]
    #[error("Neo4j connection error: {0}")]
    Connection(#[from] neo4rs::Error),

    #[error("Graph query error: {message}")]
    Query { message: String, query: String },

    // Configuration of domain types
    #[error("Invalid domain class {0}: neither node nor relationship entity")]
    InvalidDomainClass(String),

    #[error("Invalid domain class {0}: marked as both node and relationship entity")]
    AmbiguousDomainClass(String),

    // Query dispatch
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Incorrect result size: expected {expected}, actual {actual}")]
    IncorrectResultSize { expected: usize, actual: usize },

    #[error("Result conversion failed: {0}")]
    Conversion(String),

    #[error("Entity of type {0} has not been persisted")]
    NotPersisted(String),

    #[error("Repository {repository} has no method {method}")]
    UnknownMethod { repository: String, method: String },

    #[error("Validation error: {0}")]
    Validation(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Conversion(err.to_string())
    }
}
