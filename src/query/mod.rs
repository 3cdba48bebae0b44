//! Annotated query plumbing: arguments, templates, execution and results.

mod executor;
mod parameter;
mod result;
mod template;

pub use executor::{convert_row, ElementType, QueryExecutor};
pub use parameter::{resolve_parameters, Argument};
pub use result::QueryResult;
pub use template::{BoundQuery, QueryTemplate};

pub(crate) use template::is_identifier;
