//! Application context: the database handle plus configuration.

use std::sync::Arc;

use crate::config::Config;
use crate::graph::{CypherExecutor, SharedExecutor};

/// Root context that repository factories are built from.
///
/// Cloning shares the executor and the configuration.
#[derive(Clone)]
pub struct Context {
    /// Database context every query runs against.
    pub graph: SharedExecutor,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl Context {
    /// Creates a new context with the given dependencies.
    pub fn new<E: CypherExecutor + 'static>(graph: E, config: Config) -> Self {
        Self::with_shared(Arc::new(graph), config)
    }

    /// Creates a context around an executor that is already shared.
    pub fn with_shared(graph: SharedExecutor, config: Config) -> Self {
        Self {
            graph,
            config: Arc::new(config),
        }
    }

    /// Connects to the Neo4j server named in the configuration.
    #[cfg(feature = "neo4j")]
    pub async fn connect(config: Config) -> Result<Self, crate::error::AppError> {
        let client = crate::graph::backends::neo4j::Neo4jClient::from_config(&config.neo4j).await?;
        Ok(Self::new(client, config))
    }
}
