//! Query subcommand - run a template against Neo4j.

use clap::Parser;
use color_eyre::Result;

/// Run a query template against the configured Neo4j server.
#[derive(Parser)]
pub struct QueryCommand {
    /// Query template.
    pub template: String,

    /// Positional arguments. Use node:<id> or rel:<id> for entity handles.
    pub args: Vec<String>,

    /// Expect exactly one row.
    #[arg(long)]
    pub single: bool,

    /// Splice arguments into the query text instead of binding them.
    #[arg(long)]
    pub inline: bool,
}

impl QueryCommand {
    /// Run the query command.
    #[cfg(feature = "neo4j")]
    pub async fn run(self) -> Result<()> {
        use crate::config::{Config, ParameterMode};
        use crate::context::Context;
        use crate::query::{resolve_parameters, Argument, ElementType, QueryExecutor, QueryTemplate};

        let config = Config::load()?;
        let mode = if self.inline {
            ParameterMode::Inline
        } else {
            config.query.parameter_mode
        };

        tracing::info!("Connecting to Neo4j at {}", config.neo4j.uri);
        let ctx = Context::connect(config).await?;
        tracing::info!("Connected to Neo4j");

        let template = QueryTemplate::parse(&self.template)?;
        let arguments: Vec<Argument> = self.args.iter().map(|raw| super::parse_argument(raw)).collect();
        let bound = template.render(mode, &resolve_parameters(&arguments)?)?;
        let executor = QueryExecutor::new(ctx.graph.clone());

        if self.single {
            let value = executor
                .query_for_object(&bound.cypher, bound.params, &ElementType::Mapping)
                .await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            let rows = executor.query(&bound.cypher, bound.params).await?;
            tracing::info!("Query returned {} rows", rows.len());
            for row in rows {
                println!("{}", serde_json::to_string(&row)?);
            }
        }
        Ok(())
    }

    /// Run the query command.
    #[cfg(not(feature = "neo4j"))]
    pub async fn run(self) -> Result<()> {
        Err(color_eyre::eyre::eyre!(
            "graphrepo was built without a database backend; rebuild with --features neo4j"
        ))
    }
}
