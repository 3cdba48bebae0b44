//! CLI module for graphrepo.
//!
//! Subcommands:
//! - `render`: Show how a query template formats and binds
//! - `query`: Run a query template against Neo4j (requires the `neo4j` feature)

mod query;
mod render;

use clap::{Parser, Subcommand};

use crate::entity::{NodeRef, RelationshipRef};
use crate::query::Argument;

pub use query::QueryCommand;
pub use render::RenderCommand;

/// graphrepo - annotation-driven repositories over a Cypher graph database
#[derive(Parser)]
#[command(name = "graphrepo")]
#[command(about = "Annotation-driven repositories over a Cypher graph database")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Format and bind a query template without running it
    Render(RenderCommand),

    /// Run a query template against the configured Neo4j server
    Query(QueryCommand),
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Render(cmd) => cmd.run(),
            Command::Query(cmd) => cmd.run().await,
        }
    }
}

/// Parses one positional template argument.
///
/// `node:<id>` and `rel:<id>` pass entity handles. Anything else is read as
/// JSON, falling back to a plain string.
pub(crate) fn parse_argument(raw: &str) -> Argument {
    if let Some(id) = raw.strip_prefix("node:").and_then(|id| id.parse().ok()) {
        return Argument::from(NodeRef(id));
    }
    if let Some(id) = raw.strip_prefix("rel:").and_then(|id| id.parse().ok()) {
        return Argument::from(RelationshipRef(id));
    }
    match serde_json::from_str(raw) {
        Ok(value) => Argument::Value(value),
        Err(_) => Argument::from(raw),
    }
}
