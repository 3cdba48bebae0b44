//! Render subcommand - show the formatted and bound forms of a template.

use clap::Parser;
use serde_json::json;

use crate::query::{resolve_parameters, Argument, QueryTemplate};

use super::parse_argument;

/// Format and bind a query template without running it.
#[derive(Parser)]
pub struct RenderCommand {
    /// Query template, e.g. "MATCH (n) WHERE n.name = '%s' RETURN n".
    pub template: String,

    /// Positional arguments. Use node:<id> or rel:<id> for entity handles.
    pub args: Vec<String>,
}

impl RenderCommand {
    /// Run the render command.
    pub fn run(self) -> color_eyre::Result<()> {
        let template = QueryTemplate::parse(&self.template)?;
        let arguments: Vec<Argument> = self.args.iter().map(|raw| parse_argument(raw)).collect();
        let values = resolve_parameters(&arguments)?;
        tracing::debug!(arity = template.arity(), supplied = values.len(), "rendering template");

        let formatted = template.format(&values)?;
        let bound = template.bind(&values)?;
        let output = json!({
            "formatted": formatted,
            "bound": {
                "cypher": bound.cypher,
                "params": bound.params,
            },
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
