//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/graphrepo/config.toml` (XDG) or platform config dir
//! 2. Project config: `.graphrepo.toml`
//! 3. Environment variables: `GRAPHREPO_*`
//!
//! # Example
//!
//! ```toml
//! [neo4j]
//! uri = "127.0.0.1:7687"
//! user = "neo4j"
//! password = "secret"
//!
//! [query]
//! parameter_mode = "bind"
//! ```
//!
//! Every key has a default, so an empty configuration is valid.

use std::ops::Deref;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub neo4j: Neo4jConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// Neo4j connection settings, used by the `neo4j` backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jConfig {
    /// Bolt address, e.g. `127.0.0.1:7687`.
    #[serde(default = "default_neo4j_uri")]
    pub uri: String,
    #[serde(default = "default_neo4j_user")]
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: default_neo4j_uri(),
            user: default_neo4j_user(),
            password: None,
        }
    }
}

fn default_neo4j_uri() -> String {
    "127.0.0.1:7687".to_string()
}

fn default_neo4j_user() -> String {
    "neo4j".to_string()
}

/// How annotated query templates receive their arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterMode {
    /// Placeholders become bound `$p<i>` parameters.
    #[default]
    Bind,
    /// Argument text is spliced into the query string.
    Inline,
}

/// Settings for annotated query execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default)]
    pub parameter_mode: ParameterMode,
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment(Self::user_config_path())
            .extract()
            .map_err(ConfigError::from)
    }

    fn figment(user_config: std::path::PathBuf) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(".graphrepo.toml"))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("GRAPHREPO_").split("__"))
    }

    /// User config path: ~/.config/graphrepo/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("graphrepo").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("graphrepo").join("config.toml"))
            .unwrap_or_default()
    }
}
