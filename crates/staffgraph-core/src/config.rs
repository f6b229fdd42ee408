//! Configuration management for staffgraph services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (STAFFGRAPH__ prefix, `__` separator)
//! 2. Config file (staffgraph.toml)
//! 3. Defaults

use serde::Deserialize;

use crate::error::CoreError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

/// Connection settings for the Neo4j pool.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    /// Upper bound on pooled Bolt connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Rows pulled per round-trip when streaming results.
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,

    /// Per-statement timeout in seconds.
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_secs: u64,
}

/// How the tool server is exposed.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// MCP over stdin/stdout.
    Stdio,
    /// MCP streamable HTTP under `/mcp`.
    #[default]
    Http,
}

impl std::str::FromStr for Transport {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            _ => Err(CoreError::Config(format!(
                "Invalid transport: {s}. Choose: stdio, http"
            ))),
        }
    }
}

/// Tool server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default)]
    pub transport: Transport,

    /// Listen address for the HTTP transport.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Load the fixed demo departments and employees at startup.
    #[serde(default)]
    pub seed_demo: bool,

    /// Keep per-client MCP sessions on the HTTP transport.
    #[serde(default = "default_true")]
    pub stateful_http: bool,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "neo4j".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_statement_timeout() -> u64 {
    30
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
            statement_timeout_secs: default_statement_timeout(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            bind: default_bind(),
            seed_demo: false,
            stateful_http: default_true(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `<file_prefix>.toml` (optional) and
    /// `STAFFGRAPH__*` environment variables.
    pub fn load(file_prefix: &str) -> Result<Self, CoreError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("STAFFGRAPH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: AppConfig = cfg.try_deserialize()?;
        tracing::debug!(
            uri = %loaded.neo4j.uri,
            transport = ?loaded.server.transport,
            "Configuration loaded"
        );
        Ok(loaded)
    }
}
