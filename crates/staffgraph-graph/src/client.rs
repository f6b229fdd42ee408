//! Neo4j connection management and shared graph client.

use std::future::Future;
use std::time::Duration;

use neo4rs::{ConfigBuilder, Graph, Query};

use staffgraph_core::config::Neo4jSettings;
use staffgraph_core::{CoreError, NodeLabel};

/// Neo4j status code reported when a write breaks a uniqueness constraint.
const CONSTRAINT_VIOLATION_CODE: &str = "Neo.ClientError.Schema.ConstraintValidationFailed";

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(neo4rs::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("{label} not found with id {id}")]
    NotFound { label: NodeLabel, id: String },

    #[error("Validation error: {0}")]
    Validation(#[from] CoreError),

    #[error("Statement timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<neo4rs::Error> for GraphError {
    fn from(err: neo4rs::Error) -> Self {
        let message = err.to_string();
        if message.contains(CONSTRAINT_VIOLATION_CODE) || message.contains("already exists with label")
        {
            Self::ConstraintViolation(message)
        } else {
            Self::Query(err)
        }
    }
}

impl GraphError {
    pub fn not_found(label: NodeLabel, id: impl ToString) -> Self {
        Self::NotFound {
            label,
            id: id.to_string(),
        }
    }
}

/// Decode one column of a result row.
pub(crate) fn column<T>(row: &neo4rs::Row, key: &str) -> Result<T, GraphError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    row.get::<T>(key)
        .map_err(|e| GraphError::Serialization(format!("Failed to decode column {key}: {e}")))
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
    pub statement_timeout: Duration,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::from(&Neo4jSettings::default())
    }
}

impl From<&Neo4jSettings> for GraphConfig {
    fn from(settings: &Neo4jSettings) -> Self {
        Self {
            uri: settings.uri.clone(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            max_connections: settings.max_connections,
            fetch_size: settings.fetch_size,
            statement_timeout: Duration::from_secs(settings.statement_timeout_secs),
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// Every statement borrows one pooled connection and hands it back when the
/// statement finishes, on success or failure. Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
    statement_timeout: Duration,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(
            uri = %config.uri,
            max_connections = config.max_connections,
            "Connected to Neo4j"
        );
        Ok(Self {
            graph,
            statement_timeout: config.statement_timeout,
        })
    }

    /// Execute a write-only query (CREATE, MERGE, DELETE, SET).
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        self.with_timeout(self.graph.run(query)).await
    }

    /// Execute a query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        self.with_timeout(async {
            let mut stream = self.graph.execute(query).await?;
            let mut rows = Vec::new();
            while let Some(row) = stream.next().await? {
                rows.push(row);
            }
            Ok::<_, neo4rs::Error>(rows)
        })
        .await
    }

    /// Execute a query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        self.with_timeout(async {
            let mut stream = self.graph.execute(query).await?;
            stream.next().await
        })
        .await
    }

    async fn with_timeout<T, F>(&self, statement: F) -> Result<T, GraphError>
    where
        F: Future<Output = Result<T, neo4rs::Error>>,
    {
        match tokio::time::timeout(self.statement_timeout, statement).await {
            Ok(result) => result.map_err(GraphError::from),
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.statement_timeout.as_secs(),
                    "Statement exceeded timeout"
                );
                Err(GraphError::Timeout {
                    seconds: self.statement_timeout.as_secs(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_settings() {
        let settings = Neo4jSettings {
            uri: "neo4j://10.0.0.5:7687".to_string(),
            statement_timeout_secs: 5,
            ..Default::default()
        };
        let config = GraphConfig::from(&settings);
        assert_eq!(config.uri, "neo4j://10.0.0.5:7687");
        assert_eq!(config.user, "neo4j");
        assert_eq!(config.statement_timeout, Duration::from_secs(5));
    }

    #[test]
    fn not_found_message_names_label_and_id() {
        let err = GraphError::not_found(NodeLabel::Department, 42);
        assert_eq!(err.to_string(), "Department not found with id 42");
    }

    fn row(key: &str, value: neo4rs::BoltType) -> neo4rs::Row {
        neo4rs::Row::new(
            neo4rs::BoltList::from(vec![neo4rs::BoltType::from(key)]),
            neo4rs::BoltList::from(vec![value]),
        )
    }

    #[test]
    fn column_decodes_value() {
        let row = row("cnt", neo4rs::BoltType::from(3_i64));
        assert_eq!(column::<i64>(&row, "cnt").unwrap(), 3);
    }

    #[test]
    fn column_decode_failure_is_an_error() {
        let row = row("cnt", neo4rs::BoltType::from("three"));
        let err = column::<i64>(&row, "cnt").unwrap_err();
        assert!(matches!(err, GraphError::Serialization(_)), "{err}");

        let err = column::<String>(&row, "assigned_on").unwrap_err();
        assert!(matches!(err, GraphError::Serialization(_)), "{err}");
    }

    #[test]
    fn constraint_failure_is_classified() {
        let err = GraphError::from(neo4rs::Error::UnexpectedMessage(format!(
            "unexpected response for PULL: Failure {{ code: \"{CONSTRAINT_VIOLATION_CODE}\", \
             message: \"Node(12) already exists with label `Employee` and property `email` = 'a@example.com'\" }}"
        )));
        assert!(matches!(err, GraphError::ConstraintViolation(_)), "{err}");
    }

    #[test]
    fn other_driver_errors_stay_query_errors() {
        let err = GraphError::from(neo4rs::Error::UnexpectedMessage(
            "unexpected response for PULL: Failure { code: \"Neo.ClientError.Statement.SyntaxError\" }"
                .to_string(),
        ));
        assert!(matches!(err, GraphError::Query(_)), "{err}");
    }

    #[test]
    fn validation_errors_convert() {
        let core = "id".parse::<staffgraph_core::EmployeeField>().unwrap_err();
        let err = GraphError::from(core);
        assert!(matches!(err, GraphError::Validation(_)));
    }
}
