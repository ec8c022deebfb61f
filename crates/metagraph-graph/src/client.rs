//! Neo4j connection management and the Bolt-backed [`GraphStore`].

use async_trait::async_trait;
use metagraph_core::config::GraphConfig;
use metagraph_core::property::map_from_json;
use metagraph_core::{PropertyMap, PropertyValue};
use neo4rs::{
    BoltMap, BoltString, BoltType, ConfigBuilder, Graph, Neo4jClientErrorKind, Neo4jErrorKind,
    Neo4jSecurityErrorKind, Query,
};

use crate::error::{GraphError, Result};
use crate::statement::{Statement, PROPS_COLUMN};
use crate::store::{GraphStore, StoreError};

/// Thread-safe Neo4j store with connection pooling.
///
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let mut builder = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size);
        if let Some(database) = &config.database {
            builder = builder.db(database.as_str());
        }
        let neo_config = builder
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, database = ?config.database, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Get a reference to the underlying neo4rs Graph for direct operations.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn run_in_transaction(&self, statements: &[Statement]) -> std::result::Result<(), StoreError> {
        let mut txn = self.graph.start_txn().await.map_err(classify)?;

        for statement in statements {
            if let Err(err) = txn.run(to_query(statement)).await {
                tracing::debug!(error = %err, statement = statement.text(), "Rolling back graph write");
                // The server discards the transaction anyway if rollback fails.
                let _ = txn.rollback().await;
                return Err(classify(err));
            }
        }

        txn.commit().await.map_err(classify)
    }

    async fn fetch(&self, statement: &Statement) -> std::result::Result<Vec<PropertyMap>, StoreError> {
        let mut stream = self
            .graph
            .execute(to_query(statement))
            .await
            .map_err(classify)?;

        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.map_err(classify)? {
            let props: serde_json::Value = row
                .get(PROPS_COLUMN)
                .map_err(|e| StoreError::Fatal(format!("Failed to decode {PROPS_COLUMN}: {e}")))?;
            match props {
                serde_json::Value::Object(fields) => rows.push(map_from_json(fields)),
                other => {
                    return Err(StoreError::Fatal(format!(
                        "Expected a property map in {PROPS_COLUMN}, got {other}"
                    )))
                }
            }
        }
        Ok(rows)
    }
}

/// Sort a driver error into the retry classes. Lost connections and the
/// server error kinds the driver itself would retry are worth another
/// attempt; everything else is not.
fn classify(err: neo4rs::Error) -> StoreError {
    let transient = match &err {
        neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError => true,
        neo4rs::Error::Neo4j(server) => is_retryable(server.kind()),
        _ => false,
    };

    let message = err.to_string();
    if transient {
        StoreError::Transient(message)
    } else {
        StoreError::Fatal(message)
    }
}

/// `Neo.TransientError.*`, expired sessions and expired authorization.
/// Terminated transactions are reported by the server as client errors.
fn is_retryable(kind: Neo4jErrorKind) -> bool {
    matches!(
        kind,
        Neo4jErrorKind::Transient
            | Neo4jErrorKind::Client(Neo4jClientErrorKind::SessionExpired)
            | Neo4jErrorKind::Client(Neo4jClientErrorKind::Security(
                Neo4jSecurityErrorKind::AuthorizationExpired
            ))
    )
}

fn to_query(statement: &Statement) -> Query {
    statement
        .params()
        .iter()
        .fold(neo4rs::query(statement.text()), |q, (name, value)| {
            q.param(name, to_bolt(value))
        })
}

fn to_bolt(value: &PropertyValue) -> BoltType {
    match value {
        PropertyValue::Boolean(b) => (*b).into(),
        PropertyValue::Integer(i) => (*i).into(),
        PropertyValue::Float(f) => (*f).into(),
        PropertyValue::String(s) => s.clone().into(),
        PropertyValue::List(items) => items.iter().map(to_bolt).collect::<Vec<_>>().into(),
        PropertyValue::Map(map) => {
            let mut bolt = BoltMap::new();
            for (key, value) in map {
                bolt.put(BoltString::new(key), to_bolt(value));
            }
            BoltType::Map(bolt)
        }
    }
}
