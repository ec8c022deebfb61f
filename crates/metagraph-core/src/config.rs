//! Configuration management for metagraph.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`METAGRAPH__` prefix, `__` separator,
//!    e.g. `METAGRAPH__NEO4J__URI`)
//! 2. Config file (`metagraph.toml`, optional)
//! 3. Defaults

use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;
use crate::record::EntityDescriptor;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetagraphConfig {
    #[serde(default)]
    pub neo4j: GraphConfig,

    #[serde(default)]
    pub writer: WriterConfig,

    /// Known entity types, used to build the type registry.
    #[serde(default)]
    pub entity_types: Vec<EntityDescriptor>,
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// Target database; the server default when unset.
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
            database: None,
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

/// Retry and timeout behaviour of the transactional executor.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WriterConfig {
    /// Retries after the first attempt (default 3, so 4 attempts total).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-attempt transaction timeout. Unset leaves it to the store.
    ///
    /// Enforced on the client and includes the commit round trip: an attempt
    /// that times out after the store accepted the commit is still counted as
    /// failed and retried. Batches are merges, so the retry converges on the
    /// same graph, but the caller may see `RetryLimitReached` for a batch that
    /// was in fact written.
    #[serde(default)]
    pub transaction_timeout_ms: Option<u64>,

    /// Pause between attempts.
    #[serde(default)]
    pub retry_backoff_ms: u64,
}

impl WriterConfig {
    pub fn transaction_timeout(&self) -> Option<Duration> {
        self.transaction_timeout_ms.map(Duration::from_millis)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            transaction_timeout_ms: None,
            retry_backoff_ms: 0,
        }
    }
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "metagraph-dev".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_max_retries() -> u32 {
    3
}

/// Load configuration from `<file_prefix>.toml` (if present) and the environment.
pub fn load_config(file_prefix: &str) -> Result<MetagraphConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("METAGRAPH")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let loaded: MetagraphConfig = cfg.try_deserialize()?;
    tracing::debug!(
        uri = %loaded.neo4j.uri,
        entity_types = loaded.entity_types.len(),
        max_retries = loaded.writer.max_retries,
        "Configuration loaded"
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetagraphConfig::default();
        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(config.neo4j.database, None);
        assert_eq!(config.writer.max_retries, 3);
        assert_eq!(config.writer.transaction_timeout(), None);
        assert_eq!(config.writer.retry_backoff(), Duration::ZERO);
        assert!(config.entity_types.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metagraph.toml");
        std::fs::write(
            &path,
            r#"
[neo4j]
uri = "bolt://graph:7687"
database = "metadata"

[writer]
max_retries = 5
transaction_timeout_ms = 2000

[[entity_types]]
entity_type = "corpuser"
label = "CorpUser"

[[entity_types]]
entity_type = "dataset"
label = "Dataset"
"#,
        )
        .unwrap();

        let prefix = dir.path().join("metagraph");
        let config = load_config(prefix.to_str().unwrap()).unwrap();

        assert_eq!(config.neo4j.uri, "bolt://graph:7687");
        assert_eq!(config.neo4j.user, "neo4j");
        assert_eq!(config.neo4j.database.as_deref(), Some("metadata"));
        assert_eq!(config.writer.max_retries, 5);
        assert_eq!(
            config.writer.transaction_timeout(),
            Some(Duration::from_secs(2))
        );
        assert_eq!(
            config.entity_types,
            vec![
                EntityDescriptor::new("corpuser", "CorpUser"),
                EntityDescriptor::new("dataset", "Dataset"),
            ]
        );
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let config = load_config(prefix.to_str().unwrap()).unwrap();
        assert_eq!(config.writer, WriterConfig::default());
    }
}
