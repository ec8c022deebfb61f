//! Error types for the metagraph-graph crate.

use thiserror::Error;

use crate::store::StoreError;
use crate::validate::SchemaViolation;

#[derive(Error, Debug)]
pub enum GraphError {
    /// Type registry ambiguity or invalid configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Schema violation: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    /// A removal-policy precondition does not hold for the batch.
    #[error("Records have different {field}: expected {expected}, found {found}")]
    InconsistentBatch {
        field: &'static str,
        expected: String,
        found: String,
    },

    #[error("Failed to execute graph write transaction after {attempts} attempts: {source}")]
    RetryLimitReached {
        attempts: u32,
        #[source]
        source: StoreError,
    },

    #[error("Graph store error: {0}")]
    FatalStore(#[from] StoreError),

    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Core(#[from] metagraph_core::CoreError),
}

pub type Result<T> = std::result::Result<T, GraphError>;
