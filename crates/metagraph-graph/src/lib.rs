//! metagraph-graph: retrying write engine for the metadata graph.
//!
//! Entity and relationship records are turned into parameterized Cypher
//! statements, executed as one atomic batch per call with bounded retries,
//! and reported to metric listeners once committed. All graph writes flow
//! through [`GraphWriter`].

pub mod client;
pub mod error;
pub mod executor;
pub mod memory;
pub mod metrics;
pub mod queries;
pub mod registry;
pub mod statement;
pub mod store;
pub mod validate;
pub mod writer;

pub use client::Neo4jStore;
pub use error::{GraphError, Result};
pub use executor::{ExecutionResult, TransactionalExecutor};
pub use memory::{MemoryEdge, MemoryGraph, NodeRef};
pub use metagraph_core::config::{GraphConfig, WriterConfig};
pub use metrics::{MetricFanout, MetricListener, TracingMetricListener};
pub use registry::{TypeRegistry, UNKNOWN_LABEL};
pub use statement::{Operation, Statement, StatementBuilder};
pub use store::{GraphStore, StoreError};
pub use validate::{SchemaValidator, SchemaViolation, StructuralValidator};
pub use writer::GraphWriter;
