//! metagraph-cli: applies JSON record batches to the metadata graph.

pub mod batch;

pub use batch::RecordBatch;
