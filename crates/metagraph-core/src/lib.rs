//! metagraph-core: Shared types, configuration, and error handling for the metagraph writer.
//!
//! This crate provides the foundational types used by the graph writer:
//! - `Urn` identifiers with an embedded entity-type discriminator
//! - Property values and coercion from serde-serializable records
//! - The `Entity` / `Relationship` record traits and the removal policy
//! - Metric event types reported after each committed batch
//! - Configuration management
//! - Common error types

pub mod config;
pub mod error;
pub mod events;
pub mod property;
pub mod record;
pub mod urn;

pub use error::CoreError;
pub use events::{MetricEvent, WriteKind};
pub use property::{PropertyMap, PropertyValue};
pub use record::{
    Entity, EntityDescriptor, GenericEntity, GenericRelationship, Relationship, RemovalPolicy,
};
pub use urn::Urn;
