//! Record validation run before any statement is built.

use metagraph_core::{Entity, PropertyMap, PropertyValue, Relationship};

use crate::statement::is_valid_identifier;

/// A record rejected by a [`SchemaValidator`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{record}: {reason}")]
pub struct SchemaViolation {
    /// The offending record (urn or relationship label).
    pub record: String,
    pub reason: String,
}

impl SchemaViolation {
    pub fn new(record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            reason: reason.into(),
        }
    }
}

/// Decides whether a record may be written.
pub trait SchemaValidator: Send + Sync {
    fn validate_entity(&self, entity: &dyn Entity) -> Result<(), SchemaViolation>;

    fn validate_relationship(&self, relationship: &dyn Relationship)
        -> Result<(), SchemaViolation>;
}

/// Checks that records can be expressed as graph elements at all:
/// identifier-shaped labels and filter fields, coercible properties, and no
/// nested maps (Neo4j cannot store them as property values).
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl SchemaValidator for StructuralValidator {
    fn validate_entity(&self, entity: &dyn Entity) -> Result<(), SchemaViolation> {
        let record = entity.urn().to_string();
        let props = entity
            .properties()
            .map_err(|e| SchemaViolation::new(&record, e.to_string()))?;

        if let Some(PropertyValue::String(urn)) = props.get("urn") {
            if urn != entity.urn().as_str() {
                return Err(SchemaViolation::new(
                    record,
                    format!("urn property {urn} does not match the record urn"),
                ));
            }
        }
        check_storable(&record, &props)
    }

    fn validate_relationship(
        &self,
        relationship: &dyn Relationship,
    ) -> Result<(), SchemaViolation> {
        let label = relationship.label();
        if !is_valid_identifier(label) {
            return Err(SchemaViolation::new(
                label,
                "relationship label is not a valid identifier",
            ));
        }
        for field in relationship.filter_fields() {
            if !is_valid_identifier(field) {
                return Err(SchemaViolation::new(
                    label,
                    format!("filter field '{field}' is not a valid identifier"),
                ));
            }
        }

        let props = relationship
            .properties()
            .map_err(|e| SchemaViolation::new(label, e.to_string()))?;
        check_storable(label, &props)
    }
}

fn check_storable(record: &str, props: &PropertyMap) -> Result<(), SchemaViolation> {
    for (key, value) in props {
        let nested = match value {
            PropertyValue::Map(_) => true,
            PropertyValue::List(items) => items
                .iter()
                .any(|v| matches!(v, PropertyValue::Map(_) | PropertyValue::List(_))),
            _ => false,
        };
        if nested {
            return Err(SchemaViolation::new(
                record,
                format!("property '{key}' is not a primitive or a flat list"),
            ));
        }
    }
    Ok(())
}
