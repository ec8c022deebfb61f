//! Record accessors: how entity and relationship records expose their graph shape.
//!
//! Concrete record types implement [`Entity`] or [`Relationship`] directly;
//! no runtime reflection is involved. Serializable records usually delegate
//! `properties()` to [`properties_of`](crate::property::properties_of).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::property::{properties_of, PropertyMap};
use crate::urn::Urn;

/// Relationship record fields that name the endpoints rather than edge properties.
pub const SOURCE_FIELD: &str = "source";
pub const DESTINATION_FIELD: &str = "destination";

/// A record projected onto exactly one graph node, keyed by its urn.
pub trait Entity {
    fn urn(&self) -> &Urn;

    /// Node properties. A `urn` entry, if present, is dropped by the statement builder.
    fn properties(&self) -> Result<PropertyMap>;
}

/// A record projected onto exactly one directed, labeled graph edge.
pub trait Relationship {
    /// Relationship type used as the edge label, e.g. `WORKS_AT`.
    fn label(&self) -> &str;

    fn source(&self) -> &Urn;

    fn destination(&self) -> &Urn;

    /// Edge properties, excluding the endpoints.
    fn properties(&self) -> Result<PropertyMap>;

    /// Fields used as equality criteria when removing this relationship.
    ///
    /// There is no default: each relationship type states which of its
    /// properties identify an edge and which are payload.
    fn filter_fields(&self) -> Vec<&str>;
}

/// Maps an entity type discriminator (as found in its urns) to a node label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Urn entity type, e.g. `corpuser`.
    pub entity_type: String,
    /// Node label, e.g. `CorpUser`.
    pub label: String,
}

impl EntityDescriptor {
    pub fn new(entity_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            label: label.into(),
        }
    }
}

/// Which pre-existing edges to delete before a batch of relationships is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Keep existing edges.
    #[default]
    None,
    /// Delete every edge of the batch's label leaving the shared source.
    RemoveAllFromSource,
    /// Delete every edge of the batch's label entering the shared destination.
    RemoveAllToDestination,
    /// Delete every edge of the batch's label between the shared source and destination.
    RemoveAllFromSourceToDestination,
}

impl RemovalPolicy {
    /// Whether all relationships in the batch must share one source urn.
    pub fn requires_shared_source(self) -> bool {
        matches!(
            self,
            Self::RemoveAllFromSource | Self::RemoveAllFromSourceToDestination
        )
    }

    /// Whether all relationships in the batch must share one destination urn.
    pub fn requires_shared_destination(self) -> bool {
        matches!(
            self,
            Self::RemoveAllToDestination | Self::RemoveAllFromSourceToDestination
        )
    }
}

/// Schemaless entity, used when records arrive as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericEntity {
    pub urn: Urn,
    #[serde(default, deserialize_with = "crate::property::deserialize_property_map")]
    pub properties: PropertyMap,
}

impl Entity for GenericEntity {
    fn urn(&self) -> &Urn {
        &self.urn
    }

    fn properties(&self) -> Result<PropertyMap> {
        Ok(self.properties.clone())
    }
}

/// Schemaless relationship, used when records arrive as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericRelationship {
    pub label: String,
    pub source: Urn,
    pub destination: Urn,
    #[serde(default, deserialize_with = "crate::property::deserialize_property_map")]
    pub properties: PropertyMap,
    #[serde(default)]
    pub filter_fields: Vec<String>,
}

impl Relationship for GenericRelationship {
    fn label(&self) -> &str {
        &self.label
    }

    fn source(&self) -> &Urn {
        &self.source
    }

    fn destination(&self) -> &Urn {
        &self.destination
    }

    fn properties(&self) -> Result<PropertyMap> {
        Ok(self.properties.clone())
    }

    fn filter_fields(&self) -> Vec<&str> {
        self.filter_fields.iter().map(String::as_str).collect()
    }
}

/// Edge properties of a serializable relationship record: every field
/// except `source` and `destination`.
pub fn edge_properties_of<T: Serialize + ?Sized>(record: &T) -> Result<PropertyMap> {
    let mut props = properties_of(record)?;
    props.remove(SOURCE_FIELD);
    props.remove(DESTINATION_FIELD);
    Ok(props)
}
