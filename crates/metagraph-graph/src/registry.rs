//! Entity type registry: urn entity type → node label.
//!
//! Built once from the known entity descriptors and immutable afterwards.
//! Writers receive it as an `Arc<TypeRegistry>`; a process-wide instance is
//! available through [`TypeRegistry::global_or_init`].

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use metagraph_core::config::MetagraphConfig;
use metagraph_core::{EntityDescriptor, Urn};

use crate::error::{GraphError, Result};
use crate::statement::is_valid_identifier;

/// Label used for urns whose entity type is not registered.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

static GLOBAL: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    labels: HashMap<String, String>,
}

impl TypeRegistry {
    /// Build a registry from entity descriptors.
    ///
    /// Registering the same `(entity_type, label)` pair twice is allowed.
    /// An entity type mapped to two labels, two entity types sharing one
    /// label, an empty entity type, or a label that is not a plain
    /// identifier is a configuration error.
    pub fn new<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = EntityDescriptor>,
    {
        let mut labels: HashMap<String, String> = HashMap::new();
        let mut owners: HashMap<String, String> = HashMap::new();

        for EntityDescriptor { entity_type, label } in descriptors {
            if entity_type.is_empty() {
                return Err(GraphError::Configuration(format!(
                    "entity label {label} has no urn entity type"
                )));
            }
            if !is_valid_identifier(&label) || label == UNKNOWN_LABEL {
                return Err(GraphError::Configuration(format!(
                    "invalid node label '{label}' for entity type {entity_type}"
                )));
            }

            if let Some(existing) = labels.get(&entity_type) {
                if existing != &label {
                    return Err(GraphError::Configuration(format!(
                        "entity type {entity_type} maps to both {existing} and {label}"
                    )));
                }
                continue;
            }
            if let Some(owner) = owners.get(&label) {
                return Err(GraphError::Configuration(format!(
                    "entity types {owner} and {entity_type} both map to label {label}"
                )));
            }

            owners.insert(label.clone(), entity_type.clone());
            labels.insert(entity_type, label);
        }

        Ok(Self { labels })
    }

    /// Build from the `[[entity_types]]` entries of a loaded configuration.
    pub fn from_config(config: &MetagraphConfig) -> Result<Self> {
        Self::new(config.entity_types.iter().cloned())
    }

    /// Return the process-wide registry, building it on first use.
    ///
    /// Every call validates its descriptors and fails on a configuration
    /// error. Only the first successful construction is kept; later callers
    /// receive that instance and their own descriptors are otherwise ignored.
    pub fn global_or_init<I>(descriptors: I) -> Result<Arc<TypeRegistry>>
    where
        I: IntoIterator<Item = EntityDescriptor>,
    {
        let built = Self::new(descriptors)?;
        Ok(Arc::clone(GLOBAL.get_or_init(|| Arc::new(built))))
    }

    /// The process-wide registry, if it has been initialised.
    pub fn global() -> Option<Arc<TypeRegistry>> {
        GLOBAL.get().cloned()
    }

    /// Node label for a urn, or [`UNKNOWN_LABEL`] when its type is unregistered.
    pub fn label_for(&self, urn: &Urn) -> &str {
        match self.labels.get(urn.entity_type()) {
            Some(label) => label.as_str(),
            None => {
                tracing::debug!(entity_type = urn.entity_type(), "Unregistered entity type");
                UNKNOWN_LABEL
            }
        }
    }

    pub fn contains(&self, entity_type: &str) -> bool {
        self.labels.contains_key(entity_type)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
