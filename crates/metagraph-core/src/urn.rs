//! Entity identifiers.
//!
//! A `Urn` has the shape `urn:<namespace>:<entityType>:<key>`. The key may
//! itself contain colons (nested urns are common), so only the first three
//! separators are structural.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

const SCHEME: &str = "urn";

/// Unique identifier for any entity projected onto the graph.
///
/// Stored on the node as its `urn` property and used as the merge key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Urn {
    raw: String,
    // Byte offsets of the entity type segment inside `raw`.
    type_start: usize,
    type_end: usize,
}

impl Urn {
    /// Build a urn from its parts.
    pub fn new(namespace: &str, entity_type: &str, key: &str) -> Result<Self> {
        format!("{SCHEME}:{namespace}:{entity_type}:{key}").parse()
    }

    /// The namespace segment (`li` in `urn:li:corpuser:jdoe`).
    pub fn namespace(&self) -> &str {
        &self.raw[SCHEME.len() + 1..self.type_start - 1]
    }

    /// The entity type discriminator (`corpuser` in `urn:li:corpuser:jdoe`).
    pub fn entity_type(&self) -> &str {
        &self.raw[self.type_start..self.type_end]
    }

    /// Everything after the entity type.
    pub fn key(&self) -> &str {
        &self.raw[self.type_end + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for Urn {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| CoreError::InvalidUrn {
            urn: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.splitn(4, ':');
        if parts.next() != Some(SCHEME) {
            return Err(invalid("must start with 'urn:'"));
        }
        let namespace = parts.next().unwrap_or_default();
        let entity_type = parts.next().unwrap_or_default();
        let key = parts.next().unwrap_or_default();

        if namespace.is_empty() {
            return Err(invalid("missing namespace"));
        }
        if entity_type.is_empty() {
            return Err(invalid("missing entity type"));
        }
        if key.is_empty() {
            return Err(invalid("missing key"));
        }

        let type_start = SCHEME.len() + 1 + namespace.len() + 1;
        Ok(Self {
            raw: s.to_string(),
            type_start,
            type_end: type_start + entity_type.len(),
        })
    }
}

impl TryFrom<String> for Urn {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Urn> for String {
    fn from(urn: Urn) -> Self {
        urn.raw
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
