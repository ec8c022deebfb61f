//! Record batch files.
//!
//! ```json
//! {
//!   "entities": [{"urn": "urn:li:person:u1", "properties": {"name": "Ada"}}],
//!   "relationships": [{
//!     "label": "WORKS_AT",
//!     "source": "urn:li:person:u1",
//!     "destination": "urn:li:company:c1",
//!     "properties": {"role": "engineer"},
//!     "filter_fields": ["role"]
//!   }],
//!   "removal_policy": "remove_all_from_source"
//! }
//! ```

use std::path::Path;

use anyhow::Context;
use metagraph_core::{GenericEntity, GenericRelationship, RemovalPolicy};
use metagraph_graph::{GraphStore, GraphWriter};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordBatch {
    #[serde(default)]
    pub entities: Vec<GenericEntity>,
    #[serde(default)]
    pub relationships: Vec<GenericRelationship>,
    /// Applies to `relationships` only.
    #[serde(default)]
    pub removal_policy: RemovalPolicy,
}

impl RecordBatch {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid record batch {}", path.display()))
    }

    /// Write the entities, then the relationships. Each half commits as its
    /// own transaction.
    pub async fn apply<S: GraphStore>(&self, writer: &GraphWriter<S>) -> anyhow::Result<()> {
        writer
            .add_entities(&self.entities)
            .await
            .context("Failed to add entities")?;
        writer
            .add_relationships(&self.relationships, self.removal_policy)
            .await
            .context("Failed to add relationships")?;

        tracing::info!(
            entities = self.entities.len(),
            relationships = self.relationships.len(),
            policy = ?self.removal_policy,
            "Record batch applied"
        );
        Ok(())
    }
}
