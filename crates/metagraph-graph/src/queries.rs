//! Read-only inspection of what the writer produced.
//!
//! These run outside any write transaction and are not retried.

use metagraph_core::{PropertyMap, Relationship, Urn};

use crate::error::Result;
use crate::store::GraphStore;
use crate::writer::GraphWriter;

impl<S: GraphStore> GraphWriter<S> {
    /// Properties of the node for `urn`, if it exists.
    pub async fn get_node(&self, urn: &Urn) -> Result<Option<PropertyMap>> {
        Ok(self.get_all_nodes(urn).await?.into_iter().next())
    }

    /// Every node matching `urn` under its resolved label.
    pub async fn get_all_nodes(&self, urn: &Urn) -> Result<Vec<PropertyMap>> {
        let statement = self.builder().match_nodes(urn);
        Ok(self.store().fetch(&statement).await?)
    }

    /// Properties of every edge with the relationship's label between its
    /// source and destination.
    pub async fn get_edges(&self, relationship: &dyn Relationship) -> Result<Vec<PropertyMap>> {
        let statement = self.builder().match_edges(relationship)?;
        Ok(self.store().fetch(&statement).await?)
    }

    /// Properties of every `label` edge leaving `source`.
    pub async fn get_edges_from_source(&self, source: &Urn, label: &str) -> Result<Vec<PropertyMap>> {
        let statement = self.builder().match_edges_from_source(source, label)?;
        Ok(self.store().fetch(&statement).await?)
    }
}
