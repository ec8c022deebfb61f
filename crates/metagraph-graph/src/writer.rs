//! Write facade: the entry point for every graph mutation.

use std::sync::Arc;

use metagraph_core::config::WriterConfig;
use metagraph_core::{Entity, MetricEvent, Relationship, RemovalPolicy, Urn, WriteKind};

use crate::error::Result;
use crate::executor::{ExecutionResult, TransactionalExecutor};
use crate::metrics::{MetricFanout, MetricListener};
use crate::registry::TypeRegistry;
use crate::statement::{Statement, StatementBuilder};
use crate::store::GraphStore;
use crate::validate::{SchemaValidator, StructuralValidator};

/// Writes entity and relationship records to a graph store.
///
/// Each call validates every record, builds one ordered batch of statements,
/// runs it as a single retried transaction and then notifies the metric
/// listeners exactly once. A call either commits entirely or leaves the
/// graph unchanged.
pub struct GraphWriter<S> {
    executor: TransactionalExecutor<S>,
    registry: Arc<TypeRegistry>,
    validator: Arc<dyn SchemaValidator>,
    metrics: MetricFanout,
}

impl<S: GraphStore> GraphWriter<S> {
    /// Writer with the default retry policy and the structural validator.
    pub fn new(store: S, registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(store, registry, &WriterConfig::default())
    }

    pub fn with_config(store: S, registry: Arc<TypeRegistry>, config: &WriterConfig) -> Self {
        Self {
            executor: TransactionalExecutor::new(store, config),
            registry,
            validator: Arc::new(StructuralValidator),
            metrics: MetricFanout::new(),
        }
    }

    /// Replace the validator consulted before any statement is built.
    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn add_metric_listener(&self, listener: Arc<dyn MetricListener>) {
        self.metrics.add_listener(listener);
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        self.executor.store()
    }

    pub(crate) fn builder(&self) -> StatementBuilder<'_> {
        StatementBuilder::new(&self.registry)
    }

    /// Upsert one node per entity. Existing properties the records do not
    /// mention are kept.
    pub async fn add_entities<E: Entity>(&self, entities: &[E]) -> Result<()> {
        for entity in entities {
            self.validator.validate_entity(entity)?;
        }

        let builder = self.builder();
        let statements = entities
            .iter()
            .map(|entity| builder.upsert_node(entity))
            .collect::<Result<Vec<_>>>()?;

        self.commit(WriteKind::EntitiesAdded, entities.len(), &statements)
            .await
    }

    /// Delete the nodes for `urns` together with all their edges.
    pub async fn remove_entities(&self, urns: &[Urn]) -> Result<()> {
        let builder = self.builder();
        let statements: Vec<Statement> = urns.iter().map(|urn| builder.delete_node(urn)).collect();

        self.commit(WriteKind::EntitiesRemoved, urns.len(), &statements)
            .await
    }

    /// Upsert one edge per relationship, creating placeholder nodes for
    /// endpoints that do not exist yet. `policy` first clears the existing
    /// edges it scopes to, inside the same transaction.
    pub async fn add_relationships<R: Relationship>(
        &self,
        relationships: &[R],
        policy: RemovalPolicy,
    ) -> Result<()> {
        for relationship in relationships {
            self.validator.validate_relationship(relationship)?;
        }

        let statements = self.builder().add_relationships(relationships, policy)?;

        self.commit(
            WriteKind::RelationshipsAdded,
            relationships.len(),
            &statements,
        )
        .await
    }

    /// Delete the edges matching each relationship.
    pub async fn remove_relationships<R: Relationship>(&self, relationships: &[R]) -> Result<()> {
        for relationship in relationships {
            self.validator.validate_relationship(relationship)?;
        }

        let builder = self.builder();
        let statements = relationships
            .iter()
            .map(|relationship| builder.delete_edge(relationship))
            .collect::<Result<Vec<_>>>()?;

        self.commit(
            WriteKind::RelationshipsRemoved,
            relationships.len(),
            &statements,
        )
        .await
    }

    async fn commit(&self, kind: WriteKind, count: usize, statements: &[Statement]) -> Result<()> {
        if count == 0 {
            self.metrics.notify(&MetricEvent::empty(kind));
            return Ok(());
        }

        let ExecutionResult { elapsed, retries } = self.executor.execute(statements).await?;

        tracing::debug!(
            kind = %kind,
            count,
            statements = statements.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            retries,
            "Graph write batch committed"
        );
        self.metrics
            .notify(&MetricEvent::new(kind, count, elapsed, retries));
        Ok(())
    }
}
