//! In-memory graph store.
//!
//! Interprets each statement's [`Operation`] with the semantics of its
//! Cypher template: nodes are unique per `(label, urn)`, merges add
//! properties, `MATCH` on a missing node matches nothing. Useful for tests
//! and for running the writer without a Neo4j server.
//!
//! A transaction runs against a scratch copy of the graph which replaces
//! the live graph only once every statement has succeeded. Failures can be
//! queued with [`MemoryGraph::fail_next`]; a queued failure fires after the
//! first statement of the next transaction has been applied to the scratch
//! copy, so it also demonstrates that partial work is discarded.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use metagraph_core::{PropertyMap, PropertyValue};

use crate::statement::{
    Operation, Statement, FILTER_PARAM_PREFIX, PARAM_DESTINATION_URN, PARAM_PROPERTIES,
    PARAM_SOURCE_URN, PARAM_URN,
};
use crate::store::{GraphStore, StoreError};

/// Identity of a node: its label and urn.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRef {
    pub label: String,
    pub urn: String,
}

impl NodeRef {
    pub fn new(label: impl Into<String>, urn: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            urn: urn.into(),
        }
    }
}

/// A stored edge.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEdge {
    pub source: NodeRef,
    pub destination: NodeRef,
    pub relationship: String,
    pub properties: PropertyMap,
}

impl MemoryEdge {
    fn touches(&self, node: &NodeRef) -> bool {
        &self.source == node || &self.destination == node
    }

    fn connects(&self, source: &NodeRef, destination: &NodeRef, relationship: &str) -> bool {
        &self.source == source && &self.destination == destination && self.relationship == relationship
    }
}

#[derive(Debug, Clone, Default)]
struct GraphState {
    nodes: BTreeMap<NodeRef, PropertyMap>,
    edges: Vec<MemoryEdge>,
}

impl GraphState {
    fn merge_node(&mut self, node: NodeRef) -> &mut PropertyMap {
        let urn = node.urn.clone();
        self.nodes.entry(node).or_insert_with(|| {
            let mut props = PropertyMap::new();
            props.insert(PARAM_URN.to_string(), PropertyValue::String(urn));
            props
        })
    }

    fn apply(&mut self, statement: &Statement) -> Result<(), StoreError> {
        match statement.operation() {
            Operation::UpsertNode { label } => {
                let node = NodeRef::new(label, string_param(statement, PARAM_URN)?);
                let props = map_param(statement, PARAM_PROPERTIES)?;
                self.merge_node(node).extend(props.clone());
            }
            Operation::MergeNode { label } => {
                let node = NodeRef::new(label, string_param(statement, PARAM_URN)?);
                self.merge_node(node);
            }
            Operation::DeleteNode { label } => {
                let node = NodeRef::new(label, string_param(statement, PARAM_URN)?);
                if self.nodes.remove(&node).is_some() {
                    self.edges.retain(|e| !e.touches(&node));
                }
            }
            Operation::UpsertEdge {
                source_label,
                destination_label,
                relationship,
            } => {
                let source = NodeRef::new(source_label, string_param(statement, PARAM_SOURCE_URN)?);
                let destination = NodeRef::new(
                    destination_label,
                    string_param(statement, PARAM_DESTINATION_URN)?,
                );
                let props = map_param(statement, PARAM_PROPERTIES)?;

                if !self.nodes.contains_key(&source) || !self.nodes.contains_key(&destination) {
                    return Ok(());
                }

                let mut matched = false;
                for edge in self
                    .edges
                    .iter_mut()
                    .filter(|e| e.connects(&source, &destination, relationship))
                {
                    edge.properties.extend(props.clone());
                    matched = true;
                }
                if !matched {
                    self.edges.push(MemoryEdge {
                        source,
                        destination,
                        relationship: relationship.clone(),
                        properties: props.clone(),
                    });
                }
            }
            Operation::DeleteEdge {
                source_label,
                destination_label,
                relationship,
                filter,
            } => {
                let source = NodeRef::new(source_label, string_param(statement, PARAM_SOURCE_URN)?);
                let destination = NodeRef::new(
                    destination_label,
                    string_param(statement, PARAM_DESTINATION_URN)?,
                );
                let criteria = filter
                    .iter()
                    .map(|field| {
                        param(statement, &format!("{FILTER_PARAM_PREFIX}{field}"))
                            .map(|value| (field.as_str(), value))
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                self.edges.retain(|e| {
                    let hit = e.connects(&source, &destination, relationship)
                        && criteria
                            .iter()
                            .all(|(field, value)| e.properties.get(*field) == Some(*value));
                    !hit
                });
            }
            Operation::RemoveEdges {
                source_label,
                destination_label,
                relationship,
                ..
            } => {
                let source = match source_label {
                    Some(label) => Some(NodeRef::new(
                        label,
                        string_param(statement, PARAM_SOURCE_URN)?,
                    )),
                    None => None,
                };
                let destination = match destination_label {
                    Some(label) => Some(NodeRef::new(
                        label,
                        string_param(statement, PARAM_DESTINATION_URN)?,
                    )),
                    None => None,
                };

                self.edges.retain(|e| {
                    let hit = &e.relationship == relationship
                        && source.as_ref().map_or(true, |s| &e.source == s)
                        && destination.as_ref().map_or(true, |d| &e.destination == d);
                    !hit
                });
            }
            Operation::MatchNodes { .. }
            | Operation::MatchEdges { .. }
            | Operation::MatchEdgesFromSource { .. } => {}
        }
        Ok(())
    }

    fn read(&self, statement: &Statement) -> Result<Vec<PropertyMap>, StoreError> {
        match statement.operation() {
            Operation::MatchNodes { label } => {
                let node = NodeRef::new(label, string_param(statement, PARAM_URN)?);
                Ok(self.nodes.get(&node).cloned().into_iter().collect())
            }
            Operation::MatchEdges {
                source_label,
                destination_label,
                relationship,
            } => {
                let source = NodeRef::new(source_label, string_param(statement, PARAM_SOURCE_URN)?);
                let destination = NodeRef::new(
                    destination_label,
                    string_param(statement, PARAM_DESTINATION_URN)?,
                );
                Ok(self
                    .edges
                    .iter()
                    .filter(|e| e.connects(&source, &destination, relationship))
                    .map(|e| e.properties.clone())
                    .collect())
            }
            Operation::MatchEdgesFromSource {
                source_label,
                relationship,
            } => {
                let source = NodeRef::new(source_label, string_param(statement, PARAM_SOURCE_URN)?);
                Ok(self
                    .edges
                    .iter()
                    .filter(|e| e.source == source && &e.relationship == relationship)
                    .map(|e| e.properties.clone())
                    .collect())
            }
            other => Err(StoreError::Fatal(format!(
                "{other:?} is not a read statement"
            ))),
        }
    }
}

fn param<'s>(statement: &'s Statement, name: &str) -> Result<&'s PropertyValue, StoreError> {
    statement
        .param(name)
        .ok_or_else(|| StoreError::Fatal(format!("missing parameter ${name}")))
}

fn string_param<'s>(statement: &'s Statement, name: &str) -> Result<&'s str, StoreError> {
    param(statement, name)?
        .as_str()
        .ok_or_else(|| StoreError::Fatal(format!("parameter ${name} must be a string")))
}

fn map_param<'s>(statement: &'s Statement, name: &str) -> Result<&'s PropertyMap, StoreError> {
    match param(statement, name)? {
        PropertyValue::Map(map) => Ok(map),
        _ => Err(StoreError::Fatal(format!("parameter ${name} must be a map"))),
    }
}

/// In-memory [`GraphStore`].
#[derive(Default)]
pub struct MemoryGraph {
    state: RwLock<GraphState>,
    failures: Mutex<VecDeque<StoreError>>,
    transactions: AtomicUsize,
    committed: Mutex<Vec<Vec<Operation>>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next transaction fail with `err` after its first statement.
    /// Calls queue up: each failure is consumed by one transaction.
    pub fn fail_next(&self, err: StoreError) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(err);
    }

    /// Transactions attempted so far, committed or not.
    pub fn transactions(&self) -> usize {
        self.transactions.load(Ordering::SeqCst)
    }

    /// Operations of every committed transaction, in commit order.
    pub fn committed_batches(&self) -> Vec<Vec<Operation>> {
        self.committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn node(&self, label: &str, urn: &str) -> Option<PropertyMap> {
        self.snapshot().nodes.get(&NodeRef::new(label, urn)).cloned()
    }

    pub fn nodes(&self) -> Vec<NodeRef> {
        self.snapshot().nodes.keys().cloned().collect()
    }

    pub fn edges(&self) -> Vec<MemoryEdge> {
        self.snapshot().edges.clone()
    }

    pub fn node_count(&self) -> usize {
        self.snapshot().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.snapshot().edges.len()
    }

    fn snapshot(&self) -> std::sync::RwLockReadGuard<'_, GraphState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn run_in_transaction(&self, statements: &[Statement]) -> Result<(), StoreError> {
        self.transactions.fetch_add(1, Ordering::SeqCst);
        let mut injected = self
            .failures
            .lock()
            .map_err(|e| StoreError::Fatal(format!("Lock error: {e}")))?
            .pop_front();

        // Holding the write lock serializes transactions.
        let mut live = self
            .state
            .write()
            .map_err(|e| StoreError::Fatal(format!("Lock error: {e}")))?;
        let mut scratch = live.clone();

        for statement in statements {
            scratch.apply(statement)?;
            if let Some(err) = injected.take() {
                return Err(err);
            }
        }

        *live = scratch;
        drop(live);

        self.committed
            .lock()
            .map_err(|e| StoreError::Fatal(format!("Lock error: {e}")))?
            .push(statements.iter().map(|s| s.operation().clone()).collect());
        Ok(())
    }

    async fn fetch(&self, statement: &Statement) -> Result<Vec<PropertyMap>, StoreError> {
        self.state
            .read()
            .map_err(|e| StoreError::Fatal(format!("Lock error: {e}")))?
            .read(statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metagraph_core::{EntityDescriptor, GenericEntity, GenericRelationship, RemovalPolicy, Urn};

    use crate::registry::TypeRegistry;
    use crate::statement::StatementBuilder;

    fn registry() -> TypeRegistry {
        TypeRegistry::new(vec![
            EntityDescriptor::new("person", "Person"),
            EntityDescriptor::new("company", "Company"),
        ])
        .unwrap()
    }

    fn urn(s: &str) -> Urn {
        s.parse().unwrap()
    }

    fn entity(key: &str, props: serde_json::Value) -> GenericEntity {
        GenericEntity {
            urn: urn(&format!("urn:li:person:{key}")),
            properties: serde_json::from_value(props).unwrap(),
        }
    }

    fn link(source: &str, destination: &str, label: &str) -> GenericRelationship {
        GenericRelationship {
            label: label.to_string(),
            source: urn(source),
            destination: urn(destination),
            properties: PropertyMap::new(),
            filter_fields: Vec::new(),
        }
    }

    #[tokio::test]
    async fn upsert_adds_properties_without_clearing() {
        let registry = registry();
        let builder = StatementBuilder::new(&registry);
        let graph = MemoryGraph::new();

        let first = builder.upsert_node(&entity("u1", serde_json::json!({"b": 2}))).unwrap();
        let second = builder.upsert_node(&entity("u1", serde_json::json!({"a": 1}))).unwrap();
        graph.run_in_transaction(&[first]).await.unwrap();
        graph.run_in_transaction(&[second]).await.unwrap();

        let node = graph.node("Person", "urn:li:person:u1").unwrap();
        assert_eq!(node["a"].as_i64(), Some(1));
        assert_eq!(node["b"].as_i64(), Some(2));
        assert_eq!(node["urn"].as_str(), Some("urn:li:person:u1"));
        assert_eq!(graph.node_count(), 1);
    }

    #[tokio::test]
    async fn edge_merge_needs_both_endpoints() {
        let registry = registry();
        let builder = StatementBuilder::new(&registry);
        let graph = MemoryGraph::new();
        let rel = link("urn:li:person:u1", "urn:li:company:c1", "WORKS_AT");

        graph
            .run_in_transaction(&[builder.upsert_edge(&rel).unwrap()])
            .await
            .unwrap();
        assert_eq!(graph.edge_count(), 0);

        let batch = builder.add_relationships(&[rel], RemovalPolicy::None).unwrap();
        graph.run_in_transaction(&batch).await.unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[tokio::test]
    async fn detach_delete_removes_incident_edges_of_every_label() {
        let registry = registry();
        let builder = StatementBuilder::new(&registry);
        let graph = MemoryGraph::new();

        let rels = [
            link("urn:li:person:u1", "urn:li:company:c1", "WORKS_AT"),
            link("urn:li:person:u1", "urn:li:company:c2", "OWNS"),
            link("urn:li:person:u2", "urn:li:person:u1", "KNOWS"),
            link("urn:li:person:u2", "urn:li:company:c1", "WORKS_AT"),
        ];
        for rel in &rels {
            let batch = builder
                .add_relationships(std::slice::from_ref(rel), RemovalPolicy::None)
                .unwrap();
            graph.run_in_transaction(&batch).await.unwrap();
        }
        assert_eq!(graph.edge_count(), 4);

        graph
            .run_in_transaction(&[builder.delete_node(&urn("urn:li:person:u1"))])
            .await
            .unwrap();

        let edges = graph.edges();
        assert_eq!(edges.len(), 1);
        assert!(edges.iter().all(|e| e.source.urn != "urn:li:person:u1"
            && e.destination.urn != "urn:li:person:u1"));
        assert!(graph.node("Person", "urn:li:person:u1").is_none());
    }

    #[tokio::test]
    async fn injected_failure_discards_partial_work() {
        let registry = registry();
        let builder = StatementBuilder::new(&registry);
        let graph = MemoryGraph::new();
        graph.fail_next(StoreError::Transient("deadlock".to_string()));

        let batch = vec![
            builder.upsert_node(&entity("u1", serde_json::json!({}))).unwrap(),
            builder.upsert_node(&entity("u2", serde_json::json!({}))).unwrap(),
        ];
        let err = graph.run_in_transaction(&batch).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(graph.node_count(), 0);
        assert!(graph.committed_batches().is_empty());

        graph.run_in_transaction(&batch).await.unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.transactions(), 2);
    }

    #[tokio::test]
    async fn malformed_statement_is_fatal() {
        let graph = MemoryGraph::new();
        let statement = Statement::new(
            Operation::UpsertNode {
                label: "Person".to_string(),
            },
            "MERGE (node:Person {urn: $urn}) SET node += $properties RETURN node",
            PropertyMap::new(),
        );
        let err = graph.run_in_transaction(&[statement]).await.unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn fetch_rejects_writes() {
        let registry = registry();
        let graph = MemoryGraph::new();
        let statement = StatementBuilder::new(&registry).delete_node(&urn("urn:li:person:u1"));
        assert!(graph.fetch(&statement).await.is_err());
    }
}
