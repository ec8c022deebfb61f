//! Cypher statement builder.
//!
//! Every write is a fixed template with labels interpolated and all data
//! bound as named parameters. Labels come from the type registry or from
//! relationship types and are checked to be plain identifiers first.
//!
//! Each [`Statement`] also carries an [`Operation`] describing its template,
//! so backends that do not speak Cypher (see `memory`) run the same batch.

use std::collections::BTreeSet;

use metagraph_core::{Entity, PropertyMap, PropertyValue, Relationship, RemovalPolicy, Urn};

use crate::error::{GraphError, Result};
use crate::registry::TypeRegistry;
use crate::validate::SchemaViolation;

pub const PARAM_URN: &str = "urn";
pub const PARAM_SOURCE_URN: &str = "source_urn";
pub const PARAM_DESTINATION_URN: &str = "destination_urn";
pub const PARAM_PROPERTIES: &str = "properties";
/// Prefix of the parameters holding edge filter values.
pub const FILTER_PARAM_PREFIX: &str = "filter_";
/// Column returned by every read statement.
pub const PROPS_COLUMN: &str = "props";

/// What a statement does, independent of its Cypher text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Merge a node by urn and add `$properties` to it.
    UpsertNode { label: String },
    /// Delete a node and every edge touching it.
    DeleteNode { label: String },
    /// Merge a node by urn without touching its properties.
    MergeNode { label: String },
    /// Merge an edge between two existing nodes and add `$properties` to it.
    UpsertEdge {
        source_label: String,
        destination_label: String,
        relationship: String,
    },
    /// Delete edges between two nodes whose `filter` fields equal the bound values.
    DeleteEdge {
        source_label: String,
        destination_label: String,
        relationship: String,
        filter: Vec<String>,
    },
    /// Bulk delete ahead of a relationship batch. Labels are set for the
    /// endpoints the policy scopes to.
    RemoveEdges {
        policy: RemovalPolicy,
        source_label: Option<String>,
        destination_label: Option<String>,
        relationship: String,
    },
    MatchNodes { label: String },
    MatchEdges {
        source_label: String,
        destination_label: String,
        relationship: String,
    },
    MatchEdgesFromSource {
        source_label: String,
        relationship: String,
    },
}

impl Operation {
    /// Whether the statement only reads.
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            Self::MatchNodes { .. } | Self::MatchEdges { .. } | Self::MatchEdgesFromSource { .. }
        )
    }
}

/// A parameterized statement: template text plus named parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    operation: Operation,
    text: String,
    params: PropertyMap,
}

impl Statement {
    pub fn new(operation: Operation, text: impl Into<String>, params: PropertyMap) -> Self {
        Self {
            operation,
            text: text.into(),
            params,
        }
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &PropertyMap {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&PropertyValue> {
        self.params.get(name)
    }
}

/// Builds statements, resolving node labels through a [`TypeRegistry`].
pub struct StatementBuilder<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> StatementBuilder<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    fn label(&self, urn: &Urn) -> String {
        self.registry.label_for(urn).to_string()
    }

    // ── Nodes ────────────────────────────────────────────────────

    /// Merge the entity's node and add its properties.
    ///
    /// Uses `+=` so properties missing from the record are left alone:
    /// this is a partial update, never a replacement.
    pub fn upsert_node(&self, entity: &dyn Entity) -> Result<Statement> {
        let urn = entity.urn();
        let label = self.label(urn);

        let mut props = entity.properties()?;
        // Implied by MERGE, and urns can be long.
        props.remove(PARAM_URN);

        let text = format!("MERGE (node:{label} {{urn: $urn}}) SET node += $properties RETURN node");
        let mut params = urn_params(PARAM_URN, urn);
        params.insert(PARAM_PROPERTIES.to_string(), PropertyValue::Map(props));

        Ok(Statement::new(Operation::UpsertNode { label }, text, params))
    }

    /// Delete the node along with every incident edge.
    pub fn delete_node(&self, urn: &Urn) -> Statement {
        let label = self.label(urn);
        let text = format!("MATCH (node:{label} {{urn: $urn}}) DETACH DELETE node");
        Statement::new(
            Operation::DeleteNode { label },
            text,
            urn_params(PARAM_URN, urn),
        )
    }

    /// Get the node for a urn, creating a property-less placeholder if absent.
    pub fn get_or_insert_node(&self, urn: &Urn) -> Statement {
        let label = self.label(urn);
        let text = format!("MERGE (node:{label} {{urn: $urn}}) RETURN node");
        Statement::new(
            Operation::MergeNode { label },
            text,
            urn_params(PARAM_URN, urn),
        )
    }

    // ── Edges ────────────────────────────────────────────────────

    /// Merge the relationship's edge and add its properties.
    ///
    /// Both endpoints must exist when this runs; [`Self::add_relationships`]
    /// places placeholder merges for them first.
    pub fn upsert_edge(&self, relationship: &dyn Relationship) -> Result<Statement> {
        let rel_type = relationship_label(relationship)?;
        let source_label = self.label(relationship.source());
        let destination_label = self.label(relationship.destination());

        let text = format!(
            "MATCH (source:{source_label} {{urn: $source_urn}}),\
             (destination:{destination_label} {{urn: $destination_urn}}) \
             MERGE (source)-[r:{rel_type}]->(destination) SET r += $properties"
        );
        let mut params = endpoint_params(relationship);
        params.insert(
            PARAM_PROPERTIES.to_string(),
            PropertyValue::Map(relationship.properties()?),
        );

        Ok(Statement::new(
            Operation::UpsertEdge {
                source_label,
                destination_label,
                relationship: rel_type.to_string(),
            },
            text,
            params,
        ))
    }

    /// Delete the edges matching this relationship.
    ///
    /// Matches on endpoints and label, plus equality on each declared filter
    /// field the relationship actually carries. Filter fields it does not
    /// carry are not constrained.
    pub fn delete_edge(&self, relationship: &dyn Relationship) -> Result<Statement> {
        let rel_type = relationship_label(relationship)?;
        let source_label = self.label(relationship.source());
        let destination_label = self.label(relationship.destination());

        let props = relationship.properties()?;
        let mut params = endpoint_params(relationship);
        let mut filter = Vec::new();

        let declared: BTreeSet<&str> = relationship.filter_fields().into_iter().collect();
        for field in declared {
            if !is_valid_identifier(field) {
                return Err(SchemaViolation::new(
                    rel_type,
                    format!("filter field '{field}' is not a valid identifier"),
                )
                .into());
            }
            if let Some(value) = props.get(field) {
                params.insert(format!("{FILTER_PARAM_PREFIX}{field}"), value.clone());
                filter.push(field.to_string());
            }
        }

        let criteria = if filter.is_empty() {
            String::new()
        } else {
            let pairs: Vec<String> = filter
                .iter()
                .map(|f| format!("{f}: ${FILTER_PARAM_PREFIX}{f}"))
                .collect();
            format!(" {{{}}}", pairs.join(", "))
        };

        let text = format!(
            "MATCH (source:{source_label} {{urn: $source_urn}})-[relation:{rel_type}{criteria}]->\
             (destination:{destination_label} {{urn: $destination_urn}}) DELETE relation"
        );

        Ok(Statement::new(
            Operation::DeleteEdge {
                source_label,
                destination_label,
                relationship: rel_type.to_string(),
                filter,
            },
            text,
            params,
        ))
    }

    /// Bulk delete required by `policy` before `relationships` are written.
    ///
    /// Returns `None` for [`RemovalPolicy::None`] or an empty batch. The
    /// delete is scoped to the first relationship's label; later records may
    /// carry other labels. Fails with `InconsistentBatch` when the
    /// relationships do not share the source/destination urn the policy
    /// scopes to.
    pub fn removal_statement<R: Relationship>(
        &self,
        policy: RemovalPolicy,
        relationships: &[R],
    ) -> Result<Option<Statement>> {
        let Some(first) = relationships.first() else {
            return Ok(None);
        };
        if policy == RemovalPolicy::None {
            return Ok(None);
        }

        let rel_type = relationship_label(first)?;
        if policy.requires_shared_source() {
            check_same(relationships, "source", first.source().as_str(), |r| {
                r.source().as_str()
            })?;
        }
        if policy.requires_shared_destination() {
            check_same(
                relationships,
                "destination",
                first.destination().as_str(),
                |r| r.destination().as_str(),
            )?;
        }

        let mut params = PropertyMap::new();
        let mut source_label = None;
        let mut destination_label = None;

        let source_pattern = if policy.requires_shared_source() {
            let label = self.label(first.source());
            params.insert(PARAM_SOURCE_URN.to_string(), first.source().into());
            let pattern = format!("(source:{label} {{urn: $source_urn}})");
            source_label = Some(label);
            pattern
        } else {
            "()".to_string()
        };
        let destination_pattern = if policy.requires_shared_destination() {
            let label = self.label(first.destination());
            params.insert(PARAM_DESTINATION_URN.to_string(), first.destination().into());
            let pattern = format!("(destination:{label} {{urn: $destination_urn}})");
            destination_label = Some(label);
            pattern
        } else {
            "()".to_string()
        };

        let text = format!(
            "MATCH {source_pattern}-[relation:{rel_type}]->{destination_pattern} DELETE relation"
        );

        Ok(Some(Statement::new(
            Operation::RemoveEdges {
                policy,
                source_label,
                destination_label,
                relationship: rel_type.to_string(),
            },
            text,
            params,
        )))
    }

    /// The full ordered batch for adding relationships: the removal
    /// statement (if any), then for each relationship a placeholder merge of
    /// its source and destination followed by the edge merge.
    pub fn add_relationships<R: Relationship>(
        &self,
        relationships: &[R],
        policy: RemovalPolicy,
    ) -> Result<Vec<Statement>> {
        let mut statements = Vec::with_capacity(relationships.len() * 3 + 1);

        if let Some(removal) = self.removal_statement(policy, relationships)? {
            statements.push(removal);
        }

        for relationship in relationships {
            statements.push(self.get_or_insert_node(relationship.source()));
            statements.push(self.get_or_insert_node(relationship.destination()));
            statements.push(self.upsert_edge(relationship)?);
        }

        Ok(statements)
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Every node with this urn under the label its type resolves to.
    pub fn match_nodes(&self, urn: &Urn) -> Statement {
        let label = self.label(urn);
        let text = format!("MATCH (node:{label} {{urn: $urn}}) RETURN properties(node) AS props");
        Statement::new(
            Operation::MatchNodes { label },
            text,
            urn_params(PARAM_URN, urn),
        )
    }

    /// Edges of the relationship's label between its two endpoints.
    pub fn match_edges(&self, relationship: &dyn Relationship) -> Result<Statement> {
        let rel_type = relationship_label(relationship)?;
        let source_label = self.label(relationship.source());
        let destination_label = self.label(relationship.destination());

        let text = format!(
            "MATCH (source:{source_label} {{urn: $source_urn}})-[r:{rel_type}]->\
             (destination:{destination_label} {{urn: $destination_urn}}) RETURN properties(r) AS props"
        );

        Ok(Statement::new(
            Operation::MatchEdges {
                source_label,
                destination_label,
                relationship: rel_type.to_string(),
            },
            text,
            endpoint_params(relationship),
        ))
    }

    /// Edges of a label leaving a source node.
    pub fn match_edges_from_source(&self, source: &Urn, rel_type: &str) -> Result<Statement> {
        if !is_valid_identifier(rel_type) {
            return Err(SchemaViolation::new(rel_type, "relationship label is not a valid identifier").into());
        }
        let source_label = self.label(source);
        let text = format!(
            "MATCH (source:{source_label} {{urn: $source_urn}})-[r:{rel_type}]->() RETURN properties(r) AS props"
        );

        Ok(Statement::new(
            Operation::MatchEdgesFromSource {
                source_label,
                relationship: rel_type.to_string(),
            },
            text,
            urn_params(PARAM_SOURCE_URN, source),
        ))
    }
}

/// Whether `s` can be interpolated into Cypher as a label or property key.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn relationship_label(relationship: &dyn Relationship) -> Result<&str> {
    let label = relationship.label();
    if is_valid_identifier(label) {
        Ok(label)
    } else {
        Err(SchemaViolation::new(label, "relationship label is not a valid identifier").into())
    }
}

fn urn_params(name: &str, urn: &Urn) -> PropertyMap {
    let mut params = PropertyMap::new();
    params.insert(name.to_string(), urn.into());
    params
}

fn endpoint_params(relationship: &dyn Relationship) -> PropertyMap {
    let mut params = urn_params(PARAM_SOURCE_URN, relationship.source());
    params.insert(
        PARAM_DESTINATION_URN.to_string(),
        relationship.destination().into(),
    );
    params
}

fn check_same<R, F>(records: &[R], field: &'static str, expected: &str, get: F) -> Result<()>
where
    F: Fn(&R) -> &str,
{
    match records.iter().map(get).find(|found| *found != expected) {
        Some(found) => Err(GraphError::InconsistentBatch {
            field,
            expected: expected.to_string(),
            found: found.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metagraph_core::{EntityDescriptor, GenericEntity, GenericRelationship};

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

    fn person(key: &str, props: serde_json::Value) -> GenericEntity {
        GenericEntity {
            urn: urn(&format!("urn:li:person:{key}")),
            properties: serde_json::from_value(props).unwrap(),
        }
    }

    fn works_at(source: &str, destination: &str, props: serde_json::Value) -> GenericRelationship {
        GenericRelationship {
            label: "WORKS_AT".to_string(),
            source: urn(source),
            destination: urn(destination),
            properties: serde_json::from_value(props).unwrap(),
            filter_fields: vec!["role".to_string()],
        }
    }

    #[test]
    fn upsert_node_merges_by_urn() {
        let registry = registry();
        let builder = StatementBuilder::new(&registry);
        let entity = person(
            "u1",
            serde_json::json!({"urn": "urn:li:person:u1", "name": "Ada"}),
        );

        let statement = builder.upsert_node(&entity).unwrap();
        assert_eq!(
            statement.text(),
            "MERGE (node:Person {urn: $urn}) SET node += $properties RETURN node"
        );
        assert_eq!(
            statement.param("urn").and_then(PropertyValue::as_str),
            Some("urn:li:person:u1")
        );
        let Some(PropertyValue::Map(props)) = statement.param("properties") else {
            panic!("properties must be a map");
        };
        assert!(!props.contains_key("urn"), "urn is the merge key, not a property");
        assert_eq!(props["name"].as_str(), Some("Ada"));
        assert_eq!(
            statement.operation(),
            &Operation::UpsertNode {
                label: "Person".to_string()
            }
        );
    }

    #[test]
    fn values_are_never_interpolated() {
        let registry = registry();
        let builder = StatementBuilder::new(&registry);
        let hostile = "x'}) DETACH DELETE node //";
        let entity = person("u1", serde_json::json!({"name": hostile}));
        let rel = works_at(
            "urn:li:person:u1",
            "urn:li:company:c1",
            serde_json::json!({"role": hostile}),
        );

        for statement in [
            builder.upsert_node(&entity).unwrap(),
            builder.upsert_edge(&rel).unwrap(),
            builder.delete_edge(&rel).unwrap(),
        ] {
            assert!(!statement.text().contains(hostile));
            assert!(!statement.text().contains("urn:li:"));
        }
    }

    #[test]
    fn delete_node_detaches() {
        let registry = registry();
        let statement = StatementBuilder::new(&registry).delete_node(&urn("urn:li:person:u1"));
        assert_eq!(
            statement.text(),
            "MATCH (node:Person {urn: $urn}) DETACH DELETE node"
        );
    }

    #[test]
    fn placeholder_has_no_property_payload() {
        let registry = registry();
        let statement =
            StatementBuilder::new(&registry).get_or_insert_node(&urn("urn:li:company:c1"));
        assert_eq!(statement.text(), "MERGE (node:Company {urn: $urn}) RETURN node");
        assert_eq!(statement.params().len(), 1);
    }

    #[test]
    fn unknown_type_still_builds() {
        let registry = registry();
        let statement = StatementBuilder::new(&registry).delete_node(&urn("urn:li:chart:c1"));
        assert_eq!(
            statement.text(),
            "MATCH (node:UNKNOWN {urn: $urn}) DETACH DELETE node"
        );
    }

    #[test]
    fn upsert_edge_template() {
        let registry = registry();
        let rel = works_at(
            "urn:li:person:u1",
            "urn:li:company:c1",
            serde_json::json!({"role": "engineer"}),
        );
        let statement = StatementBuilder::new(&registry).upsert_edge(&rel).unwrap();
        assert_eq!(
            statement.text(),
            "MATCH (source:Person {urn: $source_urn}),(destination:Company {urn: $destination_urn}) \
             MERGE (source)-[r:WORKS_AT]->(destination) SET r += $properties"
        );
        assert_eq!(
            statement.param("destination_urn").and_then(PropertyValue::as_str),
            Some("urn:li:company:c1")
        );
    }

    #[test]
    fn delete_edge_filters_on_declared_fields() {
        let registry = registry();
        let rel = works_at(
            "urn:li:person:u1",
            "urn:li:company:c1",
            serde_json::json!({"role": "engineer", "since": 2020}),
        );
        let statement = StatementBuilder::new(&registry).delete_edge(&rel).unwrap();
        assert_eq!(
            statement.text(),
            "MATCH (source:Person {urn: $source_urn})-[relation:WORKS_AT {role: $filter_role}]->\
             (destination:Company {urn: $destination_urn}) DELETE relation"
        );
        assert_eq!(
            statement.param("filter_role").and_then(PropertyValue::as_str),
            Some("engineer")
        );
        assert!(statement.param("filter_since").is_none());
    }

    #[test]
    fn delete_edge_without_present_filters_matches_label_only() {
        let registry = registry();
        let rel = works_at("urn:li:person:u1", "urn:li:company:c1", serde_json::json!({}));
        let statement = StatementBuilder::new(&registry).delete_edge(&rel).unwrap();
        assert!(statement.text().contains("-[relation:WORKS_AT]->"));
        let Operation::DeleteEdge { filter, .. } = statement.operation() else {
            panic!("expected DeleteEdge");
        };
        assert!(filter.is_empty());
    }

    #[test]
    fn bad_filter_field_is_a_schema_violation() {
        let registry = registry();
        let mut rel = works_at("urn:li:person:u1", "urn:li:company:c1", serde_json::json!({}));
        rel.filter_fields = vec!["role}) DELETE x //".to_string()];
        let err = StatementBuilder::new(&registry).delete_edge(&rel).unwrap_err();
        assert!(matches!(err, GraphError::SchemaViolation(_)));
    }

    #[test]
    fn removal_none_and_empty_emit_nothing() {
        let registry = registry();
        let builder = StatementBuilder::new(&registry);
        let rels = vec![works_at("urn:li:person:u1", "urn:li:company:c1", serde_json::json!({}))];
        assert!(builder
            .removal_statement(RemovalPolicy::None, &rels)
            .unwrap()
            .is_none());
        let empty: Vec<GenericRelationship> = Vec::new();
        assert!(builder
            .removal_statement(RemovalPolicy::RemoveAllFromSource, &empty)
            .unwrap()
            .is_none());
    }

    #[test]
    fn removal_templates_per_policy() {
        let registry = registry();
        let builder = StatementBuilder::new(&registry);
        let rels = vec![works_at("urn:li:person:u1", "urn:li:company:c1", serde_json::json!({}))];

        let from_source = builder
            .removal_statement(RemovalPolicy::RemoveAllFromSource, &rels)
            .unwrap()
            .unwrap();
        assert_eq!(
            from_source.text(),
            "MATCH (source:Person {urn: $source_urn})-[relation:WORKS_AT]->() DELETE relation"
        );
        assert!(from_source.param("destination_urn").is_none());

        let to_destination = builder
            .removal_statement(RemovalPolicy::RemoveAllToDestination, &rels)
            .unwrap()
            .unwrap();
        assert_eq!(
            to_destination.text(),
            "MATCH ()-[relation:WORKS_AT]->(destination:Company {urn: $destination_urn}) DELETE relation"
        );

        let pair = builder
            .removal_statement(RemovalPolicy::RemoveAllFromSourceToDestination, &rels)
            .unwrap()
            .unwrap();
        assert_eq!(
            pair.text(),
            "MATCH (source:Person {urn: $source_urn})-[relation:WORKS_AT]->\
             (destination:Company {urn: $destination_urn}) DELETE relation"
        );
        assert_eq!(pair.params().len(), 2);
    }

    #[test]
    fn removal_rejects_mixed_destinations() {
        let registry = registry();
        let builder = StatementBuilder::new(&registry);
        let rels = vec![
            works_at("urn:li:person:u1", "urn:li:company:c1", serde_json::json!({})),
            works_at("urn:li:person:u1", "urn:li:company:c2", serde_json::json!({})),
        ];

        // Same source, so a source-scoped removal is fine.
        assert!(builder
            .removal_statement(RemovalPolicy::RemoveAllFromSource, &rels)
            .is_ok());

        let err = builder
            .removal_statement(RemovalPolicy::RemoveAllFromSourceToDestination, &rels)
            .unwrap_err();
        match err {
            GraphError::InconsistentBatch {
                field,
                expected,
                found,
            } => {
                assert_eq!(field, "destination");
                assert_eq!(expected, "urn:li:company:c1");
                assert_eq!(found, "urn:li:company:c2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn removal_rejects_mixed_sources() {
        let registry = registry();
        let rels = vec![
            works_at("urn:li:person:u1", "urn:li:company:c1", serde_json::json!({})),
            works_at("urn:li:person:u2", "urn:li:company:c1", serde_json::json!({})),
        ];
        let err = StatementBuilder::new(&registry)
            .removal_statement(RemovalPolicy::RemoveAllFromSource, &rels)
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::InconsistentBatch {
                field: "source",
                ..
            }
        ));
    }

    #[test]
    fn removal_uses_first_label_for_mixed_labels() {
        let registry = registry();
        let mut owns = works_at("urn:li:person:u1", "urn:li:company:c2", serde_json::json!({}));
        owns.label = "OWNS".to_string();
        let rels = vec![
            works_at("urn:li:person:u1", "urn:li:company:c1", serde_json::json!({})),
            owns,
        ];

        let removal = StatementBuilder::new(&registry)
            .removal_statement(RemovalPolicy::RemoveAllFromSource, &rels)
            .unwrap()
            .unwrap();
        assert_eq!(
            removal.text(),
            "MATCH (source:Person {urn: $source_urn})-[relation:WORKS_AT]->() DELETE relation"
        );
    }

    #[test]
    fn add_relationships_orders_batch() {
        let registry = registry();
        let rels = vec![
            works_at("urn:li:person:u1", "urn:li:company:c1", serde_json::json!({})),
            works_at("urn:li:person:u1", "urn:li:company:c2", serde_json::json!({})),
        ];
        let batch = StatementBuilder::new(&registry)
            .add_relationships(&rels, RemovalPolicy::RemoveAllFromSource)
            .unwrap();

        let kinds: Vec<&str> = batch
            .iter()
            .map(|s| match s.operation() {
                Operation::RemoveEdges { .. } => "remove",
                Operation::MergeNode { .. } => "merge_node",
                Operation::UpsertEdge { .. } => "upsert_edge",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "remove",
                "merge_node",
                "merge_node",
                "upsert_edge",
                "merge_node",
                "merge_node",
                "upsert_edge"
            ]
        );
    }

    #[test]
    fn identifier_rules() {
        assert!(is_valid_identifier("WORKS_AT"));
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("CorpUser2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("has space"));
        assert!(!is_valid_identifier("a-b"));
    }
}
