//! Schema derivation
//!
//! Derives the relational shape of one graph (schema, root table, one table per collector
//! nodegroup, one column per mapped member node, lookup tables) and emits it as DDL.
//!
//! Derivation and emission are separate steps: [`SchemaDeriver::derive`] only reads the
//! graph and the vocabulary, and the resulting [`GraphSchema`] is what the data
//! materializer uses to address tables and columns.

use crate::export::ExportError;
use crate::export::naming::NameResolver;
use crate::export::sql::{self, ColumnDef, ForeignKey, Phase, SqlScript};
use crate::model::DataSource;
use crate::models::localized::DEFAULT_LANGUAGE;
use crate::models::{Cardinality, Datatype, Graph, LocalizedString, LookupEntry, Node, RelationalType};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

/// Column holding the legacy identifier of a resource instance
pub const LEGACY_ID_COLUMN: &str = "legacy_id";
/// Key column of lookup tables
pub const LOOKUP_KEY_COLUMN: &str = "id";
/// Label column of lookup tables
pub const LOOKUP_LABEL_COLUMN: &str = "label";

/// Per-column table of the values a lookup node may take
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LookupTable {
    pub name: String,
    pub entries: Vec<LookupEntry>,
}

/// Column derived from a member node
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DerivedColumn {
    pub node_id: Uuid,
    pub node_name: String,
    pub datatype: Datatype,
    pub name: String,
    pub relational_type: RelationalType,
    pub lookup: Option<LookupTable>,
}

/// Table a derived table points back to
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParentLink {
    /// Parent nodegroup, `None` when the parent is the root table
    pub nodegroup_id: Option<Uuid>,
    pub table: String,
    /// Foreign key column, named after the parent's key column
    pub column: String,
}

/// Table derived from a collector nodegroup
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DerivedTable {
    pub nodegroup_id: Uuid,
    /// Name of the collector node
    pub nodegroup_name: String,
    pub cardinality: Cardinality,
    pub name: String,
    pub key_column: String,
    pub parent: ParentLink,
    pub columns: Vec<DerivedColumn>,
}

impl DerivedTable {
    /// Whether the nodegroup nests under another nodegroup
    pub fn has_parent_nodegroup(&self) -> bool {
        self.parent.nodegroup_id.is_some()
    }
}

/// Relational shape of one graph
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphSchema {
    pub graph_id: Uuid,
    pub graph_name: String,
    pub schema: String,
    pub root_table: String,
    pub root_key: String,
    pub tables: Vec<DerivedTable>,
}

impl GraphSchema {
    pub fn table(&self, nodegroup_id: Uuid) -> Option<&DerivedTable> {
        self.tables.iter().find(|t| t.nodegroup_id == nodegroup_id)
    }

    /// Every lookup table with the column it belongs to
    pub fn lookup_tables(&self) -> impl Iterator<Item = (&DerivedTable, &DerivedColumn, &LookupTable)> {
        self.tables.iter().flat_map(|table| {
            table
                .columns
                .iter()
                .filter_map(move |column| column.lookup.as_ref().map(|lookup| (table, column, lookup)))
        })
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }
}

/// Table recording which graph, nodegroup and node every derived column came from
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryTable {
    pub schema: String,
    pub table: String,
}

impl RegistryTable {
    const COLUMNS: [(&'static str, &'static str); 13] = [
        ("graph_id", "UUID"),
        ("graph_name", "TEXT"),
        ("nodegroup_id", "UUID"),
        ("nodegroup_name", "TEXT"),
        ("cardinality", "TEXT"),
        ("node_id", "UUID"),
        ("node_name", "TEXT"),
        ("datatype", "TEXT"),
        ("schema_name", "TEXT"),
        ("table_name", "TEXT"),
        ("column_name", "TEXT"),
        ("column_type", "TEXT"),
        ("lookup_table", "TEXT"),
    ];

    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Drop and recreate the registry; done once per run
    pub fn emit_table(&self, script: &mut SqlScript) {
        let columns: Vec<ColumnDef> = Self::COLUMNS
            .iter()
            .map(|(name, sql_type)| ColumnDef::new(*name, *sql_type))
            .collect();
        script.push(
            Phase::Tables,
            format!("CREATE SCHEMA IF NOT EXISTS {};", sql::quote_identifier(&self.schema)),
        );
        script.push(Phase::Tables, sql::drop_table(&self.schema, &self.table));
        script.push(Phase::Tables, sql::create_table(&self.schema, &self.table, &columns));
    }

    /// One row per derived column of a graph
    pub fn emit_rows(&self, schema: &GraphSchema, script: &mut SqlScript) {
        let names: Vec<&str> = Self::COLUMNS.iter().map(|(name, _)| *name).collect();
        for table in &schema.tables {
            for column in &table.columns {
                let lookup = column
                    .lookup
                    .as_ref()
                    .map(|l| sql::quote_literal(&l.name))
                    .unwrap_or_else(|| "NULL".to_string());
                let values = vec![
                    sql::uuid_literal(schema.graph_id),
                    sql::quote_literal(&schema.graph_name),
                    sql::uuid_literal(table.nodegroup_id),
                    sql::quote_literal(&table.nodegroup_name),
                    sql::quote_literal(table.cardinality.as_str()),
                    sql::uuid_literal(column.node_id),
                    sql::quote_literal(&column.node_name),
                    sql::quote_literal(column.datatype.tag()),
                    sql::quote_literal(&schema.schema),
                    sql::quote_literal(&table.name),
                    sql::quote_literal(&column.name),
                    sql::quote_literal(column.relational_type.as_sql()),
                    lookup,
                ];
                script.push(
                    Phase::Data,
                    sql::insert(&self.schema, &self.table, &names, &values),
                );
            }
        }
    }
}

/// Derives and emits the relational schema of graphs
pub struct SchemaDeriver<'a, S: DataSource + ?Sized> {
    source: &'a S,
    names: NameResolver,
    language: String,
}

impl<'a, S: DataSource + ?Sized> SchemaDeriver<'a, S> {
    pub fn new(source: &'a S, names: NameResolver) -> Self {
        Self {
            source,
            names,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Language used for graph names and option labels
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Derive the relational shape of a graph
    pub fn derive(&self, graph: &Graph) -> Result<GraphSchema, ExportError> {
        let top_node = graph.top_node().ok_or(ExportError::MissingTopNode(graph.id))?;
        let root_table = self.names.slug(&top_node.name);
        let root_key = self.names.key_column(&root_table);

        let mut tables = Vec::new();
        for collector in graph.collector_nodes() {
            tables.push(self.derive_table(graph, collector, &root_table)?);
        }

        let schema = GraphSchema {
            graph_id: graph.id,
            graph_name: graph.name.resolve(&self.language, DEFAULT_LANGUAGE).to_string(),
            schema: root_table.clone(),
            root_table,
            root_key,
            tables,
        };

        info!(
            "Derived schema {} for graph {}: {} tables, {} columns",
            schema.schema,
            graph.id,
            schema.tables.len(),
            schema.column_count()
        );
        Ok(schema)
    }

    fn derive_table(
        &self,
        graph: &Graph,
        collector: &Node,
        root_table: &str,
    ) -> Result<DerivedTable, ExportError> {
        let nodegroup_id = collector.id;
        let nodegroup = graph
            .nodegroup(nodegroup_id)
            .ok_or(ExportError::UnknownNodegroup(nodegroup_id))?;
        let name = self.names.qualify(graph, collector)?;
        let key_column = self.names.key_column(&name);

        let parent = match nodegroup.parent_id {
            Some(parent_id) => {
                let parent_collector = graph
                    .collector_node(parent_id)
                    .ok_or(ExportError::MissingCollector(parent_id))?;
                let table = self.names.qualify(graph, parent_collector)?;
                ParentLink {
                    nodegroup_id: Some(parent_id),
                    column: self.names.key_column(&table),
                    table,
                }
            }
            None => ParentLink {
                nodegroup_id: None,
                table: root_table.to_string(),
                column: self.names.key_column(root_table),
            },
        };

        let mut columns = Vec::new();
        for member in graph.member_nodes(nodegroup_id) {
            let Some(relational_type) = member.datatype.relational_type() else {
                debug!(
                    "Skipping node {} ({}): no relational mapping for {}",
                    member.name, member.id, member.datatype
                );
                continue;
            };
            let column_name = self.names.slug(&member.name);
            let lookup = if member.datatype.is_lookup() {
                Some(LookupTable {
                    name: self.names.lookup_table(&name, &column_name),
                    entries: self.lookup_entries(member)?,
                })
            } else {
                None
            };
            columns.push(DerivedColumn {
                node_id: member.id,
                node_name: member.name.clone(),
                datatype: member.datatype.clone(),
                name: column_name,
                relational_type,
                lookup,
            });
        }

        debug!("Derived table {} with {} columns", name, columns.len());
        Ok(DerivedTable {
            nodegroup_id,
            nodegroup_name: collector.name.clone(),
            cardinality: nodegroup.cardinality,
            name,
            key_column,
            parent,
            columns,
        })
    }

    /// Values a lookup node may take, deduplicated, grouping entries removed
    fn lookup_entries(&self, node: &Node) -> Result<Vec<LookupEntry>, ExportError> {
        let missing = || ExportError::MissingConfiguration {
            node_id: node.id,
            datatype: node.datatype.tag().to_string(),
        };

        let candidates = if node.datatype.is_concept() {
            let collection_id = node.rdm_collection().ok_or_else(missing)?;
            self.source
                .collection_entries(collection_id)
                .ok_or(ExportError::UnknownCollection {
                    node_id: node.id,
                    collection_id,
                })?
        } else {
            let options = node.domain_options().ok_or_else(missing)?;
            let mut entries = Vec::with_capacity(options.len());
            for option in options {
                let id = option
                    .get("id")
                    .and_then(Value::as_str)
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .ok_or_else(missing)?;
                let label = option
                    .get("text")
                    .and_then(|text| LocalizedString::from_value(text, &self.language))
                    .map(|text| text.resolve(&self.language, DEFAULT_LANGUAGE).to_string())
                    .unwrap_or_default();
                entries.push(LookupEntry::new(id, label));
            }
            entries
        };

        let mut seen = HashSet::new();
        Ok(candidates
            .into_iter()
            .filter(|entry| !entry.collector && seen.insert(entry.id))
            .collect())
    }

    /// Emit the DDL of a derived graph, lookup table rows included
    pub fn emit(&self, schema: &GraphSchema, script: &mut SqlScript) {
        let s = schema.schema.as_str();

        script.push(Phase::Tables, sql::drop_schema(s));
        script.push(Phase::Tables, sql::create_schema(s));
        script.push(
            Phase::Tables,
            sql::create_table(
                s,
                &schema.root_table,
                &[
                    ColumnDef::new(&schema.root_key, "UUID").primary_key(),
                    ColumnDef::new(LEGACY_ID_COLUMN, "TEXT"),
                ],
            ),
        );
        script.push(
            Phase::Tables,
            sql::comment_on_table(s, &schema.root_table, &schema.graph_id.to_string()),
        );

        for table in &schema.tables {
            self.emit_table(s, table, script);
        }

        for (_, _, lookup) in schema.lookup_tables() {
            emit_lookup_table(s, lookup, script);
        }
    }

    fn emit_table(&self, s: &str, table: &DerivedTable, script: &mut SqlScript) {
        script.push(
            Phase::Tables,
            sql::create_table(
                s,
                &table.name,
                &[
                    ColumnDef::new(&table.key_column, "UUID").primary_key(),
                    ColumnDef::new(&table.parent.column, "UUID"),
                ],
            ),
        );
        script.push(
            Phase::Tables,
            sql::comment_on_table(s, &table.name, &table.nodegroup_id.to_string()),
        );

        for column in &table.columns {
            script.push(
                Phase::Columns,
                sql::add_column(s, &table.name, &column.name, column.relational_type.as_sql()),
            );
            script.push(
                Phase::Columns,
                sql::comment_on_column(s, &table.name, &column.name, &column.node_id.to_string()),
            );
            if column.relational_type == RelationalType::Geometry {
                let index = self.names.spatial_index(&table.name, &column.name);
                script.push(
                    Phase::Columns,
                    sql::create_spatial_index(s, &table.name, &index, &column.name),
                );
            }
            // Array columns cannot reference the lookup table
            if let Some(lookup) = &column.lookup {
                if column.relational_type == RelationalType::Uuid {
                    let name = self.names.foreign_key(&column.name);
                    script.push(
                        Phase::Constraints,
                        sql::add_foreign_key(
                            s,
                            &table.name,
                            &ForeignKey {
                                name: &name,
                                column: &column.name,
                                ref_schema: s,
                                ref_table: &lookup.name,
                                ref_column: LOOKUP_KEY_COLUMN,
                            },
                        ),
                    );
                }
            }
        }

        // The link column is named after the parent's key column
        let name = self.names.foreign_key(&table.parent.column);
        script.push(
            Phase::Constraints,
            sql::add_foreign_key(
                s,
                &table.name,
                &ForeignKey {
                    name: &name,
                    column: &table.parent.column,
                    ref_schema: s,
                    ref_table: &table.parent.table,
                    ref_column: &table.parent.column,
                },
            ),
        );
    }
}

fn emit_lookup_table(s: &str, lookup: &LookupTable, script: &mut SqlScript) {
    script.push(
        Phase::Tables,
        sql::create_table(
            s,
            &lookup.name,
            &[
                ColumnDef::new(LOOKUP_KEY_COLUMN, "UUID").primary_key(),
                ColumnDef::new(LOOKUP_LABEL_COLUMN, "TEXT"),
            ],
        ),
    );
    for entry in &lookup.entries {
        script.push(
            Phase::Data,
            sql::insert(
                s,
                &lookup.name,
                &[LOOKUP_KEY_COLUMN, LOOKUP_LABEL_COLUMN],
                &[sql::uuid_literal(entry.id), sql::quote_literal(&entry.label)],
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PackageSource;
    use crate::models::{ArchesPackage, Collection, NodeGroup};
    use serde_json::json;

    fn graph_with_concept(collection_id: Uuid) -> Graph {
        let mut graph = Graph::new(Uuid::new_v4(), "Monument");
        let mut top = Node::new(Uuid::new_v4(), "Monument", Datatype::Semantic, None);
        top.is_top_node = true;
        graph.nodes.push(top);

        let ng = Uuid::new_v4();
        graph.nodegroups.push(NodeGroup::new(ng, None));
        let mut material = Node::new(ng, "Material", Datatype::Concept, Some(ng));
        material.config = json!({"rdmCollection": collection_id.to_string()});
        graph.nodes.push(material);
        graph
    }

    #[test]
    fn test_concept_lookup_skips_collectors_and_duplicates() {
        let collection_id = Uuid::new_v4();
        let brick = LookupEntry::new(Uuid::new_v4(), "Brick");
        let mut heading = LookupEntry::new(Uuid::new_v4(), "Masonry");
        heading.collector = true;

        let mut package = ArchesPackage::default();
        package.graphs.push(graph_with_concept(collection_id));
        package.collections.push(Collection {
            id: collection_id,
            label: None,
            entries: vec![heading, brick.clone(), brick.clone()],
        });
        let source = PackageSource::new(package);

        let deriver = SchemaDeriver::new(&source, NameResolver::default());
        let schema = deriver.derive(&source.graphs()[0]).unwrap();
        let (_, column, lookup) = schema.lookup_tables().next().unwrap();
        assert_eq!(column.relational_type, RelationalType::Uuid);
        assert_eq!(lookup.name, "dom_material_material");
        assert_eq!(lookup.entries, vec![brick]);
    }

    #[test]
    fn test_unknown_collection() {
        let mut package = ArchesPackage::default();
        package.graphs.push(graph_with_concept(Uuid::new_v4()));
        let source = PackageSource::new(package);

        let deriver = SchemaDeriver::new(&source, NameResolver::default());
        let result = deriver.derive(&source.graphs()[0]);
        assert!(matches!(result, Err(ExportError::UnknownCollection { .. })));
    }

    #[test]
    fn test_domain_options_need_configuration() {
        let mut graph = graph_with_concept(Uuid::new_v4());
        graph.nodes[1].datatype = Datatype::DomainValue;
        graph.nodes[1].config = Value::Null;
        let mut package = ArchesPackage::default();
        package.graphs.push(graph);
        let source = PackageSource::new(package);

        let deriver = SchemaDeriver::new(&source, NameResolver::default());
        let result = deriver.derive(&source.graphs()[0]);
        assert!(matches!(result, Err(ExportError::MissingConfiguration { .. })));
    }

    #[test]
    fn test_domain_option_labels_are_localized() {
        let mut graph = graph_with_concept(Uuid::new_v4());
        let option_id = Uuid::new_v4();
        graph.nodes[1].datatype = Datatype::DomainValueList;
        graph.nodes[1].config = json!({"options": [
            {"id": option_id.to_string(), "text": {"en": "Good", "de": "Gut"}, "selected": false}
        ]});
        let mut package = ArchesPackage::default();
        package.graphs.push(graph);
        let source = PackageSource::new(package);

        let deriver = SchemaDeriver::new(&source, NameResolver::default()).with_language("de");
        let schema = deriver.derive(&source.graphs()[0]).unwrap();
        let (_, column, lookup) = schema.lookup_tables().next().unwrap();
        assert_eq!(column.relational_type, RelationalType::UuidArray);
        assert_eq!(lookup.entries[0].label, "Gut");

        let mut script = SqlScript::new();
        deriver.emit(&schema, &mut script);
        // List columns carry no lookup foreign key, only the parent link
        assert_eq!(script.statements(Phase::Constraints).len(), 1);
    }
}
