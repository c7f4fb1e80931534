//! Relational export of a whole package
//!
//! Runs the schema deriver and data materializer over every selected graph and collects
//! their statements into one [`SqlScript`].

use crate::export::data::{DEFAULT_SRID, DataMaterializer, MaterializeStats};
use crate::export::naming::{DEFAULT_MAX_IDENTIFIER_LENGTH, NameResolver};
use crate::export::schema::{GraphSchema, RegistryTable, SchemaDeriver};
use crate::export::sql::SqlScript;
use crate::export::{ExportError, ExportResult};
use crate::model::DataSource;
use crate::models::Graph;
use crate::models::localized::DEFAULT_LANGUAGE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// The Arches system settings model, never exported
pub const SYSTEM_SETTINGS_GRAPH_ID: Uuid = Uuid::from_u128(0xff623370_fa12_11e6_b98b_6c4008b05c4c);

/// Longest identifier PostgreSQL keeps without truncation
pub const POSTGRES_IDENTIFIER_LIMIT: usize = 63;

pub const DEFAULT_REGISTRY_SCHEMA: &str = "public";
pub const DEFAULT_REGISTRY_TABLE: &str = "__arches_relational_registry";

/// Options for a relational export
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportOptions {
    /// Upper bound for generated identifiers, before the `_id` suffix of key columns
    pub max_identifier_length: usize,
    /// Spatial reference assigned to stored geometries
    pub srid: u32,
    /// Preferred language for localized text
    pub language: String,
    pub registry_schema: String,
    pub registry_table: String,
    /// Graphs never exported
    pub excluded_graphs: Vec<Uuid>,
    /// Export only these graphs when set
    pub graphs: Option<Vec<Uuid>>,
    /// Emit inserts and updates; schema only when false
    pub include_data: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            max_identifier_length: DEFAULT_MAX_IDENTIFIER_LENGTH,
            srid: DEFAULT_SRID,
            language: DEFAULT_LANGUAGE.to_string(),
            registry_schema: DEFAULT_REGISTRY_SCHEMA.to_string(),
            registry_table: DEFAULT_REGISTRY_TABLE.to_string(),
            excluded_graphs: vec![SYSTEM_SETTINGS_GRAPH_ID],
            graphs: None,
            include_data: true,
        }
    }
}

impl ExportOptions {
    /// Check the options before any SQL is generated
    pub fn validate(&self) -> Result<(), ExportError> {
        // Room for the "_id" suffix of key columns
        let limit = POSTGRES_IDENTIFIER_LIMIT - 3;
        if self.max_identifier_length == 0 || self.max_identifier_length > limit {
            return Err(ExportError::ValidationError(format!(
                "identifier length must be between 1 and {}, got {}",
                limit, self.max_identifier_length
            )));
        }
        if self.registry_schema.trim().is_empty() || self.registry_table.trim().is_empty() {
            return Err(ExportError::ValidationError(
                "registry schema and table must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn selects(&self, graph: &Graph) -> bool {
        if !graph.is_resource || self.excluded_graphs.contains(&graph.id) {
            return false;
        }
        match &self.graphs {
            Some(ids) => ids.contains(&graph.id),
            None => true,
        }
    }
}

/// Output of a relational export
#[derive(Debug, Clone)]
pub struct RelationalExport {
    pub script: SqlScript,
    pub schemas: Vec<GraphSchema>,
    pub stats: MaterializeStats,
}

impl RelationalExport {
    pub fn render(&self) -> String {
        self.script.render()
    }

    /// Rendered script with a generation header
    pub fn into_result(self) -> ExportResult {
        let header = format!(
            "-- Generated by arches-relational {} at {}\n-- Graphs: {}\n\n",
            env!("CARGO_PKG_VERSION"),
            chrono::Utc::now().to_rfc3339(),
            self.schemas.len()
        );
        ExportResult {
            content: header + &self.script.render(),
            format: "sql".to_string(),
        }
    }
}

/// Exports every selected graph of a data source to SQL
pub struct RelationalExporter<'a, S: DataSource + ?Sized> {
    source: &'a S,
    options: ExportOptions,
}

impl<'a, S: DataSource + ?Sized> RelationalExporter<'a, S> {
    pub fn new(source: &'a S, options: ExportOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Resource graphs to export, in source order
    pub fn selected_graphs(&self) -> Vec<&'a Graph> {
        self.source
            .graphs()
            .iter()
            .filter(|graph| self.options.selects(graph))
            .collect()
    }

    /// Derive and materialize every selected graph.
    ///
    /// The registry table is recreated once, ahead of all graph schemas. Any error aborts
    /// the whole export and no script is returned.
    pub fn export(&self) -> Result<RelationalExport, ExportError> {
        self.options.validate()?;

        let names = NameResolver::new(self.options.max_identifier_length);
        let deriver =
            SchemaDeriver::new(self.source, names).with_language(self.options.language.clone());
        let materializer = DataMaterializer::new(self.source)
            .with_srid(self.options.srid)
            .with_language(self.options.language.clone());
        let registry = RegistryTable::new(
            self.options.registry_schema.clone(),
            self.options.registry_table.clone(),
        );

        let mut script = SqlScript::new();
        let mut schemas = Vec::new();
        let mut stats = MaterializeStats::default();

        registry.emit_table(&mut script);

        for graph in self.selected_graphs() {
            debug!("Exporting graph {} ({})", graph.name.text(), graph.id);
            let schema = deriver.derive(graph)?;
            // Graph schemas are dropped with CASCADE, so the registry must live elsewhere
            if schema.schema == self.options.registry_schema {
                return Err(ExportError::ValidationError(format!(
                    "graph {} derives schema \"{}\", which holds the registry table",
                    graph.id, schema.schema
                )));
            }
            deriver.emit(&schema, &mut script);
            registry.emit_rows(&schema, &mut script);
            if self.options.include_data {
                stats.merge(materializer.materialize(&schema, &mut script)?);
            }
            schemas.push(schema);
        }

        info!(
            "Exported {} graphs: {} statements, {} resources, {} tiles",
            schemas.len(),
            script.len(),
            stats.resources,
            stats.tiles
        );

        Ok(RelationalExport {
            script,
            schemas,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PackageSource;
    use crate::models::ArchesPackage;

    #[test]
    fn test_default_excludes_system_settings() {
        let mut package = ArchesPackage::default();
        package.graphs.push(Graph::new(SYSTEM_SETTINGS_GRAPH_ID, "System Settings"));
        let mut branch = Graph::new(Uuid::new_v4(), "Branch");
        branch.is_resource = false;
        package.graphs.push(branch);
        let source = PackageSource::new(package);

        let exporter = RelationalExporter::new(&source, ExportOptions::default());
        assert!(exporter.selected_graphs().is_empty());
    }

    #[test]
    fn test_identifier_length_is_bounded() {
        let options = ExportOptions {
            max_identifier_length: 61,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(ExportError::ValidationError(_))));
        assert!(ExportOptions::default().validate().is_ok());
    }

    #[test]
    fn test_empty_source_still_recreates_registry() {
        let source = PackageSource::new(ArchesPackage::default());
        let export = RelationalExporter::new(&source, ExportOptions::default())
            .export()
            .unwrap();
        assert!(export.schemas.is_empty());
        assert!(export.render().contains("\"__arches_relational_registry\""));

        let result = export.into_result();
        assert_eq!(result.format, "sql");
        assert!(result.content.starts_with("-- Generated by arches-relational"));
    }
}
