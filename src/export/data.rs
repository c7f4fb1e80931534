//! Data materialization
//!
//! Emits the rows of a derived schema: one insert per resource instance into the root
//! table, one insert per tile into its nodegroup's table, and one update per stored
//! member value, coerced to the column's relational type.

use crate::export::ExportError;
use crate::export::schema::{DerivedColumn, DerivedTable, GraphSchema, LEGACY_ID_COLUMN};
use crate::export::sql::{self, Phase, SqlScript};
use crate::model::DataSource;
use crate::models::localized::DEFAULT_LANGUAGE;
use crate::models::{Datatype, LocalizedString, RelationalType, Tile};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Spatial reference of stored GeoJSON
pub const DEFAULT_SRID: u32 = 4326;

/// Counts of what a materialization emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializeStats {
    pub resources: usize,
    pub tiles: usize,
    pub updates: usize,
    /// Stored values that produced no update (empty lists, feature collections without geometry)
    pub skipped_values: usize,
}

impl MaterializeStats {
    pub fn merge(&mut self, other: MaterializeStats) {
        self.resources += other.resources;
        self.tiles += other.tiles;
        self.updates += other.updates;
        self.skipped_values += other.skipped_values;
    }
}

/// Emits DML for the resources and tiles of a derived graph
pub struct DataMaterializer<'a, S: DataSource + ?Sized> {
    source: &'a S,
    srid: u32,
    language: String,
}

impl<'a, S: DataSource + ?Sized> DataMaterializer<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            srid: DEFAULT_SRID,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_srid(mut self, srid: u32) -> Self {
        self.srid = srid;
        self
    }

    /// Language resolved from localized string values
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Emit inserts and updates for every resource and tile of a graph.
    ///
    /// Fails on the first value that cannot be coerced; statements already pushed to
    /// `script` are left in place and the caller is expected to discard it.
    pub fn materialize(
        &self,
        schema: &GraphSchema,
        script: &mut SqlScript,
    ) -> Result<MaterializeStats, ExportError> {
        let mut stats = MaterializeStats::default();

        for resource in self.source.resource_instances(schema.graph_id) {
            let legacy_id = resource
                .legacy_id
                .as_deref()
                .map(sql::quote_literal)
                .unwrap_or_else(|| "NULL".to_string());
            script.push(
                Phase::Data,
                sql::insert(
                    &schema.schema,
                    &schema.root_table,
                    &[schema.root_key.as_str(), LEGACY_ID_COLUMN],
                    &[sql::uuid_literal(resource.id), legacy_id],
                ),
            );
            stats.resources += 1;
        }

        for table in &schema.tables {
            let table_stats = self.materialize_table(schema, table, script)?;
            debug!(
                "Table {}.{}: {} tiles, {} updates",
                schema.schema, table.name, table_stats.tiles, table_stats.updates
            );
            stats.merge(table_stats);
        }

        info!(
            "Materialized {}: {} resources, {} tiles, {} updates, {} skipped values",
            schema.schema, stats.resources, stats.tiles, stats.updates, stats.skipped_values
        );
        Ok(stats)
    }

    fn materialize_table(
        &self,
        schema: &GraphSchema,
        table: &DerivedTable,
        script: &mut SqlScript,
    ) -> Result<MaterializeStats, ExportError> {
        let mut stats = MaterializeStats::default();
        let s = schema.schema.as_str();

        for tile in self.source.tiles(table.nodegroup_id) {
            let parent = if table.has_parent_nodegroup() {
                if tile.parent_tile_id.is_none() {
                    warn!(
                        "Tile {} of nodegroup {} has no parent tile",
                        tile.id, table.nodegroup_id
                    );
                }
                tile.parent_tile_id
            } else {
                Some(tile.resource_instance_id)
            };

            script.push(
                Phase::Data,
                sql::insert(
                    s,
                    &table.name,
                    &[table.key_column.as_str(), table.parent.column.as_str()],
                    &[
                        sql::uuid_literal(tile.id),
                        parent.map(sql::uuid_literal).unwrap_or_else(|| "NULL".to_string()),
                    ],
                ),
            );
            stats.tiles += 1;

            if table.has_parent_nodegroup() {
                if let Some(parent_tile_id) = tile.parent_tile_id {
                    script.push(
                        Phase::Data,
                        sql::update(
                            s,
                            &table.name,
                            &table.parent.column,
                            &sql::uuid_literal(parent_tile_id),
                            &table.key_column,
                            tile.id,
                        ),
                    );
                }
            }

            for column in &table.columns {
                let Some(value) = tile.value(column.node_id) else {
                    continue;
                };
                match self.coerce(tile, column, value)? {
                    Some(expression) => {
                        script.push(
                            Phase::Data,
                            sql::update(
                                s,
                                &table.name,
                                &column.name,
                                &expression,
                                &table.key_column,
                                tile.id,
                            ),
                        );
                        stats.updates += 1;
                    }
                    None => stats.skipped_values += 1,
                }
            }
        }

        Ok(stats)
    }

    /// SQL expression for a stored value, or `None` if the value holds nothing to store
    pub fn coerce(
        &self,
        tile: &Tile,
        column: &DerivedColumn,
        value: &Value,
    ) -> Result<Option<String>, ExportError> {
        let invalid = |reason: String| ExportError::InvalidValue {
            tile_id: tile.id,
            node_id: column.node_id,
            reason,
        };

        let expression = match column.relational_type {
            RelationalType::Text => {
                // A plain string is the user's text as entered, never re-parsed
                let text = match (&column.datatype, value) {
                    (Datatype::String, Value::Object(_)) => {
                        LocalizedString::from_value(value, &self.language)
                            .map(|text| text.resolve(&self.language, DEFAULT_LANGUAGE).to_string())
                            .unwrap_or_default()
                    }
                    _ => scalar_text(value),
                };
                sql::cast_literal(&text, "text")
            }
            RelationalType::Numeric => match value {
                Value::Number(n) => sql::cast_literal(&n.to_string(), "numeric"),
                Value::String(s) if s.trim().is_empty() => return Ok(None),
                Value::String(s) if s.trim().parse::<f64>().is_ok() => {
                    sql::cast_literal(s.trim(), "numeric")
                }
                other => return Err(invalid(format!("expected a number, found {}", other))),
            },
            RelationalType::Boolean => match value {
                Value::Bool(b) => sql::cast_literal(&b.to_string(), "boolean"),
                Value::String(s) if matches!(s.as_str(), "true" | "false") => {
                    sql::cast_literal(s, "boolean")
                }
                other => return Err(invalid(format!("expected a boolean, found {}", other))),
            },
            RelationalType::Timestamp => match value {
                Value::String(s) if s.trim().is_empty() => "NULL".to_string(),
                Value::String(s) => sql::cast_literal(s, "timestamp"),
                other => return Err(invalid(format!("expected a date, found {}", other))),
            },
            RelationalType::Geometry => match self.geometry_expression(value) {
                Ok(Some(expression)) => expression,
                Ok(None) => return Ok(None),
                Err(reason) => return Err(invalid(reason)),
            },
            RelationalType::Uuid => {
                let id = parse_uuid(value).map_err(invalid)?;
                sql::uuid_literal(id)
            }
            RelationalType::UuidArray => {
                let Value::Array(items) = value else {
                    return Err(invalid(format!("expected a list, found {}", value)));
                };
                if items.is_empty() {
                    return Ok(None);
                }
                let ids = items
                    .iter()
                    .map(|item| parse_uuid(item).map(|id| sql::quote_literal(&id.to_string())))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(invalid)?;
                format!("ARRAY[{}]::uuid[]", ids.join(", "))
            }
            RelationalType::Jsonb => {
                let json = serde_json::to_string(value)
                    .map_err(|e| ExportError::SerializationError(e.to_string()))?;
                sql::cast_literal(&json, "jsonb")
            }
        };

        Ok(Some(expression))
    }

    /// Collect every feature geometry of a GeoJSON feature collection into one geometry
    fn geometry_expression(&self, value: &Value) -> Result<Option<String>, String> {
        let parsed;
        let collection = match value {
            Value::String(s) => {
                parsed = serde_json::from_str::<Value>(s).map_err(|e| e.to_string())?;
                &parsed
            }
            other => other,
        };

        let features = collection
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| "expected a GeoJSON feature collection".to_string())?;

        let mut geometries = Vec::with_capacity(features.len());
        for geometry in features.iter().filter_map(|f| f.get("geometry")) {
            if geometry.is_null() {
                continue;
            }
            let geojson = serde_json::to_string(geometry).map_err(|e| e.to_string())?;
            geometries.push(format!(
                "ST_SetSRID(ST_GeomFromGeoJSON({}), {})",
                sql::quote_literal(&geojson),
                self.srid
            ));
        }

        if geometries.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("ST_Collect(ARRAY[{}])", geometries.join(", "))))
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_uuid(value: &Value) -> Result<Uuid, String> {
    match value {
        Value::String(s) => {
            Uuid::parse_str(s.trim()).map_err(|_| format!("'{}' is not a valid identifier", s))
        }
        other => Err(format!("expected an identifier, found {}", other)),
    }
}
