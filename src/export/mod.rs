//! Export functionality
//!
//! Provides the relational export of Arches resource models:
//! - Name resolution for SQL identifiers
//! - Schema derivation (DDL)
//! - Data materialization (DML)
//! - Shapefile export of a single table through `pgsql2shp`

pub mod data;
pub mod naming;
pub mod relational;
pub mod schema;
pub mod shapefile;
pub mod sql;

use uuid::Uuid;

/// Result of an export operation.
///
/// Contains the exported content and format identifier.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[must_use = "export results contain the exported content and should be used"]
pub struct ExportResult {
    /// Exported content
    pub content: String,
    /// Format identifier
    pub format: String,
}

/// Error during export
#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Graph {0} has no top node")]
    MissingTopNode(Uuid),
    #[error("Nodegroup {0} has no collector node")]
    MissingCollector(Uuid),
    #[error("Unknown nodegroup {0}")]
    UnknownNodegroup(Uuid),
    #[error("Nodegroup parent chain is cyclic at {0}")]
    CyclicNodegroups(Uuid),
    #[error("Node {node_id} ({datatype}) is missing its lookup configuration")]
    MissingConfiguration { node_id: Uuid, datatype: String },
    #[error("Concept collection {collection_id} referenced by node {node_id} does not exist")]
    UnknownCollection { node_id: Uuid, collection_id: Uuid },
    #[error("Invalid value for node {node_id} in tile {tile_id}: {reason}")]
    InvalidValue {
        tile_id: Uuid,
        node_id: Uuid,
        reason: String,
    },
    #[error("Export error: {0}")]
    ExportError(String),
}

// Re-export for convenience
pub use data::{DataMaterializer, MaterializeStats};
pub use naming::{NameResolver, slugify};
pub use relational::{ExportOptions, RelationalExport, RelationalExporter};
pub use schema::{GraphSchema, SchemaDeriver};
pub use shapefile::{GeometryKind, ShapefileExporter};
pub use sql::{Phase, SqlScript};
