//! Arches Relational - export Arches resource models to a relational schema
//!
//! Provides:
//! - Package loading (graphs, business data, concept collections)
//! - Identifier resolution for SQL names
//! - Schema derivation and data materialization as an ordered SQL script
//! - Graph and tile validation
//! - Shapefile export of a single table (via `pgsql2shp`)
//!
//! ```no_run
//! use arches_relational::{ExportOptions, PackageLoader, PackageSource, RelationalExporter};
//!
//! let package = PackageLoader::load_dir(std::path::Path::new("my-package"))?;
//! let source = PackageSource::new(package);
//! let export = RelationalExporter::new(&source, ExportOptions::default()).export()?;
//! println!("{}", export.render());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod database;
pub mod export;
pub mod model;
pub mod models;
pub mod validation;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use config::{ConfigError, ExportConfig};
pub use database::{ConnectionSettings, DatabaseError, GeometryStats};
pub use export::{
    DataMaterializer, ExportError, ExportOptions, ExportResult, GraphSchema, MaterializeStats,
    NameResolver, Phase, RelationalExport, RelationalExporter, SchemaDeriver, SqlScript, slugify,
};
pub use model::{DataSource, LoadError, PackageLoader, PackageSource};
pub use validation::{GraphIssue, GraphValidator, TileIssue, TileValidator};

// Re-export models
pub use models::{
    ArchesPackage, Cardinality, Collection, Datatype, Graph, LocalizedString, LookupEntry, Node,
    NodeGroup, RelationalType, ResourceInstance, Tile,
};
