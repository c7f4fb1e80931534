//! Package loading functionality
//!
//! Loads an Arches package directory into an [`ArchesPackage`]:
//!
//! - `graphs/` - resource model exports (`{"graph": [...]}` wrapper or a bare graph)
//! - `business_data/` - resource exports (`{"business_data": {"resources": [...]}}`)
//! - `collections/` - concept collections with their flattened entries
//!
//! Files may be JSON or YAML. Missing directories are treated as empty.

use crate::models::{ArchesPackage, Collection, Graph, ResourceInstance, Tile};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const GRAPHS_DIR: &str = "graphs";
pub const BUSINESS_DATA_DIR: &str = "business_data";
pub const COLLECTIONS_DIR: &str = "collections";

/// Error while loading a package
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {0}: {1}")]
    IoError(PathBuf, String),
    #[error("Failed to parse {0}: {1}")]
    ParseError(PathBuf, String),
    #[error("Package directory not found: {0}")]
    NotFound(PathBuf),
}

/// One resource entry of a business data export
#[derive(Debug, Deserialize)]
struct ResourceEntry {
    resourceinstance: ResourceInstance,
    #[serde(default)]
    tiles: Vec<Tile>,
}

/// Loader for package directories
pub struct PackageLoader {
    root: PathBuf,
}

impl PackageLoader {
    /// Create a loader rooted at a package directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Convenience wrapper for `PackageLoader::new(dir).load()`
    pub fn load_dir(dir: &Path) -> Result<ArchesPackage, LoadError> {
        Self::new(dir).load()
    }

    /// Load every graph, resource, tile and collection in the package
    pub fn load(&self) -> Result<ArchesPackage, LoadError> {
        if !self.root.is_dir() {
            return Err(LoadError::NotFound(self.root.clone()));
        }

        let mut package = ArchesPackage::default();

        for path in self.list_files(GRAPHS_DIR)? {
            let value = read_document(&path)?;
            let graphs = parse_graphs(value).map_err(|e| parse_error(&path, e))?;
            debug!("Loaded {} graph(s) from {}", graphs.len(), path.display());
            package.graphs.extend(graphs);
        }

        for path in self.list_files(BUSINESS_DATA_DIR)? {
            let value = read_document(&path)?;
            let entries = parse_business_data(value).map_err(|e| parse_error(&path, e))?;
            debug!("Loaded {} resource(s) from {}", entries.len(), path.display());
            for entry in entries {
                package.resources.push(entry.resourceinstance);
                package.tiles.extend(entry.tiles);
            }
        }

        for path in self.list_files(COLLECTIONS_DIR)? {
            let value = read_document(&path)?;
            let collections = parse_collections(value).map_err(|e| parse_error(&path, e))?;
            package.collections.extend(collections);
        }

        info!(
            "Loaded package {}: {} graphs, {} resources, {} tiles, {} collections",
            self.root.display(),
            package.graphs.len(),
            package.resources.len(),
            package.tiles.len(),
            package.collections.len()
        );

        Ok(package)
    }

    /// List loadable files of a sub-directory, sorted by name
    fn list_files(&self, sub_dir: &str) -> Result<Vec<PathBuf>, LoadError> {
        let dir = self.root.join(sub_dir);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries =
            std::fs::read_dir(&dir).map_err(|e| LoadError::IoError(dir.clone(), e.to_string()))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LoadError::IoError(dir.clone(), e.to_string()))?;
            let path = entry.path();
            if path.is_file() && is_document(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn is_document(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json") | Some("yaml") | Some("yml")
    )
}

fn parse_error(path: &Path, e: serde_json::Error) -> LoadError {
    LoadError::ParseError(path.to_path_buf(), e.to_string())
}

/// Read a JSON or YAML document into a JSON value
fn read_document(path: &Path) -> Result<Value, LoadError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| LoadError::IoError(path.to_path_buf(), e.to_string()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .map_err(|e| LoadError::ParseError(path.to_path_buf(), e.to_string())),
        _ => serde_yaml::from_str(&content)
            .map_err(|e| LoadError::ParseError(path.to_path_buf(), e.to_string())),
    }
}

/// Accepts `{"graph": [..]}`, a list of graphs, or a single graph
fn parse_graphs(value: Value) -> Result<Vec<Graph>, serde_json::Error> {
    match value {
        Value::Object(mut map) if map.contains_key("graph") => {
            let graphs = map.remove("graph").unwrap_or(Value::Null);
            serde_json::from_value(graphs)
        }
        Value::Array(_) => serde_json::from_value(value),
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}

/// Accepts `{"business_data": {"resources": [..]}}` or `{"resources": [..]}`
fn parse_business_data(value: Value) -> Result<Vec<ResourceEntry>, serde_json::Error> {
    let resources = value
        .get("business_data")
        .unwrap_or(&value)
        .get("resources")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    serde_json::from_value(resources)
}

/// Accepts `{"collections": [..]}`, a list of collections, or a single collection
fn parse_collections(value: Value) -> Result<Vec<Collection>, serde_json::Error> {
    match value {
        Value::Object(mut map) if map.contains_key("collections") => {
            let collections = map.remove("collections").unwrap_or(Value::Null);
            serde_json::from_value(collections)
        }
        Value::Array(_) => serde_json::from_value(value),
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}
