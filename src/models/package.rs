//! ArchesPackage - the complete set of inputs for one export run

use super::concept::Collection;
use super::graph::Graph;
use super::resource::{ResourceInstance, Tile};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Graphs, business data and vocabularies read from a package
///
/// A package is the unit an export run works over. It is read-only for the exporter.
///
/// # Example
///
/// ```rust
/// use arches_relational::models::{ArchesPackage, Graph};
///
/// let mut package = ArchesPackage::default();
/// package.graphs.push(Graph::new(uuid::Uuid::new_v4(), "Heritage Resource"));
/// assert_eq!(package.graphs.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchesPackage {
    #[serde(default)]
    pub graphs: Vec<Graph>,
    #[serde(default)]
    pub resources: Vec<ResourceInstance>,
    #[serde(default)]
    pub tiles: Vec<Tile>,
    #[serde(default)]
    pub collections: Vec<Collection>,
}

impl ArchesPackage {
    /// Get a graph by its ID
    pub fn get_graph(&self, graph_id: Uuid) -> Option<&Graph> {
        self.graphs.iter().find(|g| g.id == graph_id)
    }

    /// Get a collection by its ID
    pub fn get_collection(&self, collection_id: Uuid) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == collection_id)
    }

    /// Merge another package into this one (used when loading several files)
    pub fn extend(&mut self, other: ArchesPackage) {
        self.graphs.extend(other.graphs);
        self.resources.extend(other.resources);
        self.tiles.extend(other.tiles);
        self.collections.extend(other.collections);
    }
}
