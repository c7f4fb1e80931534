//! Read-only data access for the exporter

use crate::models::{ArchesPackage, Graph, LookupEntry, ResourceInstance, Tile};
use std::collections::HashMap;
use uuid::Uuid;

/// Read-only view of the Arches data model consumed by the exporter.
///
/// Implementations only need to enumerate; the exporter never writes back.
pub trait DataSource {
    /// All graphs, resource and non-resource alike
    fn graphs(&self) -> &[Graph];

    /// Resource instances conforming to a graph
    fn resource_instances(&self, graph_id: Uuid) -> Vec<&ResourceInstance>;

    /// Tiles stored for a nodegroup
    fn tiles(&self, nodegroup_id: Uuid) -> Vec<&Tile>;

    /// Entries of a concept collection, or `None` if the collection is unknown
    fn collection_entries(&self, collection_id: Uuid) -> Option<Vec<LookupEntry>>;
}

/// In-memory [`DataSource`] over a loaded package
pub struct PackageSource {
    package: ArchesPackage,
    resources_by_graph: HashMap<Uuid, Vec<usize>>,
    tiles_by_nodegroup: HashMap<Uuid, Vec<usize>>,
}

impl PackageSource {
    /// Index a package for lookup by graph and nodegroup
    pub fn new(package: ArchesPackage) -> Self {
        let mut resources_by_graph: HashMap<Uuid, Vec<usize>> = HashMap::new();
        for (idx, resource) in package.resources.iter().enumerate() {
            resources_by_graph
                .entry(resource.graph_id)
                .or_default()
                .push(idx);
        }

        let mut tiles_by_nodegroup: HashMap<Uuid, Vec<usize>> = HashMap::new();
        for (idx, tile) in package.tiles.iter().enumerate() {
            tiles_by_nodegroup
                .entry(tile.nodegroup_id)
                .or_default()
                .push(idx);
        }

        Self {
            package,
            resources_by_graph,
            tiles_by_nodegroup,
        }
    }

    pub fn package(&self) -> &ArchesPackage {
        &self.package
    }
}

impl From<ArchesPackage> for PackageSource {
    fn from(package: ArchesPackage) -> Self {
        Self::new(package)
    }
}

impl DataSource for PackageSource {
    fn graphs(&self) -> &[Graph] {
        &self.package.graphs
    }

    fn resource_instances(&self, graph_id: Uuid) -> Vec<&ResourceInstance> {
        self.resources_by_graph
            .get(&graph_id)
            .map(|idxs| idxs.iter().map(|&i| &self.package.resources[i]).collect())
            .unwrap_or_default()
    }

    fn tiles(&self, nodegroup_id: Uuid) -> Vec<&Tile> {
        self.tiles_by_nodegroup
            .get(&nodegroup_id)
            .map(|idxs| idxs.iter().map(|&i| &self.package.tiles[i]).collect())
            .unwrap_or_default()
    }

    fn collection_entries(&self, collection_id: Uuid) -> Option<Vec<LookupEntry>> {
        self.package
            .get_collection(collection_id)
            .map(|c| c.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Collection, Graph};

    #[test]
    fn test_indexes_by_graph_and_nodegroup() {
        let graph_id = Uuid::new_v4();
        let nodegroup_id = Uuid::new_v4();
        let resource = ResourceInstance::new(Uuid::new_v4(), graph_id);
        let mut package = ArchesPackage::default();
        package.graphs.push(Graph::new(graph_id, "Monument"));
        package.tiles.push(Tile::new(Uuid::new_v4(), resource.id, nodegroup_id));
        package.resources.push(resource);
        package.resources.push(ResourceInstance::new(Uuid::new_v4(), Uuid::new_v4()));

        let source = PackageSource::new(package);
        assert_eq!(source.resource_instances(graph_id).len(), 1);
        assert_eq!(source.tiles(nodegroup_id).len(), 1);
        assert!(source.tiles(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_unknown_collection() {
        let collection = Collection {
            id: Uuid::new_v4(),
            label: None,
            entries: vec![LookupEntry::new(Uuid::new_v4(), "Brick")],
        };
        let mut package = ArchesPackage::default();
        let id = collection.id;
        package.collections.push(collection);
        let source = PackageSource::new(package);
        assert_eq!(source.collection_entries(id).map(|e| e.len()), Some(1));
        assert!(source.collection_entries(Uuid::new_v4()).is_none());
    }
}
