//! Shared fixtures for integration tests

#![allow(dead_code)]

use arches_relational::models::{
    ArchesPackage, Collection, Datatype, Graph, LookupEntry, Node, NodeGroup, ResourceInstance,
    Tile,
};
use serde_json::{Value, json};
use uuid::Uuid;

/// Builds a graph node by node
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    /// New resource model with its top node
    pub fn new(name: &str) -> Self {
        let mut graph = Graph::new(Uuid::new_v4(), name);
        let mut top = Node::new(Uuid::new_v4(), name, Datatype::Semantic, None);
        top.is_top_node = true;
        graph.nodes.push(top);
        Self { graph }
    }

    /// Add a nodegroup with its collector node, returning the nodegroup id
    pub fn nodegroup(&mut self, name: &str, parent: Option<Uuid>) -> Uuid {
        let id = Uuid::new_v4();
        self.graph.nodegroups.push(NodeGroup::new(id, parent));
        self.graph
            .nodes
            .push(Node::new(id, name, Datatype::Semantic, Some(id)));
        id
    }

    /// Add a member node to a nodegroup, returning the node id
    pub fn member(&mut self, nodegroup_id: Uuid, name: &str, datatype: Datatype) -> Uuid {
        self.member_with_config(nodegroup_id, name, datatype, Value::Null)
    }

    pub fn member_with_config(
        &mut self,
        nodegroup_id: Uuid,
        name: &str,
        datatype: Datatype,
        config: Value,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let mut node = Node::new(id, name, datatype, Some(nodegroup_id));
        node.config = config;
        self.graph.nodes.push(node);
        id
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}

/// Add a resource instance of `graph_id` to the package
pub fn add_resource(package: &mut ArchesPackage, graph_id: Uuid, legacy_id: Option<&str>) -> Uuid {
    let mut resource = ResourceInstance::new(Uuid::new_v4(), graph_id);
    resource.legacy_id = legacy_id.map(str::to_string);
    let id = resource.id;
    package.resources.push(resource);
    id
}

/// Add a tile with the given node values to the package
pub fn add_tile(
    package: &mut ArchesPackage,
    resource_id: Uuid,
    nodegroup_id: Uuid,
    parent_tile_id: Option<Uuid>,
    values: &[(Uuid, Value)],
) -> Uuid {
    let mut tile = Tile::new(Uuid::new_v4(), resource_id, nodegroup_id);
    tile.parent_tile_id = parent_tile_id;
    for (node_id, value) in values {
        tile.set_value(*node_id, value.clone());
    }
    let id = tile.id;
    package.tiles.push(tile);
    id
}

/// Concept collection with one top concept acting as collector
pub fn collection(labels: &[&str]) -> Collection {
    let mut entries = vec![LookupEntry {
        id: Uuid::new_v4(),
        label: "Materials".to_string(),
        depth: 0,
        collector: true,
    }];
    entries.extend(labels.iter().map(|label| LookupEntry::new(Uuid::new_v4(), *label)));
    Collection {
        id: Uuid::new_v4(),
        label: Some("Materials".to_string()),
        entries,
    }
}

/// Stored string value in the localized shape
pub fn localized(text: &str) -> Value {
    json!({"en": {"value": text, "direction": "ltr"}})
}

/// Single-point feature collection
pub fn point_collection(points: &[(f64, f64)]) -> Value {
    let features: Vec<Value> = points
        .iter()
        .map(|(x, y)| {
            json!({
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "Point", "coordinates": [x, y]}
            })
        })
        .collect();
    json!({"type": "FeatureCollection", "features": features})
}

/// Statements of a rendered script that start with `prefix`
pub fn statements_with<'a>(sql: &'a str, prefix: &str) -> Vec<&'a str> {
    sql.lines().filter(|line| line.starts_with(prefix)).collect()
}
