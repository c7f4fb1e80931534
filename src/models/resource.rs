//! Resource instance and tile models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One record conforming to a graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceInstance {
    #[serde(rename = "resourceinstanceid")]
    pub id: Uuid,
    pub graph_id: Uuid,
    #[serde(rename = "legacyid", default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,
}

impl ResourceInstance {
    pub fn new(id: Uuid, graph_id: Uuid) -> Self {
        Self {
            id,
            graph_id,
            legacy_id: None,
        }
    }
}

/// One stored occurrence of a nodegroup's data for a resource instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tile {
    #[serde(rename = "tileid")]
    pub id: Uuid,
    #[serde(rename = "resourceinstance_id")]
    pub resource_instance_id: Uuid,
    pub nodegroup_id: Uuid,
    #[serde(rename = "parenttile_id", default, skip_serializing_if = "Option::is_none")]
    pub parent_tile_id: Option<Uuid>,
    /// Node id (as string) to stored value
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Tile {
    pub fn new(id: Uuid, resource_instance_id: Uuid, nodegroup_id: Uuid) -> Self {
        Self {
            id,
            resource_instance_id,
            nodegroup_id,
            parent_tile_id: None,
            data: Map::new(),
        }
    }

    /// Stored value for a node.
    ///
    /// Tile data is sparse: a missing key and an explicit `null` both mean "no value".
    pub fn value(&self, node_id: Uuid) -> Option<&Value> {
        self.data
            .get(&node_id.to_string())
            .filter(|value| !value.is_null())
    }

    pub fn set_value(&mut self, node_id: Uuid, value: Value) {
        self.data.insert(node_id.to_string(), value);
    }
}
