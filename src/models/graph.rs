//! Graph, nodegroup and node models
//!
//! Field names follow the Arches graph JSON export so packages deserialize directly.

use super::datatype::Datatype;
use super::localized::LocalizedString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Number of tiles a nodegroup may hold per parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cardinality {
    /// At most one tile
    #[serde(rename = "1")]
    One,
    /// Any number of tiles
    #[default]
    #[serde(rename = "n")]
    Many,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::One => "1",
            Cardinality::Many => "n",
        }
    }
}

/// A group of nodes recorded together as one tile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeGroup {
    #[serde(rename = "nodegroupid")]
    pub id: Uuid,
    #[serde(rename = "parentnodegroup_id", default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub cardinality: Cardinality,
}

impl NodeGroup {
    pub fn new(id: Uuid, parent_id: Option<Uuid>) -> Self {
        Self {
            id,
            parent_id,
            cardinality: Cardinality::Many,
        }
    }
}

/// A typed field of a graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    #[serde(rename = "nodeid")]
    pub id: Uuid,
    pub name: String,
    pub datatype: Datatype,
    /// Owning nodegroup; `None` only for the top node
    #[serde(default)]
    pub nodegroup_id: Option<Uuid>,
    #[serde(rename = "istopnode", default)]
    pub is_top_node: bool,
    /// Datatype configuration (concept collection, inline options, ...)
    #[serde(default)]
    pub config: Value,
}

impl Node {
    pub fn new(id: Uuid, name: impl Into<String>, datatype: Datatype, nodegroup_id: Option<Uuid>) -> Self {
        Self {
            id,
            name: name.into(),
            datatype,
            nodegroup_id,
            is_top_node: false,
            config: Value::Null,
        }
    }

    /// A node represents its nodegroup when the two share an identifier
    pub fn is_collector(&self) -> bool {
        self.nodegroup_id == Some(self.id)
    }

    /// Concept collection configured for concept/concept-list nodes
    pub fn rdm_collection(&self) -> Option<Uuid> {
        self.config
            .get("rdmCollection")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
    }

    /// Inline options configured for domain-value/domain-value-list nodes
    pub fn domain_options(&self) -> Option<&Vec<Value>> {
        self.config.get("options").and_then(Value::as_array)
    }
}

/// A user-defined resource model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Graph {
    #[serde(rename = "graphid")]
    pub id: Uuid,
    pub name: LocalizedString,
    #[serde(rename = "isresource", default)]
    pub is_resource: bool,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub nodegroups: Vec<NodeGroup>,
}

impl Graph {
    pub fn new(id: Uuid, name: &str) -> Self {
        Self {
            id,
            name: LocalizedString::from(name),
            is_resource: true,
            nodes: Vec::new(),
            nodegroups: Vec::new(),
        }
    }

    /// The root node of the graph
    pub fn top_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_top_node)
    }

    pub fn node(&self, node_id: Uuid) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn nodegroup(&self, nodegroup_id: Uuid) -> Option<&NodeGroup> {
        self.nodegroups.iter().find(|ng| ng.id == nodegroup_id)
    }

    /// The collector node representing a nodegroup
    pub fn collector_node(&self, nodegroup_id: Uuid) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.id == nodegroup_id && n.nodegroup_id == Some(nodegroup_id))
    }

    /// Collector nodes in graph order, excluding the top node
    pub fn collector_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| !n.is_top_node && n.is_collector())
    }

    /// All nodes belonging to a nodegroup, collector included
    pub fn member_nodes(&self, nodegroup_id: Uuid) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(move |n| n.nodegroup_id == Some(nodegroup_id))
    }
}
