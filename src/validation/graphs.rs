//! Graph structure validation
//!
//! Reports the structural problems that would make an export fail or produce an
//! unusable schema: missing top node, nodegroups without a collector, dangling or
//! cyclic parent references, and lookup nodes without their configuration.

use crate::models::Graph;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A structural problem found in a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum GraphIssue {
    MissingTopNode,
    MultipleTopNodes { node_ids: Vec<Uuid> },
    MissingCollector { nodegroup_id: Uuid },
    UnknownParentNodegroup { nodegroup_id: Uuid, parent_id: Uuid },
    UnknownNodegroup { node_id: Uuid, nodegroup_id: Uuid },
    OrphanNode { node_id: Uuid },
    CyclicNodegroups { cycle: Vec<Uuid> },
    MissingLookupConfiguration { node_id: Uuid, datatype: String },
}

/// Result of graph validation.
#[derive(Debug, Serialize, Deserialize)]
#[must_use = "validation results should be checked for issues"]
pub struct GraphValidationResult {
    pub graph_id: Uuid,
    pub issues: Vec<GraphIssue>,
}

impl GraphValidationResult {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Graph validator
#[derive(Default)]
pub struct GraphValidator;

impl GraphValidator {
    /// Create a new graph validator
    ///
    /// # Example
    ///
    /// ```rust
    /// use arches_relational::validation::graphs::GraphValidator;
    ///
    /// let validator = GraphValidator::new();
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Check a graph's structure
    pub fn validate(&self, graph: &Graph) -> GraphValidationResult {
        let mut issues = Vec::new();

        let top_nodes: Vec<Uuid> = graph
            .nodes
            .iter()
            .filter(|n| n.is_top_node)
            .map(|n| n.id)
            .collect();
        match top_nodes.len() {
            0 => issues.push(GraphIssue::MissingTopNode),
            1 => {}
            _ => issues.push(GraphIssue::MultipleTopNodes {
                node_ids: top_nodes,
            }),
        }

        for nodegroup in &graph.nodegroups {
            if graph.collector_node(nodegroup.id).is_none() {
                issues.push(GraphIssue::MissingCollector {
                    nodegroup_id: nodegroup.id,
                });
            }
            if let Some(parent_id) = nodegroup.parent_id
                && graph.nodegroup(parent_id).is_none()
            {
                issues.push(GraphIssue::UnknownParentNodegroup {
                    nodegroup_id: nodegroup.id,
                    parent_id,
                });
            }
        }

        for node in &graph.nodes {
            match node.nodegroup_id {
                Some(nodegroup_id) if graph.nodegroup(nodegroup_id).is_none() => {
                    issues.push(GraphIssue::UnknownNodegroup {
                        node_id: node.id,
                        nodegroup_id,
                    });
                }
                None if !node.is_top_node => {
                    issues.push(GraphIssue::OrphanNode { node_id: node.id });
                }
                _ => {}
            }

            let configured = if node.datatype.is_concept() {
                node.rdm_collection().is_some()
            } else if node.datatype.is_lookup() {
                node.domain_options().is_some()
            } else {
                true
            };
            if !configured {
                issues.push(GraphIssue::MissingLookupConfiguration {
                    node_id: node.id,
                    datatype: node.datatype.tag().to_string(),
                });
            }
        }

        for cycle in self.nodegroup_cycles(graph) {
            issues.push(GraphIssue::CyclicNodegroups { cycle });
        }

        GraphValidationResult {
            graph_id: graph.id,
            issues,
        }
    }

    /// Cycles in the nodegroup parent relation
    ///
    /// Uses petgraph's strongly connected components over child -> parent edges: any
    /// component with more than one nodegroup, or a nodegroup that is its own parent,
    /// is a cycle.
    pub fn nodegroup_cycles(&self, graph: &Graph) -> Vec<Vec<Uuid>> {
        let mut parents = DiGraph::<Uuid, ()>::new();
        let mut index: HashMap<Uuid, NodeIndex> = HashMap::new();

        for nodegroup in &graph.nodegroups {
            index
                .entry(nodegroup.id)
                .or_insert_with(|| parents.add_node(nodegroup.id));
        }
        for nodegroup in &graph.nodegroups {
            if let Some(parent_id) = nodegroup.parent_id
                && let Some(&parent) = index.get(&parent_id)
            {
                parents.add_edge(index[&nodegroup.id], parent, ());
            }
        }

        tarjan_scc(&parents)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || parents.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut cycle: Vec<Uuid> = component.iter().map(|&i| parents[i]).collect();
                cycle.sort();
                cycle
            })
            .collect()
    }
}
