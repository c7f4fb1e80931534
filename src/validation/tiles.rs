//! Tile validation
//!
//! Checks that tiles point at things that exist and that parent-tile references mirror
//! the nodegroup tree: a tile has a parent tile iff its nodegroup has a parent nodegroup.

use crate::models::{ArchesPackage, NodeGroup};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// A problem found with a tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum TileIssue {
    UnknownNodegroup { tile_id: Uuid, nodegroup_id: Uuid },
    UnknownResource { tile_id: Uuid, resource_id: Uuid },
    MissingParentTile { tile_id: Uuid },
    UnexpectedParentTile { tile_id: Uuid, parent_tile_id: Uuid },
    UnknownParentTile { tile_id: Uuid, parent_tile_id: Uuid },
}

/// Result of tile validation.
#[derive(Debug, Serialize, Deserialize)]
#[must_use = "validation results should be checked for issues"]
pub struct TileValidationResult {
    pub tiles_checked: usize,
    pub issues: Vec<TileIssue>,
}

impl TileValidationResult {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Tile validator
#[derive(Default)]
pub struct TileValidator;

impl TileValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check every tile of a package against its graphs and resources
    pub fn validate(&self, package: &ArchesPackage) -> TileValidationResult {
        let nodegroups: HashMap<Uuid, &NodeGroup> = package
            .graphs
            .iter()
            .flat_map(|g| g.nodegroups.iter())
            .map(|ng| (ng.id, ng))
            .collect();
        let resources: HashSet<Uuid> = package.resources.iter().map(|r| r.id).collect();
        let tiles: HashSet<Uuid> = package.tiles.iter().map(|t| t.id).collect();

        let mut issues = Vec::new();
        for tile in &package.tiles {
            if !resources.contains(&tile.resource_instance_id) {
                issues.push(TileIssue::UnknownResource {
                    tile_id: tile.id,
                    resource_id: tile.resource_instance_id,
                });
            }

            let Some(nodegroup) = nodegroups.get(&tile.nodegroup_id) else {
                issues.push(TileIssue::UnknownNodegroup {
                    tile_id: tile.id,
                    nodegroup_id: tile.nodegroup_id,
                });
                continue;
            };

            match (nodegroup.parent_id, tile.parent_tile_id) {
                (Some(_), None) => issues.push(TileIssue::MissingParentTile { tile_id: tile.id }),
                (None, Some(parent_tile_id)) => issues.push(TileIssue::UnexpectedParentTile {
                    tile_id: tile.id,
                    parent_tile_id,
                }),
                (Some(_), Some(parent_tile_id)) if !tiles.contains(&parent_tile_id) => {
                    issues.push(TileIssue::UnknownParentTile {
                        tile_id: tile.id,
                        parent_tile_id,
                    })
                }
                _ => {}
            }
        }

        TileValidationResult {
            tiles_checked: package.tiles.len(),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Graph, ResourceInstance, Tile};

    #[test]
    fn test_parent_tile_mirrors_nodegroup_parent() {
        let mut graph = Graph::new(Uuid::new_v4(), "Monument");
        let parent_ng = Uuid::new_v4();
        let child_ng = Uuid::new_v4();
        graph.nodegroups.push(NodeGroup::new(parent_ng, None));
        graph.nodegroups.push(NodeGroup::new(child_ng, Some(parent_ng)));

        let resource = ResourceInstance::new(Uuid::new_v4(), graph.id);
        let parent = Tile::new(Uuid::new_v4(), resource.id, parent_ng);
        let orphan = Tile::new(Uuid::new_v4(), resource.id, child_ng);
        let mut stray = Tile::new(Uuid::new_v4(), resource.id, parent_ng);
        stray.parent_tile_id = Some(parent.id);

        let package = ArchesPackage {
            graphs: vec![graph],
            resources: vec![resource],
            tiles: vec![parent, orphan.clone(), stray.clone()],
            ..Default::default()
        };

        let result = TileValidator::new().validate(&package);
        assert_eq!(result.tiles_checked, 3);
        assert_eq!(
            result.issues,
            vec![
                TileIssue::MissingParentTile { tile_id: orphan.id },
                TileIssue::UnexpectedParentTile {
                    tile_id: stray.id,
                    parent_tile_id: stray.parent_tile_id.unwrap(),
                },
            ]
        );
    }

    #[test]
    fn test_unknown_references() {
        let tile = Tile::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let package = ArchesPackage {
            tiles: vec![tile],
            ..Default::default()
        };
        let result = TileValidator::new().validate(&package);
        assert_eq!(result.issues.len(), 2);
        assert!(!result.is_valid());
    }
}
