//! Validation tests

mod common;

use arches_relational::models::{ArchesPackage, Datatype, NodeGroup};
use arches_relational::validation::{GraphIssue, GraphValidator, TileIssue, TileValidator};
use common::{GraphBuilder, add_resource, add_tile};
use serde_json::json;
use uuid::Uuid;

mod graph_validation_tests {
    use super::*;

    #[test]
    fn test_well_formed_graph() {
        let mut builder = GraphBuilder::new("Monument");
        let names = builder.nodegroup("Names", None);
        builder.member(names, "Name", Datatype::String);
        builder.nodegroup("Name Use", Some(names));

        let result = GraphValidator::new().validate(&builder.build());
        assert!(result.is_valid(), "unexpected issues: {:?}", result.issues);
    }

    #[test]
    fn test_reports_every_problem() {
        let mut builder = GraphBuilder::new("Monument");
        let names = builder.nodegroup("Names", None);
        let concept = builder.member(names, "Name Type", Datatype::Concept);
        let mut graph = builder.build();
        // Collector removed and a nodegroup pointing at a parent that does not exist
        let orphan_parent = Uuid::new_v4();
        graph.nodes.retain(|n| n.id != names);
        graph
            .nodegroups
            .push(NodeGroup::new(Uuid::new_v4(), Some(orphan_parent)));

        let result = GraphValidator::new().validate(&graph);

        assert!(result.issues.contains(&GraphIssue::MissingCollector { nodegroup_id: names }));
        assert!(result.issues.contains(&GraphIssue::MissingLookupConfiguration {
            node_id: concept,
            datatype: "concept".to_string(),
        }));
        assert!(result.issues.iter().any(|issue| matches!(
            issue,
            GraphIssue::UnknownParentNodegroup { parent_id, .. } if *parent_id == orphan_parent
        )));
    }

    #[test]
    fn test_detects_cycles() {
        let mut builder = GraphBuilder::new("Monument");
        let a = builder.nodegroup("A", None);
        let b = builder.nodegroup("B", Some(a));
        let mut graph = builder.build();
        for nodegroup in graph.nodegroups.iter_mut().filter(|ng| ng.id == a) {
            nodegroup.parent_id = Some(b);
        }

        let cycles = GraphValidator::new().nodegroup_cycles(&graph);
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(cycles, vec![expected]);
    }

    #[test]
    fn test_issues_serialize_with_tag() {
        let value = serde_json::to_value(GraphIssue::MissingTopNode).unwrap();
        assert_eq!(value, json!({"issue": "missing_top_node"}));
    }
}

mod tile_validation_tests {
    use super::*;

    #[test]
    fn test_tiles_match_graph() {
        let mut builder = GraphBuilder::new("Monument");
        let phase = builder.nodegroup("Phase", None);
        let component = builder.nodegroup("Component", Some(phase));
        let graph = builder.build();

        let mut package = ArchesPackage::default();
        let resource = add_resource(&mut package, graph.id, None);
        let phase_tile = add_tile(&mut package, resource, phase, None, &[]);
        add_tile(&mut package, resource, component, Some(phase_tile), &[]);
        package.graphs.push(graph);

        let result = TileValidator::new().validate(&package);
        assert_eq!(result.tiles_checked, 2);
        assert!(result.is_valid());
    }

    #[test]
    fn test_dangling_references() {
        let mut builder = GraphBuilder::new("Monument");
        let phase = builder.nodegroup("Phase", None);
        let component = builder.nodegroup("Component", Some(phase));
        let graph = builder.build();

        let mut package = ArchesPackage::default();
        let resource = add_resource(&mut package, graph.id, None);
        let missing_parent = add_tile(&mut package, resource, component, None, &[]);
        let unknown_resource = add_tile(&mut package, Uuid::new_v4(), phase, None, &[]);
        package.graphs.push(graph);

        let result = TileValidator::new().validate(&package);
        assert!(result.issues.contains(&TileIssue::MissingParentTile { tile_id: missing_parent }));
        assert!(result.issues.iter().any(|issue| matches!(
            issue,
            TileIssue::UnknownResource { tile_id, .. } if *tile_id == unknown_resource
        )));
    }
}
