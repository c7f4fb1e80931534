//! Package loading tests

use arches_relational::model::{DataSource, LoadError, PackageLoader, PackageSource};
use arches_relational::models::{Datatype, LocalizedString};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const GRAPH_ID: &str = "5a2c5b2e-1c35-4b5e-9a4d-2f0b8d6f1a01";
const TOP_NODE: &str = "6b3d6c3f-2d46-4c6f-8b5e-3a1c9e7a2b02";
const NAME_NG: &str = "7c4e7d4a-3e57-4d7a-9c6f-4b2d0f8b3c03";
const NAME_NODE: &str = "8d5f8e5b-4f68-4e8b-8d7a-5c3e1a9c4d04";
const COLLECTION_ID: &str = "9e6a9f6c-5a79-4f9c-9e8b-6d4f2b0d5e05";

fn write_json(dir: &Path, sub_dir: &str, file: &str, value: serde_json::Value) {
    let target = dir.join(sub_dir);
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join(file), serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn create_package() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_json(
        dir.path(),
        "graphs",
        "monument.json",
        json!({"graph": [{
            "graphid": GRAPH_ID,
            "name": {"en": "Monument", "de": "Denkmal"},
            "isresource": true,
            "nodes": [
                {"nodeid": TOP_NODE, "name": "Monument", "datatype": "semantic",
                 "nodegroup_id": null, "istopnode": true, "config": {}},
                {"nodeid": NAME_NG, "name": "Name", "datatype": "semantic",
                 "nodegroup_id": NAME_NG, "istopnode": false},
                {"nodeid": NAME_NODE, "name": "Name Value", "datatype": "string",
                 "nodegroup_id": NAME_NG, "istopnode": false}
            ],
            "nodegroups": [
                {"nodegroupid": NAME_NG, "parentnodegroup_id": null, "cardinality": "n"}
            ]
        }]}),
    );
    write_json(
        dir.path(),
        "business_data",
        "monuments.json",
        json!({"business_data": {"resources": [{
            "resourceinstance": {
                "resourceinstanceid": "0f0a6f4e-8c67-4b0a-9f0e-3b1c2d4e5f60",
                "graph_id": GRAPH_ID,
                "legacyid": "MON-1"
            },
            "tiles": [{
                "tileid": "1a1b1c1d-2e2f-4a3b-8c4d-5e6f7a8b9c0d",
                "resourceinstance_id": "0f0a6f4e-8c67-4b0a-9f0e-3b1c2d4e5f60",
                "nodegroup_id": NAME_NG,
                "parenttile_id": null,
                "data": {NAME_NODE: {"en": {"value": "Old Mill", "direction": "ltr"}}}
            }]
        }]}}),
    );
    let collections = dir.path().join("collections");
    fs::create_dir_all(&collections).unwrap();
    fs::write(
        collections.join("materials.yaml"),
        format!(
            "collectionid: {}\nlabel: Materials\nentries:\n  - id: 2b2c2d2e-3f3a-4b4c-9d5e-6f7a8b9c0d1e\n    label: Brick\n",
            COLLECTION_ID
        ),
    )
    .unwrap();
    fs::write(collections.join("README.md"), "not a document").unwrap();
    dir
}

#[test]
fn test_load_package_directory() {
    let dir = create_package();
    let package = PackageLoader::load_dir(dir.path()).unwrap();

    assert_eq!(package.graphs.len(), 1);
    assert_eq!(package.resources.len(), 1);
    assert_eq!(package.tiles.len(), 1);
    assert_eq!(package.collections.len(), 1);

    let graph = &package.graphs[0];
    assert_eq!(graph.name.resolve("de", "en"), "Denkmal");
    assert_eq!(graph.top_node().unwrap().name, "Monument");
    assert_eq!(graph.collector_nodes().count(), 1);
    assert_eq!(graph.nodes[2].datatype, Datatype::String);
    assert_eq!(package.resources[0].legacy_id.as_deref(), Some("MON-1"));
}

#[test]
fn test_package_source_indexes() {
    let dir = create_package();
    let source = PackageSource::new(PackageLoader::load_dir(dir.path()).unwrap());
    let graph_id = GRAPH_ID.parse().unwrap();
    let nodegroup_id = NAME_NG.parse().unwrap();

    assert_eq!(source.graphs().len(), 1);
    assert_eq!(source.resource_instances(graph_id).len(), 1);

    let tiles = source.tiles(nodegroup_id);
    assert_eq!(tiles.len(), 1);
    let value = tiles[0].value(NAME_NODE.parse().unwrap()).unwrap();
    let text = LocalizedString::from_value(value, "en").unwrap();
    assert_eq!(text.resolve("en", "en"), "Old Mill");

    let entries = source
        .collection_entries(COLLECTION_ID.parse().unwrap())
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].label, "Brick");
}

#[test]
fn test_missing_sub_directories_are_empty() {
    let dir = TempDir::new().unwrap();
    let package = PackageLoader::load_dir(dir.path()).unwrap();
    assert!(package.graphs.is_empty());
    assert!(package.tiles.is_empty());
}

#[test]
fn test_missing_package_directory() {
    let dir = TempDir::new().unwrap();
    let result = PackageLoader::load_dir(&dir.path().join("missing"));
    assert!(matches!(result, Err(LoadError::NotFound(_))));
}

#[test]
fn test_malformed_graph_reports_path() {
    let dir = TempDir::new().unwrap();
    let graphs = dir.path().join("graphs");
    fs::create_dir_all(&graphs).unwrap();
    fs::write(graphs.join("broken.json"), "{\"graph\": [{\"name\": 1}]}").unwrap();

    match PackageLoader::load_dir(dir.path()) {
        Err(LoadError::ParseError(path, _)) => assert!(path.ends_with("broken.json")),
        other => panic!("expected a parse error, got {:?}", other),
    }
}
