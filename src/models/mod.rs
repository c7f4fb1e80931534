//! Models module
//!
//! Plain data types for the Arches entities the exporter reads: graphs with their
//! nodegroups and nodes, resource instances, tiles and concept collections.

pub mod concept;
pub mod datatype;
pub mod graph;
pub mod localized;
pub mod package;
pub mod resource;

pub use concept::{Collection, LookupEntry};
pub use datatype::{Datatype, RelationalType};
pub use graph::{Cardinality, Graph, Node, NodeGroup};
pub use localized::LocalizedString;
pub use package::ArchesPackage;
pub use resource::{ResourceInstance, Tile};
