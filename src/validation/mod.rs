//! Validation functionality
//!
//! Provides validation logic for:
//! - Graph structure (top node, collectors, nodegroup tree, lookup configuration)
//! - Tiles (dangling references, parent tiles mirroring parent nodegroups)
//!
//! The exporter fails fast on the first structural error it meets; these validators
//! report every problem at once.

pub mod graphs;
pub mod tiles;

pub use graphs::{GraphIssue, GraphValidationResult, GraphValidator};
pub use tiles::{TileIssue, TileValidationResult, TileValidator};
