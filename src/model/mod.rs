//! Package loading and data access
//!
//! Provides the loader for package directories and the read-only [`DataSource`]
//! seam the exporter works against.

pub mod loader;
pub mod source;

pub use loader::{LoadError, PackageLoader};
pub use source::{DataSource, PackageSource};
