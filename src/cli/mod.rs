//! Command-line interface
//!
//! Thin wrappers that load a package and configuration, call the library and write
//! the results. The binary lives in `main.rs`.

pub mod commands;
pub mod error;

pub use error::CliError;
