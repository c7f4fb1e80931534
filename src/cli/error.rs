//! CLI-specific error types

use crate::config::ConfigError;
use crate::export::ExportError;
use crate::model::LoadError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Package directory not found: {0}")]
    PackageNotFound(PathBuf),

    #[error("Failed to write file {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Invalid UUID format: {0}")]
    InvalidUuid(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation found {0} issue(s)")]
    ValidationFailed(usize),

    #[error("Load error: {0}")]
    LoadError(#[from] LoadError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Export error: {0}")]
    ExportError(#[from] ExportError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
