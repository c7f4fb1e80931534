//! CLI command implementations

pub mod export;
pub mod shapefile;
pub mod validate;

use crate::cli::error::CliError;
use crate::config::ExportConfig;
use crate::model::PackageLoader;
use crate::models::ArchesPackage;
use std::path::Path;
use uuid::Uuid;

/// Load configuration from `--config` if given, otherwise from the directory
pub fn load_config(dir: &Path, config: Option<&Path>) -> Result<ExportConfig, CliError> {
    match config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::InvalidArgument(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Ok(ExportConfig::load_file(path)?)
        }
        None => Ok(ExportConfig::load(dir)?),
    }
}

/// Load a package directory
pub fn load_package(dir: &Path) -> Result<ArchesPackage, CliError> {
    if !dir.is_dir() {
        return Err(CliError::PackageNotFound(dir.to_path_buf()));
    }
    Ok(PackageLoader::load_dir(dir)?)
}

/// Parse graph identifiers given on the command line
pub fn parse_uuids(values: &[String]) -> Result<Vec<Uuid>, CliError> {
    values
        .iter()
        .map(|v| Uuid::parse_str(v.trim()).map_err(|_| CliError::InvalidUuid(v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuids(&[id.to_string()]).unwrap(), vec![id]);
        assert!(matches!(
            parse_uuids(&["monument".to_string()]),
            Err(CliError::InvalidUuid(_))
        ));
    }

    #[test]
    fn test_missing_package() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            load_package(&missing),
            Err(CliError::PackageNotFound(_))
        ));
    }
}
