//! Validate command handler

use super::load_package;
use crate::cli::error::CliError;
use crate::models::ArchesPackage;
use crate::validation::{GraphValidationResult, GraphValidator, TileValidationResult, TileValidator};
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Clone)]
pub struct ValidateArgs {
    pub package: PathBuf,
    /// Print the report as JSON
    pub json: bool,
}

/// Everything found in one package
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub graphs: Vec<GraphValidationResult>,
    pub tiles: TileValidationResult,
}

impl ValidationReport {
    pub fn issue_count(&self) -> usize {
        self.graphs.iter().map(|g| g.issues.len()).sum::<usize>() + self.tiles.issues.len()
    }
}

/// Validate every graph and tile of a loaded package
pub fn validate_package(package: &ArchesPackage) -> ValidationReport {
    let validator = GraphValidator::new();
    ValidationReport {
        graphs: package.graphs.iter().map(|g| validator.validate(g)).collect(),
        tiles: TileValidator::new().validate(package),
    }
}

/// Handle the validate command
pub fn handle_validate(args: &ValidateArgs) -> Result<(), CliError> {
    let package = load_package(&args.package)?;
    let report = validate_package(&package);

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to serialize report: {}", e)))?;
        println!("{}", json);
    } else {
        for (graph, result) in package.graphs.iter().zip(&report.graphs) {
            if result.is_valid() {
                println!("✅ {} ({})", graph.name.text(), graph.id);
            } else {
                println!("❌ {} ({})", graph.name.text(), graph.id);
                for issue in &result.issues {
                    println!("   {:?}", issue);
                }
            }
        }
        println!(
            "Tiles: {} checked, {} issue(s)",
            report.tiles.tiles_checked,
            report.tiles.issues.len()
        );
        for issue in &report.tiles.issues {
            println!("   {:?}", issue);
        }
    }

    match report.issue_count() {
        0 => Ok(()),
        n => Err(CliError::ValidationFailed(n)),
    }
}
