//! Shapefile export command handler

use super::load_config;
use crate::cli::error::CliError;
use crate::export::shapefile::{ShapefileExporter, ShapefilePlan, ShapefileRequest};
use std::path::PathBuf;

/// Arguments for the shp command
#[derive(Debug, Clone)]
pub struct ShapefileArgs {
    /// Table to export, optionally schema-qualified
    pub table: String,
    /// Directory to create for the shapefiles
    pub dest: PathBuf,
    pub config: Option<PathBuf>,
}

/// Handle the shp command
pub fn handle_shapefile(args: &ShapefileArgs) -> Result<(), CliError> {
    let config = load_config(&PathBuf::from("."), args.config.as_deref())?;
    let request = ShapefileRequest {
        table: args.table.clone(),
        destination: args.dest.clone(),
    };
    let exporter = ShapefileExporter::new(config.database.clone());

    let plan = plan_with_database(&exporter, &config.database, &request)?;
    match &plan {
        ShapefilePlan::NoRecords => {
            println!("No records in table {} for export", request.table);
            Ok(())
        }
        ShapefilePlan::Export(_) => {
            let written = exporter.execute(&plan, &request)?;
            println!(
                "✅ Exported {} shapefile(s) to {}",
                written,
                request.destination.display()
            );
            Ok(())
        }
    }
}

#[cfg(feature = "postgres-backend")]
fn plan_with_database(
    exporter: &ShapefileExporter,
    settings: &crate::database::ConnectionSettings,
    request: &ShapefileRequest,
) -> Result<ShapefilePlan, CliError> {
    use crate::database::PostgresBackend;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::DatabaseError(format!("Failed to start runtime: {}", e)))?;
    runtime.block_on(async {
        let backend = PostgresBackend::connect(settings)
            .await
            .map_err(|e| CliError::DatabaseError(e.to_string()))?;
        let plan = exporter.plan(&backend, request).await?;
        Ok::<_, CliError>(plan)
    })
}

#[cfg(not(feature = "postgres-backend"))]
fn plan_with_database(
    _exporter: &ShapefileExporter,
    _settings: &crate::database::ConnectionSettings,
    _request: &ShapefileRequest,
) -> Result<ShapefilePlan, CliError> {
    Err(CliError::InvalidArgument(
        "Shapefile export needs a database connection. Build with --features postgres-backend"
            .to_string(),
    ))
}
