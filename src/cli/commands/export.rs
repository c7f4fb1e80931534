//! Schema export command handler

use super::{load_config, load_package, parse_uuids};
use crate::cli::error::CliError;
use crate::export::RelationalExporter;
use crate::model::PackageSource;
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments for the schema command
#[derive(Debug, Clone)]
pub struct SchemaArgs {
    pub package: PathBuf,
    pub config: Option<PathBuf>,
    /// Write the SQL here instead of stdout
    pub output: Option<PathBuf>,
    pub force: bool,
    /// Export only these graphs
    pub graphs: Vec<String>,
    pub schema_only: bool,
    pub language: Option<String>,
}

/// Check if output file exists and handle overwrite
pub fn check_file_overwrite(output_path: &Path, force: bool) -> Result<(), CliError> {
    if output_path.exists() && !force {
        return Err(CliError::InvalidArgument(format!(
            "Output file exists: {}. Use --force to overwrite.",
            output_path.display()
        )));
    }
    Ok(())
}

/// Write export output to file
pub fn write_export_output(output_path: &Path, content: &str) -> Result<(), CliError> {
    // Create parent directories if needed
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            CliError::FileWriteError(
                output_path.to_path_buf(),
                format!("Failed to create directory: {}", e),
            )
        })?;
    }

    std::fs::write(output_path, content)
        .map_err(|e| CliError::FileWriteError(output_path.to_path_buf(), e.to_string()))
}

/// Render the relational export of a package, without writing it anywhere
pub fn render_schema(args: &SchemaArgs) -> Result<String, CliError> {
    let config = load_config(&args.package, args.config.as_deref())?;
    let package = load_package(&args.package)?;

    let mut options = config.export_options();
    if !args.graphs.is_empty() {
        options.graphs = Some(parse_uuids(&args.graphs)?);
    }
    if let Some(language) = &args.language {
        options.language = language.clone();
    }
    options.include_data = !args.schema_only;

    let source = PackageSource::new(package);
    let export = RelationalExporter::new(&source, options).export()?;
    info!(
        "{} graphs, {} tables, {} resources, {} tiles, {} updates",
        export.schemas.len(),
        export.schemas.iter().map(|s| s.tables.len() + 1).sum::<usize>(),
        export.stats.resources,
        export.stats.tiles,
        export.stats.updates
    );
    Ok(export.into_result().content)
}

/// Handle the schema command
pub fn handle_schema(args: &SchemaArgs) -> Result<(), CliError> {
    if let Some(output) = &args.output {
        check_file_overwrite(output, args.force)?;
    }

    let sql = render_schema(args)?;

    match &args.output {
        Some(output) => {
            write_export_output(output, &sql)?;
            eprintln!("✅ Wrote relational export to {}", output.display());
        }
        None => print!("{}", sql),
    }
    Ok(())
}
