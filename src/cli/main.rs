//! CLI binary entry point for arches-relational

#[cfg(feature = "cli")]
use arches_relational::cli::commands::export::{SchemaArgs, handle_schema};
#[cfg(feature = "cli")]
use arches_relational::cli::commands::shapefile::{ShapefileArgs, handle_shapefile};
#[cfg(feature = "cli")]
use arches_relational::cli::commands::validate::{ValidateArgs, handle_validate};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "arches-relational")]
#[command(about = "Export Arches resource models to a relational schema")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Print the SQL that recreates every resource model as relational tables
    Schema {
        /// Package directory (graphs/, business_data/, collections/)
        #[arg(default_value = ".")]
        package: PathBuf,
        /// Configuration file (default: <package>/.arches-export.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write SQL to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,
        /// Export only this graph (repeatable)
        #[arg(short, long = "graph")]
        graphs: Vec<String>,
        /// Emit DDL only, no inserts or updates
        #[arg(long)]
        schema_only: bool,
        /// Preferred language for localized text
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Export one table of geometries to shapefiles with pgsql2shp
    Shp {
        /// Table to export, optionally schema-qualified
        #[arg(short, long)]
        table: String,
        /// Destination directory; must not exist
        #[arg(short, long)]
        dest: PathBuf,
        /// Configuration file with the [database] section
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Check graphs and tiles of a package for structural problems
    Validate {
        /// Package directory
        #[arg(default_value = ".")]
        package: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // stdout carries SQL, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Schema {
            package,
            config,
            output,
            force,
            graphs,
            schema_only,
            language,
        } => handle_schema(&SchemaArgs {
            package,
            config,
            output,
            force,
            graphs,
            schema_only,
            language,
        })?,
        Commands::Shp {
            table,
            dest,
            config,
        } => handle_shapefile(&ShapefileArgs {
            table,
            dest,
            config,
        })?,
        Commands::Validate { package, json } => {
            handle_validate(&ValidateArgs { package, json })?
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
