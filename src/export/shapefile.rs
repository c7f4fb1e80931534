//! Shapefile export of a single table
//!
//! Splits a table of geometries by kind (lines, points, polygons) and hands each non-empty
//! kind to `pgsql2shp`, producing one shapefile per kind in the destination directory.

use crate::database::{ConnectionSettings, GeometryStats};
use crate::export::ExportError;
use crate::export::sql::{quote_identifier, quote_literal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use tracing::{info, warn};

/// Converter invoked for each geometry kind
pub const PGSQL2SHP: &str = "pgsql2shp";

/// Environment variable libpq reads the password from
pub const PASSWORD_ENV: &str = "PGPASSWORD";

/// Geometry kinds written to separate shapefiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    LineString,
    Point,
    Polygon,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 3] = [
        GeometryKind::LineString,
        GeometryKind::Point,
        GeometryKind::Polygon,
    ];

    /// Name of the shapefile written for this kind
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::LineString => "linestring",
            GeometryKind::Point => "point",
            GeometryKind::Polygon => "polygon",
        }
    }

    /// PostGIS geometry types belonging to this kind
    pub fn st_types(&self) -> [&'static str; 2] {
        match self {
            GeometryKind::LineString => ["ST_MultiLineString", "ST_LineString"],
            GeometryKind::Point => ["ST_Point", "ST_MultiPoint"],
            GeometryKind::Polygon => ["ST_MultiPolygon", "ST_Polygon"],
        }
    }

    /// `WHERE` condition selecting rows of this kind
    pub fn condition(&self) -> String {
        let types: Vec<String> = self.st_types().iter().map(|t| quote_literal(t)).collect();
        format!("geom_type IN ({})", types.join(", "))
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quote a possibly schema-qualified table name such as `monument.location`
pub fn quote_table_name(table: &str) -> Result<String, ExportError> {
    let parts: Vec<&str> = table.split('.').map(str::trim).collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(ExportError::ValidationError(format!(
            "Invalid table name: '{}'",
            table
        )));
    }
    Ok(parts
        .iter()
        .map(|p| quote_identifier(p))
        .collect::<Vec<_>>()
        .join("."))
}

/// Table to export and where to write it
#[derive(Debug, Clone, PartialEq)]
pub struct ShapefileRequest {
    pub table: String,
    pub destination: PathBuf,
}

/// One planned `pgsql2shp` invocation
#[derive(Clone)]
pub struct Pgsql2Shp {
    pub kind: GeometryKind,
    pub program: String,
    pub args: Vec<String>,
    password: Option<String>,
}

impl Pgsql2Shp {
    /// Process to spawn; the password travels in the environment, never in argv
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(password) = &self.password {
            command.env(PASSWORD_ENV, password);
        }
        command
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

impl fmt::Display for Pgsql2Shp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.program, self.args.join(" "))
    }
}

impl fmt::Debug for Pgsql2Shp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pgsql2Shp")
            .field("kind", &self.kind)
            .field("program", &self.program)
            .field("args", &self.args)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

/// What a shapefile export will do
#[derive(Debug, Clone)]
pub enum ShapefilePlan {
    /// The table is empty; nothing is written
    NoRecords,
    /// One invocation per geometry kind present in the table
    Export(Vec<Pgsql2Shp>),
}

/// Plans and runs shapefile exports
pub struct ShapefileExporter {
    settings: ConnectionSettings,
    program: String,
}

impl ShapefileExporter {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            program: PGSQL2SHP.to_string(),
        }
    }

    /// Use a different converter binary
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Decide which shapefiles to write.
    ///
    /// Refuses an existing destination so earlier exports are never overwritten.
    pub async fn plan<G: GeometryStats + ?Sized>(
        &self,
        stats: &G,
        request: &ShapefileRequest,
    ) -> Result<ShapefilePlan, ExportError> {
        if request.destination.exists() {
            return Err(ExportError::IoError(format!(
                "Cannot export data. Destination directory {} already exists",
                request.destination.display()
            )));
        }

        let table = quote_table_name(&request.table)?;
        let rows = stats
            .row_count(&table)
            .await
            .map_err(|e| ExportError::ExportError(e.to_string()))?;
        if rows == 0 {
            return Ok(ShapefilePlan::NoRecords);
        }

        let mut commands = Vec::new();
        for kind in GeometryKind::ALL {
            let count = stats
                .geometry_count(&table, kind)
                .await
                .map_err(|e| ExportError::ExportError(e.to_string()))?;
            if count > 0 {
                commands.push(self.command_for(&table, kind, request));
            } else {
                info!("No {} geometries in {}", kind, request.table);
            }
        }
        Ok(ShapefilePlan::Export(commands))
    }

    fn command_for(&self, table: &str, kind: GeometryKind, request: &ShapefileRequest) -> Pgsql2Shp {
        let file = request.destination.join(kind.name());
        let query = format!("SELECT * FROM {} WHERE {};", table, kind.condition());
        Pgsql2Shp {
            kind,
            program: self.program.clone(),
            args: vec![
                "-f".to_string(),
                file.display().to_string(),
                "-h".to_string(),
                self.settings.host.clone(),
                "-p".to_string(),
                self.settings.port.to_string(),
                "-u".to_string(),
                self.settings.user.clone(),
                "-g".to_string(),
                "geom".to_string(),
                self.settings.name.clone(),
                query,
            ],
            password: self.settings.password.clone(),
        }
    }

    /// Create the destination and run every planned invocation, returning how many ran
    pub fn execute(&self, plan: &ShapefilePlan, request: &ShapefileRequest) -> Result<usize, ExportError> {
        let ShapefilePlan::Export(commands) = plan else {
            warn!("No records in table {} for export", request.table);
            return Ok(0);
        };

        std::fs::create_dir_all(&request.destination).map_err(|e| {
            ExportError::IoError(format!(
                "Failed to create {}: {}",
                request.destination.display(),
                e
            ))
        })?;

        for invocation in commands {
            info!("Writing {} shapefile", invocation.kind);
            let status = invocation.command().status().map_err(|e| {
                ExportError::IoError(format!("Failed to run {}: {}", invocation.program, e))
            })?;
            if !status.success() {
                return Err(ExportError::ExportError(format!(
                    "{} failed for {} geometries: {}",
                    invocation.program, invocation.kind, status
                )));
            }
        }
        Ok(commands.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseResult;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedCounts {
        rows: u64,
        kinds: HashMap<&'static str, u64>,
    }

    #[async_trait(?Send)]
    impl GeometryStats for FixedCounts {
        async fn row_count(&self, _table: &str) -> DatabaseResult<u64> {
            Ok(self.rows)
        }

        async fn geometry_count(&self, _table: &str, kind: GeometryKind) -> DatabaseResult<u64> {
            Ok(self.kinds.get(kind.name()).copied().unwrap_or(0))
        }
    }

    fn request(dir: &tempfile::TempDir) -> ShapefileRequest {
        ShapefileRequest {
            table: "monument.location".to_string(),
            destination: dir.path().join("out"),
        }
    }

    #[tokio::test]
    async fn test_plans_one_command_per_present_kind() {
        let dir = tempfile::tempdir().unwrap();
        let stats = FixedCounts {
            rows: 3,
            kinds: HashMap::from([("point", 2), ("polygon", 1)]),
        };
        let settings = ConnectionSettings {
            password: Some("secret".to_string()),
            ..Default::default()
        };

        let plan = ShapefileExporter::new(settings)
            .plan(&stats, &request(&dir))
            .await
            .unwrap();
        let ShapefilePlan::Export(commands) = plan else {
            panic!("expected an export plan");
        };
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].kind, GeometryKind::Point);
        assert!(commands[0].has_password());
        assert!(!commands[0].args.iter().any(|a| a.contains("secret")));
        assert!(commands[0].to_string().contains("\"monument\".\"location\""));
    }

    #[tokio::test]
    async fn test_empty_table_has_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let stats = FixedCounts {
            rows: 0,
            kinds: HashMap::new(),
        };
        let plan = ShapefileExporter::new(ConnectionSettings::default())
            .plan(&stats, &request(&dir))
            .await
            .unwrap();
        assert!(matches!(plan, ShapefilePlan::NoRecords));
    }

    #[tokio::test]
    async fn test_existing_destination_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let stats = FixedCounts {
            rows: 1,
            kinds: HashMap::new(),
        };
        let request = ShapefileRequest {
            table: "location".to_string(),
            destination: dir.path().to_path_buf(),
        };
        let result = ShapefileExporter::new(ConnectionSettings::default())
            .plan(&stats, &request)
            .await;
        assert!(matches!(result, Err(ExportError::IoError(_))));
    }

    #[test]
    fn test_quote_table_name() {
        assert_eq!(quote_table_name("a.b").unwrap(), "\"a\".\"b\"");
        assert!(quote_table_name("a..b").is_err());
    }
}
