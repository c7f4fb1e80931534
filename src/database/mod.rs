//! Database access for the shapefile export
//!
//! The relational export itself never connects to a database: it only produces SQL.
//! The shapefile command needs row counts per geometry kind before it hands a table to
//! `pgsql2shp`, and gets them through the [`GeometryStats`] trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::export::shapefile::GeometryKind;

#[cfg(feature = "postgres-backend")]
pub mod postgres;

#[cfg(feature = "postgres-backend")]
pub use self::postgres::PostgresBackend;

/// Error type for database operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// PostgreSQL connection parameters, shared by the backend and `pgsql2shp`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    /// Never serialized back out
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "arches".to_string(),
            user: "postgres".to_string(),
            password: None,
        }
    }
}

impl ConnectionSettings {
    /// Key/value connection string understood by tokio-postgres
    pub fn connection_string(&self) -> String {
        let mut parts = vec![
            format!("host={}", self.host),
            format!("port={}", self.port),
            format!("dbname={}", self.name),
            format!("user={}", self.user),
        ];
        if let Some(password) = &self.password {
            parts.push(format!("password={}", password));
        }
        parts.join(" ")
    }
}

/// Row counts of a table holding geometries
///
/// Table names arrive already quoted and schema-qualified.
#[async_trait(?Send)]
pub trait GeometryStats {
    /// Number of rows in the table
    async fn row_count(&self, table: &str) -> DatabaseResult<u64>;

    /// Number of rows whose `geom_type` is one of the kind's PostGIS types
    async fn geometry_count(&self, table: &str, kind: GeometryKind) -> DatabaseResult<u64>;
}
