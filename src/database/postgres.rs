//! PostgreSQL backend
//!
//! Counts rows for the shapefile export over a single tokio-postgres connection.

use async_trait::async_trait;
use tracing::{debug, error};

use super::{ConnectionSettings, DatabaseError, DatabaseResult, GeometryStats};
use crate::export::shapefile::GeometryKind;

/// PostgreSQL database backend
pub struct PostgresBackend {
    client: tokio_postgres::Client,
    settings: ConnectionSettings,
}

impl PostgresBackend {
    /// Connect to the database described by `settings`
    pub async fn connect(settings: &ConnectionSettings) -> DatabaseResult<Self> {
        let (client, connection) =
            tokio_postgres::connect(&settings.connection_string(), tokio_postgres::NoTls)
                .await
                .map_err(|e| {
                    DatabaseError::ConnectionFailed(format!(
                        "Failed to connect to PostgreSQL at {}:{}: {}",
                        settings.host, settings.port, e
                    ))
                })?;

        // Spawn connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {}", e);
            }
        });

        debug!("Connected to {} on {}:{}", settings.name, settings.host, settings.port);
        Ok(Self {
            client,
            settings: settings.clone(),
        })
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    async fn count(&self, sql: &str) -> DatabaseResult<u64> {
        let row = self
            .client
            .query_one(sql, &[])
            .await
            .map_err(|e| DatabaseError::QueryFailed(format!("{}: {}", sql, e)))?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| DatabaseError::QueryFailed(format!("{}: {}", sql, e)))?;
        u64::try_from(count).map_err(|_| DatabaseError::QueryFailed(format!("negative count from {}", sql)))
    }
}

#[async_trait(?Send)]
impl GeometryStats for PostgresBackend {
    async fn row_count(&self, table: &str) -> DatabaseResult<u64> {
        self.count(&format!("SELECT count(*) FROM {}", table)).await
    }

    async fn geometry_count(&self, table: &str, kind: GeometryKind) -> DatabaseResult<u64> {
        self.count(&format!(
            "SELECT count(*) FROM {} WHERE {}",
            table,
            kind.condition()
        ))
        .await
    }
}
