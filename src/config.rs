//! Export configuration file support
//!
//! Handles parsing of `.arches-export.toml` configuration files and
//! environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::database::ConnectionSettings;
use crate::export::relational::{
    DEFAULT_REGISTRY_SCHEMA, DEFAULT_REGISTRY_TABLE, ExportOptions, SYSTEM_SETTINGS_GRAPH_ID,
};
use crate::export::data::DEFAULT_SRID;
use crate::export::naming::DEFAULT_MAX_IDENTIFIER_LENGTH;
use crate::models::localized::DEFAULT_LANGUAGE;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".arches-export.toml";

/// Environment variable for the identifier length bound
pub const ENV_IDENTIFIER_MAX_LENGTH: &str = "ARCHES_EXPORT_IDENTIFIER_MAX_LENGTH";
/// Environment variable for the geometry SRID
pub const ENV_SRID: &str = "ARCHES_EXPORT_SRID";
/// Environment variable for the preferred language
pub const ENV_LANGUAGE: &str = "ARCHES_EXPORT_LANGUAGE";

pub const ENV_DB_HOST: &str = "ARCHES_DB_HOST";
pub const ENV_DB_PORT: &str = "ARCHES_DB_PORT";
pub const ENV_DB_NAME: &str = "ARCHES_DB_NAME";
pub const ENV_DB_USER: &str = "ARCHES_DB_USER";
pub const ENV_DB_PASSWORD: &str = "ARCHES_DB_PASSWORD";

/// Error loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Configuration error: {0}")]
    ParseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Export configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportSection {
    #[serde(default = "default_identifier_max_length")]
    pub identifier_max_length: usize,

    #[serde(default = "default_srid")]
    pub srid: u32,

    /// Preferred language for localized names and values
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_registry_schema")]
    pub registry_schema: String,

    #[serde(default = "default_registry_table")]
    pub registry_table: String,

    /// Graphs never exported
    #[serde(default = "default_excluded_graphs")]
    pub excluded_graphs: Vec<Uuid>,
}

fn default_identifier_max_length() -> usize {
    DEFAULT_MAX_IDENTIFIER_LENGTH
}

fn default_srid() -> u32 {
    DEFAULT_SRID
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_registry_schema() -> String {
    DEFAULT_REGISTRY_SCHEMA.to_string()
}

fn default_registry_table() -> String {
    DEFAULT_REGISTRY_TABLE.to_string()
}

fn default_excluded_graphs() -> Vec<Uuid> {
    vec![SYSTEM_SETTINGS_GRAPH_ID]
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            identifier_max_length: default_identifier_max_length(),
            srid: default_srid(),
            language: default_language(),
            registry_schema: default_registry_schema(),
            registry_table: default_registry_table(),
            excluded_graphs: default_excluded_graphs(),
        }
    }
}

/// Main configuration structure
///
/// Represents the `.arches-export.toml` configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ExportConfig {
    /// Export configuration
    #[serde(default)]
    pub export: ExportSection,

    /// Database used by the shapefile export
    #[serde(default)]
    pub database: ConnectionSettings,
}

impl ExportConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a package directory
    ///
    /// Looks for `.arches-export.toml` in the directory.
    /// Falls back to defaults if not found.
    pub fn load(package_path: &Path) -> Result<Self, ConfigError> {
        Self::load_file(&package_path.join(CONFIG_FILENAME))
    }

    /// Load configuration from an explicit file, defaults if it does not exist
    pub fn load_file(config_path: &Path) -> Result<Self, ConfigError> {
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::IoError(format!("Failed to read config: {}", e)))?;

            Self::parse(&content)?
        } else {
            Self::default()
        };

        // Apply environment variable overrides
        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse config: {}", e)))
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unparsable numbers are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(length) = lookup(ENV_IDENTIFIER_MAX_LENGTH)
            && let Ok(length) = length.parse()
        {
            self.export.identifier_max_length = length;
        }

        if let Some(srid) = lookup(ENV_SRID)
            && let Ok(srid) = srid.parse()
        {
            self.export.srid = srid;
        }

        if let Some(language) = lookup(ENV_LANGUAGE) {
            self.export.language = language;
        }

        if let Some(host) = lookup(ENV_DB_HOST) {
            self.database.host = host;
        }

        if let Some(port) = lookup(ENV_DB_PORT)
            && let Ok(port) = port.parse()
        {
            self.database.port = port;
        }

        if let Some(name) = lookup(ENV_DB_NAME) {
            self.database.name = name;
        }

        if let Some(user) = lookup(ENV_DB_USER) {
            self.database.user = user;
        }

        if let Some(password) = lookup(ENV_DB_PASSWORD) {
            self.database.password = Some(password);
        }
    }

    /// Export options described by this configuration
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            max_identifier_length: self.export.identifier_max_length,
            srid: self.export.srid,
            language: self.export.language.clone(),
            registry_schema: self.export.registry_schema.clone(),
            registry_table: self.export.registry_table.clone(),
            excluded_graphs: self.export.excluded_graphs.clone(),
            ..Default::default()
        }
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Arches relational export configuration

[export]
# Longest identifier generated (key columns add "_id")
identifier_max_length = 60

# Spatial reference of stored GeoJSON
srid = 4326

# Preferred language for localized text
language = "en"

# Table recording the origin of every derived column
registry_schema = "public"
registry_table = "__arches_relational_registry"

# Graphs never exported (the system settings model by default)
excluded_graphs = ["ff623370-fa12-11e6-b98b-6c4008b05c4c"]

# Database read by the shapefile export
[database]
host = "localhost"
port = 5432
name = "arches"
user = "postgres"
# Prefer ARCHES_DB_PASSWORD over storing the password here
# password = ""
"#
}
