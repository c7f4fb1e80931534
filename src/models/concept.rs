//! Controlled vocabulary entries

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry of a concept collection as returned by the vocabulary query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LookupEntry {
    /// Value identifier stored in tiles
    pub id: Uuid,
    pub label: String,
    /// Nesting depth below the collection
    #[serde(default)]
    pub depth: u32,
    /// Grouping entry (a nested collection heading), never stored as a value
    #[serde(default)]
    pub collector: bool,
}

impl LookupEntry {
    pub fn new(id: Uuid, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            depth: 1,
            collector: false,
        }
    }
}

/// A concept collection referenced by concept nodes through `config.rdmCollection`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    #[serde(rename = "collectionid")]
    pub id: Uuid,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub entries: Vec<LookupEntry>,
}
