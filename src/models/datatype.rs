//! Node datatypes and their relational mapping

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Arches node datatype.
///
/// Tags the exporter does not know about are kept verbatim in [`Datatype::Other`] so
/// they survive a load/save round trip; they have no relational mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Datatype {
    String,
    NonLocalizedString,
    Number,
    Boolean,
    Date,
    Edtf,
    Url,
    GeojsonFeatureCollection,
    Concept,
    ConceptList,
    DomainValue,
    DomainValueList,
    ResourceInstance,
    ResourceInstanceList,
    FileList,
    Annotation,
    NodeValue,
    Semantic,
    Other(String),
}

/// Column types the exporter emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationalType {
    Text,
    Numeric,
    Boolean,
    Timestamp,
    Geometry,
    Uuid,
    UuidArray,
    Jsonb,
}

impl RelationalType {
    /// SQL spelling of the type
    pub fn as_sql(&self) -> &'static str {
        match self {
            RelationalType::Text => "TEXT",
            RelationalType::Numeric => "NUMERIC",
            RelationalType::Boolean => "BOOLEAN",
            RelationalType::Timestamp => "TIMESTAMP",
            RelationalType::Geometry => "GEOMETRY",
            RelationalType::Uuid => "UUID",
            RelationalType::UuidArray => "UUID[]",
            RelationalType::Jsonb => "JSONB",
        }
    }
}

impl fmt::Display for RelationalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl Datatype {
    /// Parse an Arches datatype tag
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "string" => Datatype::String,
            "non-localized-string" => Datatype::NonLocalizedString,
            "number" => Datatype::Number,
            "boolean" => Datatype::Boolean,
            "date" => Datatype::Date,
            "edtf" => Datatype::Edtf,
            "url" => Datatype::Url,
            "geojson-feature-collection" => Datatype::GeojsonFeatureCollection,
            "concept" => Datatype::Concept,
            "concept-list" => Datatype::ConceptList,
            "domain-value" => Datatype::DomainValue,
            "domain-value-list" => Datatype::DomainValueList,
            "resource-instance" => Datatype::ResourceInstance,
            "resource-instance-list" => Datatype::ResourceInstanceList,
            "file-list" => Datatype::FileList,
            "annotation" => Datatype::Annotation,
            "node-value" => Datatype::NodeValue,
            "semantic" => Datatype::Semantic,
            other => Datatype::Other(other.to_string()),
        }
    }

    /// The Arches datatype tag
    pub fn tag(&self) -> &str {
        match self {
            Datatype::String => "string",
            Datatype::NonLocalizedString => "non-localized-string",
            Datatype::Number => "number",
            Datatype::Boolean => "boolean",
            Datatype::Date => "date",
            Datatype::Edtf => "edtf",
            Datatype::Url => "url",
            Datatype::GeojsonFeatureCollection => "geojson-feature-collection",
            Datatype::Concept => "concept",
            Datatype::ConceptList => "concept-list",
            Datatype::DomainValue => "domain-value",
            Datatype::DomainValueList => "domain-value-list",
            Datatype::ResourceInstance => "resource-instance",
            Datatype::ResourceInstanceList => "resource-instance-list",
            Datatype::FileList => "file-list",
            Datatype::Annotation => "annotation",
            Datatype::NodeValue => "node-value",
            Datatype::Semantic => "semantic",
            Datatype::Other(tag) => tag,
        }
    }

    /// Relational column type, or `None` when the datatype is not exported
    pub fn relational_type(&self) -> Option<RelationalType> {
        match self {
            Datatype::String | Datatype::NonLocalizedString | Datatype::Edtf => {
                Some(RelationalType::Text)
            }
            Datatype::Number => Some(RelationalType::Numeric),
            Datatype::Boolean => Some(RelationalType::Boolean),
            Datatype::Date => Some(RelationalType::Timestamp),
            Datatype::GeojsonFeatureCollection => Some(RelationalType::Geometry),
            Datatype::Concept | Datatype::DomainValue | Datatype::NodeValue => {
                Some(RelationalType::Uuid)
            }
            Datatype::ConceptList | Datatype::DomainValueList => Some(RelationalType::UuidArray),
            Datatype::Url
            | Datatype::ResourceInstance
            | Datatype::ResourceInstanceList
            | Datatype::FileList
            | Datatype::Annotation => Some(RelationalType::Jsonb),
            Datatype::Semantic | Datatype::Other(_) => None,
        }
    }

    /// Whether values are drawn from a controlled vocabulary or option list
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Datatype::Concept
                | Datatype::ConceptList
                | Datatype::DomainValue
                | Datatype::DomainValueList
        )
    }

    /// Whether the lookup options come from a concept collection (vs. inline options)
    pub fn is_concept(&self) -> bool {
        matches!(self, Datatype::Concept | Datatype::ConceptList)
    }

    /// Whether the stored value is a list of lookup identifiers
    pub fn is_list(&self) -> bool {
        matches!(self, Datatype::ConceptList | Datatype::DomainValueList)
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for Datatype {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for Datatype {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Datatype::from_tag(&tag))
    }
}
