//! SQL identifier resolution
//!
//! Node names are authored by people, repeat across branches of a graph, and may contain
//! anything. Identifiers derived from them are slugs: lower-case ASCII, `_`-separated and
//! bounded in length so a `_id` suffix still fits PostgreSQL's 63-byte limit.
//!
//! Two different names can still produce the same slug after truncation. Nothing here
//! detects or resolves that; the emitted SQL fails on execution instead.

use crate::export::ExportError;
use crate::models::{Graph, Node};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use uuid::Uuid;

/// Identifier length used unless configured otherwise
pub const DEFAULT_MAX_IDENTIFIER_LENGTH: usize = 60;

/// Separator placed between words of a slug
pub const SEPARATOR: char = '_';

static RE_QUOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"`\u{2018}\u{2019}]"#).expect("Invalid regex"));
static RE_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid regex"));

/// Turn a name into a lower-case, `_`-separated identifier of at most `max_length` characters.
///
/// Accents are folded (`é` becomes `e`), quotes are dropped and every other run of
/// characters outside `[a-z0-9]` becomes a single separator. A name with nothing left
/// after folding gets a stable `n_<hash>` identifier derived from its text.
///
/// # Example
///
/// ```rust
/// use arches_relational::export::naming::slugify;
///
/// assert_eq!(slugify("Heritage Resource - Name", 60), "heritage_resource_name");
/// assert_eq!(slugify("Élément d'architecture", 60), "element_darchitecture");
/// assert_eq!(slugify("Construction Phase", 8), "construc");
/// ```
pub fn slugify(name: &str, max_length: usize) -> String {
    let folded: String = name.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let lowered = folded.to_lowercase();
    let unquoted = RE_QUOTES.replace_all(&lowered, "");
    let separated = RE_DISALLOWED.replace_all(&unquoted, "_");
    let slug = separated.trim_matches(SEPARATOR);

    let slug = if slug.is_empty() {
        let digest = Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).simple().to_string();
        format!("n_{}", &digest[..8])
    } else {
        slug.to_string()
    };

    // Only ASCII remains, so byte and character positions agree
    let end = slug.len().min(max_length);
    slug[..end].trim_end_matches(SEPARATOR).to_string()
}

/// Computes every identifier the exporter emits
#[derive(Debug, Clone, Copy)]
pub struct NameResolver {
    max_length: usize,
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDENTIFIER_LENGTH)
    }
}

impl NameResolver {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Slug of a single name
    pub fn slug(&self, name: &str) -> String {
        slugify(name, self.max_length)
    }

    /// Graph-unique name for a node's nodegroup.
    ///
    /// Walks from the node's nodegroup up through its ancestors, prefixing the name of
    /// each ancestor's collector node, so "Description" under "Phase" becomes
    /// `phase_description`. Stops at the first nodegroup without a parent.
    pub fn qualify(&self, graph: &Graph, node: &Node) -> Result<String, ExportError> {
        let mut segments: Vec<&str> = vec![&node.name];

        let Some(start) = node.nodegroup_id else {
            return Ok(self.slug(&node.name));
        };

        let mut visited = HashSet::from([start]);
        let mut parent = graph
            .nodegroup(start)
            .ok_or(ExportError::UnknownNodegroup(start))?
            .parent_id;

        while let Some(parent_id) = parent {
            if !visited.insert(parent_id) {
                return Err(ExportError::CyclicNodegroups(parent_id));
            }
            let group = graph
                .nodegroup(parent_id)
                .ok_or(ExportError::UnknownNodegroup(parent_id))?;
            let collector = graph
                .collector_node(parent_id)
                .ok_or(ExportError::MissingCollector(parent_id))?;
            segments.push(&collector.name);
            parent = group.parent_id;
        }

        segments.reverse();
        Ok(self.slug(&segments.join("-")))
    }

    /// Primary key column of a derived table
    pub fn key_column(&self, table: &str) -> String {
        format!("{}_id", table)
    }

    /// Lookup table holding the options of one column
    pub fn lookup_table(&self, table: &str, column: &str) -> String {
        self.per_column("dom", table, column)
    }

    /// Spatial index over a geometry column
    pub fn spatial_index(&self, table: &str, column: &str) -> String {
        self.per_column("gix", table, column)
    }

    /// Foreign key constraint on a column
    pub fn foreign_key(&self, column: &str) -> String {
        self.slug(&format!("fk-{}", column))
    }

    /// `<prefix>_<table>_<column>`, shortening the table part so the column always survives
    fn per_column(&self, prefix: &str, table: &str, column: &str) -> String {
        let column = self.slug(column);
        let room = self
            .max_length
            .saturating_sub(prefix.len() + column.len() + 2);
        let table = self.slug(table);
        let table = table[..table.len().min(room)].trim_end_matches(SEPARATOR);
        if table.is_empty() {
            self.slug(&format!("{}-{}", prefix, column))
        } else {
            self.slug(&format!("{}-{}-{}", prefix, table, column))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Datatype, NodeGroup};

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Name", 60), "name");
        assert_eq!(slugify("  Heritage   Resource  ", 60), "heritage_resource");
        assert_eq!(slugify("Use/Function (Primary)", 60), "use_function_primary");
    }

    #[test]
    fn test_slugify_truncation_strips_trailing_separator() {
        assert_eq!(slugify("abc def", 4), "abc");
    }

    #[test]
    fn test_slugify_non_latin_falls_back_to_hash() {
        let a = slugify("名称", 60);
        let b = slugify("描述", 60);
        assert!(a.starts_with("n_"));
        assert_ne!(a, b);
        assert_eq!(a, slugify("名称", 60));
    }

    #[test]
    fn test_qualify_cycle_is_an_error() {
        let mut graph = Graph::new(Uuid::new_v4(), "Loop");
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        graph.nodegroups.push(NodeGroup::new(a, Some(b)));
        graph.nodegroups.push(NodeGroup::new(b, Some(a)));
        graph.nodes.push(Node::new(a, "A", Datatype::Semantic, Some(a)));
        graph.nodes.push(Node::new(b, "B", Datatype::Semantic, Some(b)));

        let node = graph.collector_node(a).unwrap().clone();
        let result = NameResolver::default().qualify(&graph, &node);
        assert!(matches!(result, Err(ExportError::CyclicNodegroups(_))));
    }

    #[test]
    fn test_derived_names() {
        let resolver = NameResolver::default();
        assert_eq!(resolver.key_column("phase"), "phase_id");
        assert_eq!(resolver.lookup_table("phase", "type"), "dom_phase_type");
        assert_eq!(resolver.spatial_index("location", "geometry"), "gix_location_geometry");
        assert_eq!(resolver.foreign_key("monument_id"), "fk_monument_id");
    }

    #[test]
    fn test_per_column_names_keep_column_on_long_tables() {
        let resolver = NameResolver::default();
        let table = "production_event_parts_production_technique_and_material_typ";
        assert_eq!(table.len(), 60);

        let technique = resolver.lookup_table(table, "technique");
        let material = resolver.lookup_table(table, "material");
        assert_ne!(technique, material);
        assert!(technique.ends_with("_technique"), "{}", technique);
        assert!(material.ends_with("_material"), "{}", material);
        assert!(technique.len() <= 60 && material.len() <= 60);
        assert!(technique.starts_with("dom_production_event"));

        let index = resolver.spatial_index(table, "geometry");
        assert!(index.starts_with("gix_") && index.ends_with("_geometry"));
        assert!(index.len() <= 60);
    }
}
