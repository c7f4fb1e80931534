//! SQL statement building
//!
//! Every statement the exporter emits is built here. Identifiers are always double-quoted
//! and literal values always pass through [`quote_literal`], so no caller interpolates raw
//! text into SQL.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Output section a statement belongs to.
///
/// Sections are rendered in declaration order: tables exist before columns are added to
/// them, rows exist before constraints are checked against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Schema and table creation
    Tables,
    /// Column additions, spatial indexes and comments
    Columns,
    /// Inserts and updates
    Data,
    /// Foreign key constraints
    Constraints,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Tables, Phase::Columns, Phase::Data, Phase::Constraints];

    fn index(self) -> usize {
        match self {
            Phase::Tables => 0,
            Phase::Columns => 1,
            Phase::Data => 2,
            Phase::Constraints => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Tables => "tables",
            Phase::Columns => "columns and indexes",
            Phase::Data => "data",
            Phase::Constraints => "constraints",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Statements collected into the four ordered phases
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlScript {
    buffers: [Vec<String>; 4],
}

impl SqlScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement to a phase
    pub fn push(&mut self, phase: Phase, statement: impl Into<String>) {
        self.buffers[phase.index()].push(statement.into());
    }

    /// Statements of one phase, in emission order
    pub fn statements(&self, phase: Phase) -> &[String] {
        &self.buffers[phase.index()]
    }

    /// All statements in render order
    pub fn iter(&self) -> impl Iterator<Item = (Phase, &str)> {
        Phase::ALL.into_iter().flat_map(move |phase| {
            self.statements(phase)
                .iter()
                .map(move |statement| (phase, statement.as_str()))
        })
    }

    /// Append every statement of `other`, phase by phase
    pub fn extend(&mut self, other: SqlScript) {
        for (buffer, statements) in self.buffers.iter_mut().zip(other.buffers) {
            buffer.extend(statements);
        }
    }

    pub fn len(&self) -> usize {
        self.buffers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.iter().all(Vec::is_empty)
    }

    /// Render the script with a `-- <phase>` header before each non-empty phase
    pub fn render(&self) -> String {
        let mut sql = String::new();
        for phase in Phase::ALL {
            let statements = self.statements(phase);
            if statements.is_empty() {
                continue;
            }
            if !sql.is_empty() {
                sql.push('\n');
            }
            sql.push_str(&format!("-- {}\n", phase));
            for statement in statements {
                sql.push_str(statement);
                sql.push('\n');
            }
        }
        sql
    }
}

/// Quote an identifier, doubling any embedded double quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Schema-qualified, quoted table name
pub fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_identifier(schema), quote_identifier(table))
}

/// Quote a literal value, doubling single quotes and removing NUL characters
pub fn quote_literal(value: &str) -> String {
    let cleaned: String = value.chars().filter(|c| *c != '\0').collect();
    format!("'{}'", cleaned.replace('\'', "''"))
}

/// Quoted literal followed by a type cast, e.g. `'1.5'::numeric`
pub fn cast_literal(value: &str, sql_type: &str) -> String {
    format!("{}::{}", quote_literal(value), sql_type.to_lowercase())
}

pub fn uuid_literal(id: Uuid) -> String {
    format!("'{}'::uuid", id)
}

/// Column of a `CREATE TABLE` statement
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: String,
    pub primary_key: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            primary_key: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// Foreign key from one column to a column of another table
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey<'a> {
    pub name: &'a str,
    pub column: &'a str,
    pub ref_schema: &'a str,
    pub ref_table: &'a str,
    pub ref_column: &'a str,
}

pub fn drop_schema(schema: &str) -> String {
    format!("DROP SCHEMA IF EXISTS {} CASCADE;", quote_identifier(schema))
}

pub fn create_schema(schema: &str) -> String {
    format!("CREATE SCHEMA {};", quote_identifier(schema))
}

pub fn drop_table(schema: &str, table: &str) -> String {
    format!("DROP TABLE IF EXISTS {};", qualified(schema, table))
}

pub fn create_table(schema: &str, table: &str, columns: &[ColumnDef]) -> String {
    let columns: Vec<String> = columns
        .iter()
        .map(|c| {
            let mut def = format!("{} {}", quote_identifier(&c.name), c.sql_type);
            if c.primary_key {
                def.push_str(" PRIMARY KEY");
            }
            def
        })
        .collect();
    format!(
        "CREATE TABLE {} ({});",
        qualified(schema, table),
        columns.join(", ")
    )
}

pub fn add_column(schema: &str, table: &str, column: &str, sql_type: &str) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN {} {};",
        qualified(schema, table),
        quote_identifier(column),
        sql_type
    )
}

pub fn add_foreign_key(schema: &str, table: &str, fk: &ForeignKey<'_>) -> String {
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({});",
        qualified(schema, table),
        quote_identifier(fk.name),
        quote_identifier(fk.column),
        qualified(fk.ref_schema, fk.ref_table),
        quote_identifier(fk.ref_column)
    )
}

pub fn create_spatial_index(schema: &str, table: &str, index: &str, column: &str) -> String {
    format!(
        "CREATE INDEX {} ON {} USING GIST ({});",
        quote_identifier(index),
        qualified(schema, table),
        quote_identifier(column)
    )
}

pub fn comment_on_table(schema: &str, table: &str, comment: &str) -> String {
    format!(
        "COMMENT ON TABLE {} IS {};",
        qualified(schema, table),
        quote_literal(comment)
    )
}

pub fn comment_on_column(schema: &str, table: &str, column: &str, comment: &str) -> String {
    format!(
        "COMMENT ON COLUMN {}.{} IS {};",
        qualified(schema, table),
        quote_identifier(column),
        quote_literal(comment)
    )
}

/// `INSERT` of already-rendered value expressions
pub fn insert(schema: &str, table: &str, columns: &[&str], values: &[String]) -> String {
    let columns: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        qualified(schema, table),
        columns.join(", "),
        values.join(", ")
    )
}

/// `UPDATE` of a single column on the row with the given key
pub fn update(
    schema: &str,
    table: &str,
    column: &str,
    value: &str,
    key_column: &str,
    key: Uuid,
) -> String {
    format!(
        "UPDATE {} SET {} = {} WHERE {} = {};",
        qualified(schema, table),
        quote_identifier(column),
        value,
        quote_identifier(key_column),
        uuid_literal(key)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("name"), "\"name\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
        assert_eq!(quote_literal("a\0b"), "'ab'");
        assert_eq!(cast_literal("12.5", "NUMERIC"), "'12.5'::numeric");
    }

    #[test]
    fn test_render_orders_phases() {
        let mut script = SqlScript::new();
        script.push(Phase::Constraints, "C;");
        script.push(Phase::Data, "D;");
        script.push(Phase::Tables, "T;");

        let rendered = script.render();
        let t = rendered.find("T;").unwrap();
        let d = rendered.find("D;").unwrap();
        let c = rendered.find("C;").unwrap();
        assert!(t < d && d < c);
        assert!(rendered.starts_with("-- tables\n"));
        assert!(!rendered.contains("-- columns and indexes"));
    }

    #[test]
    fn test_create_table() {
        let sql = create_table(
            "monument",
            "phase",
            &[
                ColumnDef::new("phase_id", "UUID").primary_key(),
                ColumnDef::new("monument_id", "UUID"),
            ],
        );
        assert_eq!(
            sql,
            "CREATE TABLE \"monument\".\"phase\" (\"phase_id\" UUID PRIMARY KEY, \"monument_id\" UUID);"
        );
    }

    #[test]
    fn test_extend_keeps_phases() {
        let mut a = SqlScript::new();
        a.push(Phase::Tables, "A;");
        let mut b = SqlScript::new();
        b.push(Phase::Tables, "B;");
        b.push(Phase::Data, "E;");
        a.extend(b);
        assert_eq!(a.statements(Phase::Tables), ["A;", "B;"]);
        assert_eq!(a.len(), 3);
    }
}
