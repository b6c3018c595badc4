//! Catalog normalization (component C): the canonical, immutable
//! table/column/function model produced by introspecting a live database.

pub mod db;
pub mod dialect;
pub mod ingest;

pub use db::{DbError, Database, Row, Value};
pub use ingest::get_catalog;

use crate::config::Dialect;
use crate::errors::CatalogWarning;
use serde::{Deserialize, Serialize};

/// A foreign-key target: the three fields are all non-empty whenever a
/// `Column` carries one (spec §3 invariant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub target_schema: String,
    pub target_table: String,
    pub target_column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub sql_type: String,
    pub is_array: bool,
    pub not_null: bool,
    pub is_primary_key: bool,
    pub has_unique: bool,
    pub is_full_text: bool,
    pub foreign_key: Option<ForeignKey>,
    /// `foreign_key.target_table == table` — detected, not declared.
    pub is_recursive_fk: bool,
    pub blocked: bool,
}

impl Column {
    /// `schema:table.column`, used as the merge key during ingestion and
    /// for error messages.
    pub fn qualified_name(&self) -> String {
        format!("{}:{}.{}", self.schema, self.table, self.name)
    }

    /// Canonical string form used as input to the Catalog content hash
    /// (spec §4.2) — every field that can vary between two otherwise
    /// "same" catalogs must appear here.
    pub fn canonical_string(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
            self.schema,
            self.table,
            self.name,
            self.sql_type,
            self.is_array,
            self.not_null,
            self.is_primary_key,
            self.has_unique,
            self.is_full_text,
            self.foreign_key
                .as_ref()
                .map(|fk| format!("{}.{}.{}", fk.target_schema, fk.target_table, fk.target_column))
                .unwrap_or_default(),
            self.blocked,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableKind {
    Base,
    View,
    Function,
    Virtual,
    Embedded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub position: i64,
    pub name: String,
    pub type_name: String,
    pub is_array: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub schema: String,
    pub name: String,
    pub return_type: String,
    pub is_aggregate: bool,
    pub inputs: Vec<ParamSpec>,
    pub outputs: Vec<ParamSpec>,
}

impl Function {
    pub fn canonical_string(&self) -> String {
        let fmt_params = |params: &[ParamSpec]| {
            params
                .iter()
                .map(|p| format!("{}:{}:{}:{}", p.position, p.name, p.type_name, p.is_array))
                .collect::<Vec<_>>()
                .join(",")
        };
        format!(
            "{}|{}|{}|{}|[{}]|[{}]",
            self.schema,
            self.name,
            self.return_type,
            self.is_aggregate,
            fmt_params(&self.inputs),
            fmt_params(&self.outputs),
        )
    }

    /// A function is admitted as a function-backed table iff its return
    /// type is the record sentinel and it has at least one output
    /// parameter (spec §4.2).
    pub fn is_table_like(&self) -> bool {
        self.return_type == dialect::RECORD_SENTINEL && !self.outputs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub kind: TableKind,
    pub columns: Vec<Column>,
    /// Name of the column with `is_primary_key`, if any. Kept as a name
    /// rather than an index so callers don't need to worry about it
    /// dangling across a future `columns` mutation (there is none post-
    /// construction, but the indirection costs nothing).
    pub primary_col: Option<String>,
    pub full_text_cols: Vec<String>,
    pub backing_function: Option<String>,
    pub blocked: bool,
    /// A polymorphic/embedded/remote relationship declared for this
    /// table, not inferred from its columns. Spec leaves the production
    /// of these declarations to a higher layer (YAML hints, caller
    /// code); the schema builder (component D) only consumes them.
    #[serde(default)]
    pub declaration: TableDeclaration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableDeclaration {
    #[default]
    None,
    Polymorphic {
        column: String,
        targets: Vec<PolymorphicTarget>,
    },
    Embedded {
        column: String,
        target_table: String,
        target_column: String,
    },
    Remote {
        column: String,
        target_table: String,
        target_column: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolymorphicTarget {
    pub target_table: String,
    pub target_column: String,
}

impl Table {
    pub fn key(&self) -> String {
        format!("{}:{}", self.schema, self.name)
    }

    pub fn primary_column(&self) -> Option<&Column> {
        self.primary_col
            .as_ref()
            .and_then(|name| self.columns.iter().find(|c| &c.name == name))
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub dialect: Dialect,
    pub dialect_version: i64,
    pub default_schema: String,
    pub database_name: String,
    pub tables: Vec<Table>,
    pub functions: Vec<Function>,
    pub content_hash: u128,
    #[serde(skip)]
    pub warnings: Vec<CatalogWarning>,
}

impl Catalog {
    pub fn warnings(&self) -> &[CatalogWarning] {
        &self.warnings
    }

    pub fn content_hash(&self) -> u128 {
        self.content_hash
    }

    pub fn table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.schema == schema && t.name == name)
    }
}
