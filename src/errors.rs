//! Crate-wide error types.
//!
//! Fatal failures surface through [`RelgraphError`]. Non-fatal conditions
//! (duplicate column fragments, multiple primary-key candidates) are
//! never raised as errors — they accumulate as [`CatalogWarning`]s on the
//! `Catalog` they were observed in, per spec: a warning never aborts
//! ingestion.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RelgraphError {
    #[error("introspection failed for dialect {dialect}: {cause}")]
    IntrospectionFailure { dialect: String, cause: String },

    #[error("no edge found for identifier `{name}`")]
    FromEdgeNotFound { name: String },

    #[error("no edge found for identifier `{name}`")]
    ToEdgeNotFound { name: String },

    #[error("`through` table `{name}` is not a registered node")]
    ThroughNodeNotFound { name: String },

    #[error("no path connects `{from}` to `{to}`")]
    PathNotFound { from: String, to: String },

    #[error("ingestion canceled")]
    Canceled,

    #[error("failed to register {what} while building schema: {reason}")]
    SchemaBuildFailure { what: String, reason: String },
}

/// A non-fatal condition observed while normalizing a [`crate::catalog::Catalog`].
///
/// Never aborts ingestion; callers read these off `Catalog::warnings()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWarning {
    /// Two input rows for the same `(schema, table, column)` disagreed on a
    /// non-boolean, non-FK field; the first-seen value was kept.
    DuplicateColumnConflict {
        schema: String,
        table: String,
        column: String,
        field: String,
    },
    /// More than one column in a table claimed `is_primary_key`; the first
    /// in column order was kept as `primary_col`.
    MultiplePrimaryKeys {
        schema: String,
        table: String,
        kept: String,
        dropped: String,
    },
}

impl std::fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogWarning::DuplicateColumnConflict {
                schema,
                table,
                column,
                field,
            } => write!(
                f,
                "duplicate column rows for {schema}.{table}.{column} disagree on `{field}`; kept first-seen value"
            ),
            CatalogWarning::MultiplePrimaryKeys {
                schema,
                table,
                kept,
                dropped,
            } => write!(
                f,
                "table {schema}.{table} has multiple primary-key columns ({kept}, {dropped}, ...); kept `{kept}`"
            ),
        }
    }
}
