//! The external collaborator boundary: a row-executing database handle.
//!
//! This crate never opens a connection itself. Callers hand in anything
//! implementing [`Database`] — a pooled driver, a test double, whatever —
//! and the ingester only ever runs parameterless statements returning
//! rows or a single scalar row.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct DbError(pub String);

impl DbError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// A single positional, dynamically-typed column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    Text(String),
}

/// One result row. Extraction is positional, matching the declared types
/// of the corresponding `SELECT` (spec §6) — there is no column-name
/// lookup, only ordinal access.
#[derive(Debug, Clone, Default)]
pub struct Row(pub Vec<Value>);

impl Row {
    pub fn text(&self, idx: usize) -> String {
        self.opt_text(idx).unwrap_or_default()
    }

    pub fn opt_text(&self, idx: usize) -> Option<String> {
        match self.0.get(idx) {
            Some(Value::Text(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    pub fn bool(&self, idx: usize) -> bool {
        matches!(self.0.get(idx), Some(Value::Bool(true)))
    }

    pub fn i64(&self, idx: usize) -> i64 {
        match self.0.get(idx) {
            Some(Value::I64(n)) => *n,
            _ => 0,
        }
    }

    pub fn opt_i64(&self, idx: usize) -> Option<i64> {
        match self.0.get(idx) {
            Some(Value::I64(n)) => Some(*n),
            _ => None,
        }
    }
}

/// Database handle consumed by [`crate::catalog::ingest::get_catalog`].
/// No transactions, no prepared statements, no parameters — only
/// parameterless statements whose result shape is fixed per spec §6.
#[async_trait]
pub trait Database: Send + Sync {
    async fn query(&self, sql: &str) -> Result<Vec<Row>, DbError>;
    async fn query_row(&self, sql: &str) -> Result<Row, DbError>;
}
