//! `get_catalog`: runs the bundled introspection statements, normalizes
//! the raw rows into a canonical [`Catalog`], and returns it together
//! with any non-fatal warnings observed along the way.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use regex::Regex;

use super::dialect::statements_for;
use super::{Catalog, Column, ForeignKey, Function, ParamSpec, Table, TableKind};
use crate::config::Dialect;
use crate::errors::{CatalogWarning, RelgraphError};

use super::db::Database;

/// Tables whose unqualified name starts with this prefix are discarded
/// entirely — never emitted, never merely blocked (spec §4.2).
const RESERVED_TABLE_PREFIX: &str = "_gj_";

#[derive(Debug, Clone)]
struct ColumnFragment {
    schema: String,
    table: String,
    name: String,
    sql_type: String,
    not_null: bool,
    is_primary_key: bool,
    has_unique: bool,
    is_array: bool,
    is_full_text: bool,
    foreign_key: Option<ForeignKey>,
}

/// Execute the dialect's introspection statements and normalize their
/// rows into a `Catalog`. Runs the three queries in parallel; if any one
/// fails the whole operation fails with `IntrospectionFailure`.
pub async fn get_catalog(
    db: &dyn Database,
    dialect: Dialect,
    blocklist: &[String],
) -> Result<Catalog, RelgraphError> {
    let stmts = statements_for(dialect);

    let (info_row, column_rows, function_rows) = tokio::try_join!(
        db.query_row(stmts.info),
        db.query(stmts.columns),
        db.query(stmts.functions),
    )
    .map_err(|e| RelgraphError::IntrospectionFailure {
        dialect: dialect.as_str().to_string(),
        cause: e.0,
    })?;

    let dialect_version = info_row.i64(0);
    let default_schema = info_row.text(1);
    let database_name = info_row.text(2);
    debug!(
        "introspected {} {}: version {}, default schema `{}`, {} column rows, {} function rows",
        dialect.as_str(),
        database_name,
        dialect_version,
        default_schema,
        column_rows.len(),
        function_rows.len()
    );

    let blocklist_patterns = compile_blocklist(blocklist)?;

    let mut warnings = Vec::new();
    let merged = merge_columns(column_rows, &mut warnings);
    let functions = group_functions(function_rows);

    let mut tables = build_tables(merged, &blocklist_patterns, &mut warnings);
    tables.extend(function_backed_tables(&functions));
    tables.retain(|t| !t.name.starts_with(RESERVED_TABLE_PREFIX));

    if !warnings.is_empty() {
        warn!("catalog ingestion produced {} warning(s)", warnings.len());
    }

    let content_hash = compute_content_hash(
        dialect,
        dialect_version,
        &default_schema,
        &database_name,
        &tables,
        &functions,
    );

    info!(
        "catalog ready: {} tables, {} functions",
        tables.len(),
        functions.len()
    );

    Ok(Catalog {
        dialect,
        dialect_version,
        default_schema,
        database_name,
        tables,
        functions,
        content_hash,
        warnings,
    })
}

fn compile_blocklist(patterns: &[String]) -> Result<Vec<Regex>, RelgraphError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(&format!("^{p}$")).map_err(|e| RelgraphError::IntrospectionFailure {
                dialect: "blocklist".to_string(),
                cause: format!("invalid pattern `{p}`: {e}"),
            })
        })
        .collect()
}

fn table_blocked(name: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|re| re.is_match(name))
}

fn column_blocked(table: &str, column: &str, patterns: &[Regex]) -> bool {
    let qualified = format!("{table}.{column}");
    let wildcard = format!("*.{column}");
    patterns
        .iter()
        .any(|re| re.is_match(&qualified) || re.is_match(&wildcard))
}

/// Merge duplicate `(schema, table, column)` rows with OR-semantics on
/// boolean flags, last-non-empty-wins on FK target fields, and
/// first-seen-wins (with a warning) on any other disagreement.
fn merge_columns(
    rows: Vec<super::Row>,
    warnings: &mut Vec<CatalogWarning>,
) -> BTreeMap<(String, String, String), ColumnFragment> {
    let mut merged: BTreeMap<(String, String, String), ColumnFragment> = BTreeMap::new();

    for row in rows {
        let schema = row.text(0);
        let table = row.text(1);
        let column = row.text(2);
        let sql_type = row.text(3);
        let not_null = row.bool(4);
        let is_primary_key = row.bool(5);
        let has_unique = row.bool(6);
        let is_array = row.bool(7);
        let is_full_text = row.bool(8);
        let fk_schema = row.opt_text(9);
        let fk_table = row.opt_text(10);
        let fk_column = row.opt_text(11);
        let foreign_key = match (fk_schema, fk_table, fk_column) {
            (Some(s), Some(t), Some(c)) => Some(ForeignKey {
                target_schema: s,
                target_table: t,
                target_column: c,
            }),
            _ => None,
        };

        let key = (schema.clone(), table.clone(), column.clone());
        let incoming = ColumnFragment {
            schema,
            table,
            name: column,
            sql_type,
            not_null,
            is_primary_key,
            has_unique,
            is_array,
            is_full_text,
            foreign_key,
        };

        merged
            .entry(key)
            .and_modify(|existing| merge_one(existing, &incoming, warnings))
            .or_insert(incoming);
    }

    merged
}

fn merge_one(
    existing: &mut ColumnFragment,
    incoming: &ColumnFragment,
    warnings: &mut Vec<CatalogWarning>,
) {
    if !incoming.sql_type.is_empty() {
        if existing.sql_type.is_empty() {
            existing.sql_type = incoming.sql_type.clone();
        } else if existing.sql_type != incoming.sql_type {
            warnings.push(CatalogWarning::DuplicateColumnConflict {
                schema: existing.schema.clone(),
                table: existing.table.clone(),
                column: existing.name.clone(),
                field: "sql_type".to_string(),
            });
        }
    }
    existing.not_null |= incoming.not_null;
    existing.is_primary_key |= incoming.is_primary_key;
    existing.has_unique |= incoming.has_unique;
    existing.is_array |= incoming.is_array;
    existing.is_full_text |= incoming.is_full_text;
    if incoming.foreign_key.is_some() {
        existing.foreign_key = incoming.foreign_key.clone();
    }
}

/// Group the sorted, merged column map into `Table` records, applying
/// blocklist flags and self-referential-FK detection along the way.
fn build_tables(
    merged: BTreeMap<(String, String, String), ColumnFragment>,
    blocklist: &[Regex],
    warnings: &mut Vec<CatalogWarning>,
) -> Vec<Table> {
    let mut by_table: BTreeMap<(String, String), Vec<ColumnFragment>> = BTreeMap::new();
    for ((schema, table, _column), frag) in merged {
        by_table
            .entry((schema, table))
            .or_default()
            .push(frag);
    }

    let mut tables = Vec::new();
    for ((schema, name), frags) in by_table {
        let table_blocked_flag = table_blocked(&name, blocklist);
        let mut columns = Vec::with_capacity(frags.len());
        let mut full_text_cols = Vec::new();
        let mut primary_col: Option<String> = None;

        for frag in frags {
            let is_recursive_fk = frag
                .foreign_key
                .as_ref()
                .is_some_and(|fk| fk.target_schema == frag.schema && fk.target_table == frag.table);
            let blocked = column_blocked(&name, &frag.name, blocklist);

            if frag.is_primary_key {
                match &primary_col {
                    None => primary_col = Some(frag.name.clone()),
                    Some(first) => warnings.push(CatalogWarning::MultiplePrimaryKeys {
                        schema: schema.clone(),
                        table: name.clone(),
                        kept: first.clone(),
                        dropped: frag.name.clone(),
                    }),
                }
            }
            if frag.is_full_text {
                full_text_cols.push(frag.name.clone());
            }

            columns.push(Column {
                schema: frag.schema,
                table: frag.table,
                name: frag.name,
                sql_type: frag.sql_type,
                is_array: frag.is_array,
                not_null: frag.not_null,
                is_primary_key: frag.is_primary_key,
                has_unique: frag.has_unique,
                is_full_text: frag.is_full_text,
                foreign_key: frag.foreign_key,
                is_recursive_fk,
                blocked,
            });
        }

        tables.push(Table {
            schema,
            name,
            kind: TableKind::Base,
            columns,
            primary_col,
            full_text_cols,
            backing_function: None,
            blocked: table_blocked_flag,
            declaration: super::TableDeclaration::None,
        });
    }

    tables
}

fn group_functions(rows: Vec<super::Row>) -> Vec<Function> {
    let mut by_fn: BTreeMap<(String, String), Function> = BTreeMap::new();

    for row in rows {
        let schema = row.text(0);
        let name = row.text(1);
        let return_type = row.text(2);
        let is_aggregate = row.bool(3);
        let key = (schema.clone(), name.clone());
        let entry = by_fn.entry(key).or_insert_with(|| Function {
            schema,
            name,
            return_type,
            is_aggregate,
            inputs: Vec::new(),
            outputs: Vec::new(),
        });

        let Some(ordinal) = row.opt_i64(4) else {
            continue; // parameterless function: one row, null parameter fields
        };
        let param_name = row.text(5);
        let param_type = row.text(6);
        let param_mode = row.text(7);
        let param_is_array = row.bool(8);
        let spec = ParamSpec {
            position: ordinal,
            name: param_name,
            type_name: param_type,
            is_array: param_is_array,
        };
        if param_mode.eq_ignore_ascii_case("out") {
            entry.outputs.push(spec);
        } else {
            entry.inputs.push(spec);
        }
    }

    for f in by_fn.values_mut() {
        f.inputs.sort_by_key(|p| p.position);
        f.outputs.sort_by_key(|p| p.position);
    }

    by_fn.into_values().collect()
}

fn function_backed_tables(functions: &[Function]) -> Vec<Table> {
    functions
        .iter()
        .filter(|f| f.is_table_like())
        .map(|f| {
            let columns = f
                .outputs
                .iter()
                .map(|out| Column {
                    schema: f.schema.clone(),
                    table: f.name.clone(),
                    name: out.name.clone(),
                    sql_type: out.type_name.clone(),
                    is_array: out.is_array,
                    not_null: false,
                    is_primary_key: false,
                    has_unique: false,
                    is_full_text: false,
                    foreign_key: None,
                    is_recursive_fk: false,
                    blocked: false,
                })
                .collect();
            Table {
                schema: f.schema.clone(),
                name: f.name.clone(),
                kind: TableKind::Function,
                columns,
                primary_col: None,
                full_text_cols: Vec::new(),
                backing_function: Some(f.name.clone()),
                blocked: false,
                declaration: super::TableDeclaration::None,
            }
        })
        .collect()
}

fn compute_content_hash(
    dialect: Dialect,
    version: i64,
    schema: &str,
    name: &str,
    tables: &[Table],
    functions: &[Function],
) -> u128 {
    let mut buf = format!("{}|{}|{}|{}", dialect.as_str(), version, schema, name);
    for table in tables {
        for column in &table.columns {
            buf.push('|');
            buf.push_str(&column.canonical_string());
        }
    }
    for function in functions {
        buf.push('|');
        buf.push_str(&function.canonical_string());
    }
    fnv128(buf.as_bytes())
}

/// FNV-1a, 128-bit variant. Public-domain constants; see
/// <http://www.isthe.com/chongo/tech/comp/fnv/> for the offset basis and
/// prime this implements.
fn fnv128(data: &[u8]) -> u128 {
    const OFFSET_BASIS: u128 = 0x6c62272e07bb014262b821756295c58d;
    const PRIME: u128 = (1u128 << 88) + 0x13B;
    let mut hash = OFFSET_BASIS;
    for &byte in data {
        hash ^= byte as u128;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv128_is_deterministic_and_sensitive_to_input() {
        let a = fnv128(b"hello");
        let b = fnv128(b"hello");
        let c = fnv128(b"hellp");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn blocklist_compiles_anchored_patterns() {
        let patterns = compile_blocklist(&["audit_.*".to_string()]).unwrap();
        assert!(table_blocked("audit_log", &patterns));
        assert!(!table_blocked("my_audit_log", &patterns));
    }

    #[test]
    fn wildcard_column_blocklist_matches_any_table() {
        let patterns = compile_blocklist(&[r"\*\.password".to_string()]).unwrap();
        assert!(column_blocked("users", "password", &patterns));
        assert!(column_blocked("admins", "password", &patterns));
        assert!(!column_blocked("users", "email", &patterns));
    }
}
