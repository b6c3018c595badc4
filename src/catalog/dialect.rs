//! Bundled introspection statements, one set per dialect.
//!
//! These are opaque resources as far as this crate's logic is concerned —
//! only their result-row shape (spec §6) matters. They're kept as static
//! text rather than loaded from disk so a `Database` impl backed by a
//! real driver can run them verbatim.

use crate::config::Dialect;

/// Sentinel return-type string a function must report to be admitted as
/// a function-backed table (spec §4.2: "return-type is the record
/// sentinel string").
pub const RECORD_SENTINEL: &str = "record";

pub struct IntrospectionStatements {
    pub info: &'static str,
    pub columns: &'static str,
    pub functions: &'static str,
}

pub fn statements_for(dialect: Dialect) -> IntrospectionStatements {
    match dialect {
        Dialect::Postgres => IntrospectionStatements {
            info: POSTGRES_INFO,
            columns: POSTGRES_COLUMNS,
            functions: POSTGRES_FUNCTIONS,
        },
        Dialect::Mysql => IntrospectionStatements {
            info: MYSQL_INFO,
            columns: MYSQL_COLUMNS,
            functions: MYSQL_FUNCTIONS,
        },
    }
}

const POSTGRES_INFO: &str = r#"
SELECT
    current_setting('server_version_num')::int AS version,
    current_schema() AS default_schema,
    current_database() AS database_name
"#;

const POSTGRES_COLUMNS: &str = r#"
SELECT
    c.table_schema AS schema,
    c.table_name AS table,
    c.column_name AS column,
    c.udt_name AS sql_type,
    (c.is_nullable = 'NO') AS not_null,
    COALESCE(pk.is_primary_key, false) AS primary_key,
    COALESCE(uq.is_unique, false) AS unique_key,
    (c.data_type = 'ARRAY') AS is_array,
    (c.udt_name = 'tsvector') AS full_text,
    fk.fk_schema,
    fk.fk_table,
    fk.fk_column
FROM information_schema.columns c
LEFT JOIN _relgraph_primary_keys pk
    ON pk.table_schema = c.table_schema AND pk.table_name = c.table_name AND pk.column_name = c.column_name
LEFT JOIN _relgraph_unique_keys uq
    ON uq.table_schema = c.table_schema AND uq.table_name = c.table_name AND uq.column_name = c.column_name
LEFT JOIN _relgraph_foreign_keys fk
    ON fk.table_schema = c.table_schema AND fk.table_name = c.table_name AND fk.column_name = c.column_name
ORDER BY c.table_schema, c.table_name, c.column_name
"#;

const POSTGRES_FUNCTIONS: &str = r#"
SELECT
    n.nspname AS func_schema,
    p.proname AS func_name,
    t.typname AS return_type,
    p.proisagg AS is_aggregate,
    a.ordinal_position AS param_ordinal,
    a.parameter_name AS param_name,
    a.data_type AS param_type,
    a.parameter_mode AS param_mode,
    (a.data_type LIKE '%[]') AS param_is_array
FROM pg_proc p
JOIN pg_namespace n ON n.oid = p.pronamespace
JOIN pg_type t ON t.oid = p.prorettype
LEFT JOIN information_schema.parameters a
    ON a.specific_schema = n.nspname AND a.specific_name = p.proname || '_' || p.oid
ORDER BY func_schema, func_name, param_ordinal
"#;

const MYSQL_INFO: &str = r#"
SELECT
    (SELECT VERSION()) AS version,
    DATABASE() AS default_schema,
    DATABASE() AS database_name
"#;

const MYSQL_COLUMNS: &str = r#"
SELECT
    c.table_schema AS schema,
    c.table_name AS table,
    c.column_name AS column,
    c.data_type AS sql_type,
    (c.is_nullable = 'NO') AS not_null,
    (c.column_key = 'PRI') AS primary_key,
    (c.column_key = 'UNI') AS unique_key,
    FALSE AS is_array,
    FALSE AS full_text,
    k.referenced_table_schema AS fk_schema,
    k.referenced_table_name AS fk_table,
    k.referenced_column_name AS fk_column
FROM information_schema.columns c
LEFT JOIN information_schema.key_column_usage k
    ON k.table_schema = c.table_schema
   AND k.table_name = c.table_name
   AND k.column_name = c.column_name
   AND k.referenced_table_name IS NOT NULL
ORDER BY c.table_schema, c.table_name, c.column_name
"#;

const MYSQL_FUNCTIONS: &str = r#"
SELECT
    r.routine_schema AS func_schema,
    r.routine_name AS func_name,
    r.dtd_identifier AS return_type,
    FALSE AS is_aggregate,
    p.ordinal_position AS param_ordinal,
    p.parameter_name AS param_name,
    p.dtd_identifier AS param_type,
    p.parameter_mode AS param_mode,
    (p.dtd_identifier LIKE '%[]') AS param_is_array
FROM information_schema.routines r
LEFT JOIN information_schema.parameters p
    ON p.specific_schema = r.routine_schema AND p.specific_name = r.routine_name
ORDER BY func_schema, func_name, param_ordinal
"#;
