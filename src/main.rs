//! Demo CLI: ingests a small in-memory catalog and resolves a join path
//! between two of its tables.
//!
//! There is no bundled database driver — plugging in a real one is a
//! matter of implementing `relgraph::catalog::Database` against a pooled
//! connection, which is out of scope here. This binary instead seeds an
//! in-memory `Database` with the blog schema (users/posts/comments) used
//! throughout the test suite, so `get_catalog` -> `new_schema` ->
//! `find_path` can be exercised end to end from the command line.

use std::collections::HashMap;

use async_trait::async_trait;
use clap::Parser;

use relgraph::catalog::{get_catalog, Database, DbError, Row, Value};
use relgraph::config::{Dialect, IngestConfig};
use relgraph::schema::new_schema;

/// relgraph - resolve a join path between two tables over their foreign keys.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dialect the demo catalog reports (doesn't change the bundled data,
    /// only `Catalog::dialect`)
    #[arg(long, default_value = "postgres")]
    dialect: String,

    /// Origin table
    #[arg(long)]
    from: String,

    /// Destination table
    #[arg(long)]
    to: String,

    /// Require the path to pass through this table
    #[arg(long, default_value = "")]
    through: String,

    /// Extra alias, as KEY=ALIAS (repeatable)
    #[arg(long = "alias", value_parser = parse_alias)]
    aliases: Vec<(String, String)>,

    /// Extra blocklist pattern (repeatable)
    #[arg(long = "block")]
    block: Vec<String>,
}

fn parse_alias(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=ALIAS, got `{s}`"))
}

/// Fixed in-memory "database" serving the blog schema: `user(id, name)`,
/// `post(id, user_id -> user.id)`, `comment(id, post_id -> post.id,
/// user_id -> user.id)`. Ignores the statement text entirely — it just
/// returns the right shape for whichever of the three introspection
/// queries is asked.
struct BlogDatabase;

#[async_trait]
impl Database for BlogDatabase {
    async fn query(&self, sql: &str) -> Result<Vec<Row>, DbError> {
        if sql.contains("pg_proc") || sql.contains("information_schema.routines") {
            Ok(Vec::new())
        } else {
            Ok(blog_columns())
        }
    }

    async fn query_row(&self, _sql: &str) -> Result<Row, DbError> {
        Ok(Row(vec![
            Value::I64(150_000),
            Value::Text("public".to_string()),
            Value::Text("blog".to_string()),
        ]))
    }
}

#[allow(clippy::too_many_arguments)]
fn column_row(
    schema: &str,
    table: &str,
    column: &str,
    sql_type: &str,
    not_null: bool,
    primary_key: bool,
    unique: bool,
    fk: Option<(&str, &str, &str)>,
) -> Row {
    let (fk_schema, fk_table, fk_column) = match fk {
        Some((s, t, c)) => (
            Value::Text(s.to_string()),
            Value::Text(t.to_string()),
            Value::Text(c.to_string()),
        ),
        None => (Value::Null, Value::Null, Value::Null),
    };
    Row(vec![
        Value::Text(schema.to_string()),
        Value::Text(table.to_string()),
        Value::Text(column.to_string()),
        Value::Text(sql_type.to_string()),
        Value::Bool(not_null),
        Value::Bool(primary_key),
        Value::Bool(unique),
        Value::Bool(false),
        Value::Bool(false),
        fk_schema,
        fk_table,
        fk_column,
    ])
}

fn blog_columns() -> Vec<Row> {
    vec![
        column_row("public", "user", "id", "int4", true, true, true, None),
        column_row("public", "user", "name", "text", true, false, false, None),
        column_row("public", "post", "id", "int4", true, true, true, None),
        column_row(
            "public",
            "post",
            "user_id",
            "int4",
            true,
            false,
            false,
            Some(("public", "user", "id")),
        ),
        column_row("public", "comment", "id", "int4", true, true, true, None),
        column_row(
            "public",
            "comment",
            "post_id",
            "int4",
            true,
            false,
            false,
            Some(("public", "post", "id")),
        ),
        column_row(
            "public",
            "comment",
            "user_id",
            "int4",
            true,
            false,
            false,
            Some(("public", "user", "id")),
        ),
    ]
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let cli = Cli::parse();
    println!("\nrelgraph v{}\n", env!("CARGO_PKG_VERSION"));

    let dialect: Dialect = match cli.dialect.parse() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let config = IngestConfig {
        dialect,
        blocklist: cli.block,
        ..IngestConfig::default()
    };

    let db = BlogDatabase;
    let catalog = match get_catalog(&db, config.dialect, &config.blocklist).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("catalog ingestion failed: {e}");
            std::process::exit(1);
        }
    };

    for warning in catalog.warnings() {
        log::warn!("{warning}");
    }

    let mut aliases: HashMap<String, Vec<String>> = HashMap::new();
    for (key, alias) in cli.aliases {
        aliases.entry(key).or_default().push(alias);
    }

    let schema = match new_schema(catalog, aliases) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("schema build failed: {e}");
            std::process::exit(1);
        }
    };

    match schema.find_path(&cli.from, &cli.to, &cli.through) {
        Ok(steps) => {
            println!(
                "{} hop(s) from `{}` to `{}`:",
                steps.len(),
                cli.from,
                cli.to
            );
            for step in steps {
                println!(
                    "  {}.{} -> {}.{} via `{}` ({:?}, edge #{})",
                    step.left_table,
                    step.left_column,
                    step.right_table,
                    step.right_column,
                    step.relation_name,
                    step.kind,
                    step.edge_id
                );
            }
        }
        Err(e) => {
            eprintln!("path resolution failed: {e}");
            std::process::exit(1);
        }
    }
}
