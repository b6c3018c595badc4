//! relgraph - resolves join paths between relational tables by treating
//! foreign keys (and a handful of declared relationships) as edges in a
//! weighted graph.
//!
//! - `catalog` ingests a live database's tables/columns/functions into a
//!   normalized, content-hashed snapshot.
//! - `schema` turns a catalog into a graph: one node per table, one edge
//!   pair per relationship.
//! - `resolver` finds the best join path between two tables over that
//!   graph.
//! - `digraph` is the generic weighted-multigraph primitive the schema is
//!   built on; it knows nothing about tables or columns.

pub mod catalog;
pub mod config;
pub mod digraph;
pub mod errors;
pub mod resolver;
pub mod schema;
