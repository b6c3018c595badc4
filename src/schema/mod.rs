//! Schema builder (component D): consumes a [`Catalog`], registers one
//! graph node per table, one edge pair per relationship, and the
//! name-keyed index that lets the path resolver (component E) turn a
//! caller-supplied identifier into a candidate set of edges.

pub mod relation;

pub use relation::{derive_relation_name, Edge, RelType};

use std::collections::{HashMap, HashSet};

use crate::catalog::{Catalog, Table, TableDeclaration};
use crate::digraph::{Digraph, EdgeId, NodeId};
use crate::errors::RelgraphError;

/// Index entry: the adjacent node reachable under a lookup name, and the
/// edge IDs that reach it. `edges_by_name` is a genuine multimap — two
/// different relationships can register the same lookup name pointing at
/// different nodes, and both survive as separate `EdgeHandle`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeHandle {
    pub node_id: NodeId,
    pub edges: Vec<EdgeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedNode {
    pub table: String,
    pub relation_name: String,
    pub kind: RelType,
}

/// The live relationship graph plus lookup indices. Built once by
/// [`new_schema`], then immutable and safe for any number of concurrent
/// readers — nothing here is behind interior mutability.
pub struct Schema {
    catalog: Catalog,
    nodes_by_key: HashMap<String, NodeId>,
    edges_by_name: HashMap<String, Vec<EdgeHandle>>,
    all_edges: HashMap<EdgeId, Edge>,
    graph: Digraph,
}

impl Schema {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn graph(&self) -> &Digraph {
        &self.graph
    }

    pub fn edges_by_name(&self) -> &HashMap<String, Vec<EdgeHandle>> {
        &self.edges_by_name
    }

    pub fn all_edges(&self) -> &HashMap<EdgeId, Edge> {
        &self.all_edges
    }

    pub fn node_id(&self, key: &str) -> Option<NodeId> {
        self.nodes_by_key.get(key).copied()
    }

    fn default_key(&self, table: &str) -> String {
        format!("{}:{}", self.catalog.default_schema, table)
    }

    /// `Find`: direct lookup into the underlying catalog by composite key.
    pub fn find(&self, schema: &str, table: &str) -> Option<&Table> {
        self.catalog.table(schema, table)
    }

    pub fn find_path(
        &self,
        from: &str,
        to: &str,
        through: &str,
    ) -> Result<Vec<crate::resolver::JoinStep>, RelgraphError> {
        crate::resolver::find_path(self, from, to, through)
    }

    /// Every table directly reachable from `table` via any edge.
    pub fn first_degree(&self, table: &str) -> Vec<RelatedNode> {
        let Some(&node_id) = self.nodes_by_key.get(&self.default_key(table)) else {
            return Vec::new();
        };
        let mut seen_edges = HashSet::new();
        let mut result = Vec::new();
        for edge in self.all_edges.values() {
            if edge.from_node == node_id && seen_edges.insert(edge.id) {
                result.push(RelatedNode {
                    table: edge.right_table.clone(),
                    relation_name: edge.relation_name.clone(),
                    kind: edge.kind,
                });
            }
        }
        result
    }

    /// `first_degree` composed twice, de-duplicated by target table and
    /// excluding any hop that lands back on `table` itself.
    pub fn second_degree(&self, table: &str) -> Vec<RelatedNode> {
        let mut seen_tables = HashSet::new();
        let mut result = Vec::new();
        for first in self.first_degree(table) {
            for second in self.first_degree(&first.table) {
                if second.table == table {
                    continue;
                }
                if seen_tables.insert(second.table.clone()) {
                    result.push(second);
                }
            }
        }
        result
    }
}

/// Build a `Schema` from a `Catalog` and an alias map (`canonical table
/// name -> [alias, ...]`). Must not be invoked concurrently on the same
/// `Catalog` (spec §5) — the returned `Schema` owns everything it needs
/// and is safe to share across threads from then on.
pub fn new_schema(
    catalog: Catalog,
    aliases: HashMap<String, Vec<String>>,
) -> Result<Schema, RelgraphError> {
    let mut graph = Digraph::new();
    let mut nodes_by_key: HashMap<String, NodeId> = HashMap::new();

    for table in catalog.tables.iter().filter(|t| !t.blocked) {
        let node_id = graph.add_node();
        nodes_by_key.insert(format!("{}:{}", table.schema, table.name), node_id);
    }

    for (name, alias_list) in &aliases {
        if let Some(table) = catalog
            .tables
            .iter()
            .find(|t| t.name == *name && !t.blocked)
        {
            let node_id = *nodes_by_key
                .get(&format!("{}:{}", table.schema, table.name))
                .expect("node registered in the pass above");
            for alias in alias_list {
                nodes_by_key.insert(format!("{}:{}", table.schema, alias), node_id);
            }
        }
    }

    let mut all_edges: HashMap<EdgeId, Edge> = HashMap::new();
    let mut edges_by_name: HashMap<String, Vec<EdgeHandle>> = HashMap::new();

    for table in catalog.tables.iter().filter(|t| !t.blocked) {
        let Some(&lt_node) = nodes_by_key.get(&format!("{}:{}", table.schema, table.name)) else {
            continue;
        };
        for column in &table.columns {
            if column.blocked {
                continue;
            }
            let Some(fk) = &column.foreign_key else {
                continue;
            };
            let Some(&rt_node) =
                nodes_by_key.get(&format!("{}:{}", fk.target_schema, fk.target_table))
            else {
                continue; // target table blocked or otherwise unregistered
            };

            let is_recursive = table.schema == fk.target_schema && table.name == fk.target_table;
            let (fwd_kind, rev_kind) = if is_recursive {
                (RelType::Recursive, RelType::Recursive)
            } else {
                let rev = if column.has_unique {
                    RelType::OneToOne
                } else {
                    RelType::OneToMany
                };
                (RelType::OneToMany, rev)
            };

            insert_edge_pair(
                &mut graph,
                &mut all_edges,
                &mut edges_by_name,
                lt_node,
                rt_node,
                table.name.clone(),
                column.name.clone(),
                fk.target_table.clone(),
                fk.target_column.clone(),
                fwd_kind,
                rev_kind,
            );
        }
    }

    for table in catalog.tables.iter().filter(|t| !t.blocked) {
        let Some(&lt_node) = nodes_by_key.get(&format!("{}:{}", table.schema, table.name)) else {
            continue;
        };
        match &table.declaration {
            TableDeclaration::None => {}
            TableDeclaration::Polymorphic { column, targets } => {
                for target in targets {
                    let Some(rt_node) =
                        resolve_declared_target(&catalog, &nodes_by_key, &table.schema, &target.target_table)?
                    else {
                        continue;
                    };
                    insert_edge_pair(
                        &mut graph,
                        &mut all_edges,
                        &mut edges_by_name,
                        lt_node,
                        rt_node,
                        table.name.clone(),
                        column.clone(),
                        target.target_table.clone(),
                        target.target_column.clone(),
                        RelType::Polymorphic,
                        RelType::Polymorphic,
                    );
                }
            }
            TableDeclaration::Embedded {
                column,
                target_table,
                target_column,
            } => {
                if let Some(rt_node) =
                    resolve_declared_target(&catalog, &nodes_by_key, &table.schema, target_table)?
                {
                    insert_edge_pair(
                        &mut graph,
                        &mut all_edges,
                        &mut edges_by_name,
                        lt_node,
                        rt_node,
                        table.name.clone(),
                        column.clone(),
                        target_table.clone(),
                        target_column.clone(),
                        RelType::Embedded,
                        RelType::Embedded,
                    );
                }
            }
            TableDeclaration::Remote {
                column,
                target_table,
                target_column,
            } => {
                if let Some(rt_node) =
                    resolve_declared_target(&catalog, &nodes_by_key, &table.schema, target_table)?
                {
                    insert_edge_pair(
                        &mut graph,
                        &mut all_edges,
                        &mut edges_by_name,
                        lt_node,
                        rt_node,
                        table.name.clone(),
                        column.clone(),
                        target_table.clone(),
                        target_column.clone(),
                        RelType::Remote,
                        RelType::Remote,
                    );
                }
            }
        }
    }

    Ok(Schema {
        catalog,
        nodes_by_key,
        edges_by_name,
        all_edges,
        graph,
    })
}

/// Resolve a declared relationship's target: `Some(node_id)` if wired
/// in, `None` if the target table exists but was blocked (silently
/// skipped, same as an FK pointing at a blocked table), or a fatal
/// `SchemaBuildFailure` if the name doesn't correspond to any table in
/// the catalog at all — a declaration naming a nonexistent table is a
/// caller error, not something to silently drop.
fn resolve_declared_target(
    catalog: &Catalog,
    nodes_by_key: &HashMap<String, NodeId>,
    schema: &str,
    table: &str,
) -> Result<Option<NodeId>, RelgraphError> {
    if let Some(&id) = nodes_by_key.get(&format!("{schema}:{table}")) {
        return Ok(Some(id));
    }
    if catalog.table(schema, table).is_some() {
        return Ok(None);
    }
    Err(RelgraphError::SchemaBuildFailure {
        what: format!("declared relationship target `{schema}:{table}`"),
        reason: "no such table in catalog".to_string(),
    })
}

#[allow(clippy::too_many_arguments)]
fn insert_edge_pair(
    graph: &mut Digraph,
    all_edges: &mut HashMap<EdgeId, Edge>,
    edges_by_name: &mut HashMap<String, Vec<EdgeHandle>>,
    lt_node: NodeId,
    rt_node: NodeId,
    left_table: String,
    left_column: String,
    right_table: String,
    right_column: String,
    fwd_kind: RelType,
    rev_kind: RelType,
) {
    let relation_name = derive_relation_name(&left_column);
    let (fwd_id, rev_id) = graph.add_edge_pair(
        lt_node,
        rt_node,
        fwd_kind.weight(),
        relation_name.clone(),
        rev_kind.weight(),
        left_table.clone(),
    );

    all_edges.insert(
        fwd_id,
        Edge {
            id: fwd_id,
            opposite_edge_id: rev_id,
            from_node: lt_node,
            to_node: rt_node,
            weight: fwd_kind.weight(),
            kind: fwd_kind,
            left_table: left_table.clone(),
            left_column: left_column.clone(),
            right_table: right_table.clone(),
            right_column: right_column.clone(),
            relation_name: relation_name.clone(),
        },
    );
    all_edges.insert(
        rev_id,
        Edge {
            id: rev_id,
            opposite_edge_id: fwd_id,
            from_node: rt_node,
            to_node: lt_node,
            weight: rev_kind.weight(),
            kind: rev_kind,
            left_table: right_table.clone(),
            left_column: right_column,
            right_table: left_table.clone(),
            right_column: left_column,
            relation_name,
        },
    );

    add_index_entry(edges_by_name, derive_relation_name(&all_edges[&fwd_id].left_column), rt_node, fwd_id);
    add_index_entry(edges_by_name, right_table, rt_node, fwd_id);
    add_index_entry(edges_by_name, left_table, lt_node, rev_id);
}

fn add_index_entry(
    edges_by_name: &mut HashMap<String, Vec<EdgeHandle>>,
    key: String,
    node_id: NodeId,
    edge_id: EdgeId,
) {
    let handles = edges_by_name.entry(key).or_default();
    if let Some(handle) = handles.iter_mut().find(|h| h.node_id == node_id) {
        handle.edges.push(edge_id);
    } else {
        handles.push(EdgeHandle {
            node_id,
            edges: vec![edge_id],
        });
    }
}
