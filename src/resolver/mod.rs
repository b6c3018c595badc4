//! Path resolver (component E): turns a caller-supplied `(from, to,
//! through)` triple into a concrete, weight-ordered sequence of join
//! steps over a built [`Schema`].

use std::collections::HashSet;

use crate::digraph::{EdgeId, NodeId};
use crate::errors::RelgraphError;
use crate::schema::{RelType, Schema};

/// One materialized hop in a resolved join path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinStep {
    pub from_node: NodeId,
    pub to_node: NodeId,
    pub edge_id: EdgeId,
    pub relation_name: String,
    pub kind: RelType,
    pub left_table: String,
    pub left_column: String,
    pub right_table: String,
    pub right_column: String,
}

/// A resolved path, labeled with the identifiers the caller asked for —
/// useful once a `Vec<JoinStep>` needs to be reported back alongside the
/// query that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    pub steps: Vec<JoinStep>,
}

pub fn path_to_rel(from: &str, to: &str, steps: Vec<JoinStep>) -> Relationship {
    Relationship {
        from: from.to_string(),
        to: to.to_string(),
        steps,
    }
}

/// One candidate a lookup name could mean: the node it points at, and —
/// unless the name was resolved by falling back to a bare table/alias
/// lookup — the edge IDs registered under that name at that node (spec
/// §3: `EdgeHandle`). `edges == None` marks an unconstrained candidate:
/// a name that isn't indexed as a relationship at all, only as a plain
/// table, so neither the first- nor last-hop rule has anything to match
/// against.
struct Candidate {
    node_id: NodeId,
    edges: Option<Vec<EdgeId>>,
}

/// Candidates a lookup name could mean: every `EdgeHandle` registered
/// under that key in `edges_by_name`, falling back to a direct
/// `default_schema:name` node lookup (unconstrained) when the name isn't
/// a relation shorthand at all — either a table with no foreign keys in
/// either direction, or an alias registered only in the node index, never
/// as a relationship name.
fn resolve_candidates(schema: &Schema, name: &str) -> Vec<Candidate> {
    if let Some(handles) = schema.edges_by_name().get(name) {
        return handles
            .iter()
            .map(|h| Candidate {
                node_id: h.node_id,
                edges: Some(h.edges.clone()),
            })
            .collect();
    }
    schema
        .node_id(&format!("{}:{}", schema.catalog().default_schema, name))
        .map(|node_id| Candidate {
            node_id,
            edges: None,
        })
        .into_iter()
        .collect()
}

fn resolve_node_ids(schema: &Schema, name: &str) -> HashSet<NodeId> {
    resolve_candidates(schema, name).into_iter().map(|c| c.node_id).collect()
}

/// Choose a concrete edge for every hop of a node path, per spec §4.5
/// `pick_edges`.
///
/// - **First hop** of a path with more than one hop: the named
///   relationship's `EdgeHandle` stores the edge *arriving* at the origin
///   under that name, so the outgoing edge that matches is the one whose
///   `opposite_id` appears in `from_edges`. If `from_edges` is
///   constrained and nothing matches, the whole path is rejected — there
///   is no weight fallback here, matching spec §4.5.
/// - **Last hop** of a path with more than one hop, and the **only** hop
///   of a single-hop path (first and last coincide; the caller's `to`
///   intent governs since that is the only handle both the direct-edge
///   and multi-hop cases can consistently match against): prefer the
///   edge whose ID appears in `to_edges`; if none qualifies, or `to_edges`
///   is unconstrained, fall back to the lowest-weight eligible edge.
/// - **Middle hop**: lowest-weight eligible edge, no name constraint.
///
/// In every case an edge equal to the previous hop's `opposite_id` is
/// never eligible, forbidding an immediate single-hop backtrack. Ties are
/// broken by edge ID for determinism. Returns `None` if some hop has no
/// eligible edge at all.
fn pick_edges(
    schema: &Schema,
    path: &[NodeId],
    from_edges: Option<&[EdgeId]>,
    to_edges: Option<&[EdgeId]>,
) -> Option<Vec<EdgeId>> {
    let hops = path.len() - 1;
    let mut chosen = Vec::with_capacity(hops);
    let mut avoid: Option<EdgeId> = None;

    for (i, pair) in path.windows(2).enumerate() {
        let (u, v) = (pair[0], pair[1]);
        let candidates = schema.graph().get_edges(u, v);
        let is_first = i == 0;
        let is_last = i == hops - 1;

        let pick = if is_first && !is_last {
            match from_edges {
                Some(allowed) => candidates
                    .iter()
                    .filter(|e| allowed.contains(&e.opposite_id))
                    .min_by_key(|e| (e.weight, e.id))?,
                None => candidates.iter().min_by_key(|e| (e.weight, e.id))?,
            }
        } else {
            let eligible: Vec<_> = candidates.iter().filter(|e| Some(e.id) != avoid).collect();
            if eligible.is_empty() {
                return None;
            }
            let named = to_edges.and_then(|allowed| {
                eligible
                    .iter()
                    .filter(|e| allowed.contains(&e.id))
                    .min_by_key(|e| (e.weight, e.id))
                    .copied()
            });
            named.or_else(|| eligible.into_iter().min_by_key(|e| (e.weight, e.id)))?
        };

        avoid = Some(pick.opposite_id);
        chosen.push(pick.id);
    }

    Some(chosen)
}

/// `FindPath`: resolve `from`/`to` (and, if non-empty, `through`) to
/// schema nodes, enumerate candidate paths across every `(from, to)`
/// candidate pair, keep only those passing through a `through` node when
/// one was asked for, and return the lowest (total weight, hop count)
/// survivor's edges as join steps.
pub fn find_path(
    schema: &Schema,
    from: &str,
    to: &str,
    through: &str,
) -> Result<Vec<JoinStep>, RelgraphError> {
    let from_candidates = resolve_candidates(schema, from);
    if from_candidates.is_empty() {
        return Err(RelgraphError::FromEdgeNotFound {
            name: from.to_string(),
        });
    }
    let to_candidates = resolve_candidates(schema, to);
    if to_candidates.is_empty() {
        return Err(RelgraphError::ToEdgeNotFound {
            name: to.to_string(),
        });
    }
    let through_candidates: Option<HashSet<NodeId>> = if through.is_empty() {
        None
    } else {
        let ids = resolve_node_ids(schema, through);
        if ids.is_empty() {
            return Err(RelgraphError::ThroughNodeNotFound {
                name: through.to_string(),
            });
        }
        Some(ids)
    };

    let mut best: Option<(u64, usize, Vec<EdgeId>)> = None;

    for f in &from_candidates {
        for t in &to_candidates {
            // A table naming itself at both ends only ever resolves via a
            // recursive (self-referential) edge pair — `all_paths` allows
            // destination re-entry, so `f.node_id == t.node_id` still
            // finds the `[node, node]` self-loop path when one exists.
            for node_path in schema.graph().all_paths(f.node_id, t.node_id) {
                if let Some(through_nodes) = &through_candidates {
                    if !node_path.iter().any(|n| through_nodes.contains(n)) {
                        continue;
                    }
                }
                let Some(edge_path) = pick_edges(
                    schema,
                    &node_path,
                    f.edges.as_deref(),
                    t.edges.as_deref(),
                ) else {
                    continue;
                };
                let total_weight: u64 = edge_path
                    .iter()
                    .map(|id| schema.all_edges()[id].weight as u64)
                    .sum();
                let candidate_key = (total_weight, edge_path.len());
                let is_better = match &best {
                    None => true,
                    Some((w, l, _)) => candidate_key < (*w, *l),
                };
                if is_better {
                    best = Some((total_weight, edge_path.len(), edge_path));
                }
            }
        }
    }

    let Some((_, _, edge_path)) = best else {
        return Err(RelgraphError::PathNotFound {
            from: from.to_string(),
            to: to.to_string(),
        });
    };

    Ok(edge_path
        .into_iter()
        .map(|edge_id| {
            let edge = &schema.all_edges()[&edge_id];
            JoinStep {
                from_node: edge.from_node,
                to_node: edge.to_node,
                edge_id,
                relation_name: edge.relation_name.clone(),
                kind: edge.kind,
                left_table: edge.left_table.clone(),
                left_column: edge.left_column.clone(),
                right_table: edge.right_table.clone(),
                right_column: edge.right_column.clone(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Column, ForeignKey, Table, TableDeclaration, TableKind};
    use crate::config::Dialect;
    use crate::schema::new_schema;
    use std::collections::HashMap;

    fn column(name: &str, fk: Option<ForeignKey>) -> Column {
        Column {
            schema: "public".to_string(),
            table: "t".to_string(),
            name: name.to_string(),
            sql_type: "int4".to_string(),
            is_array: false,
            not_null: false,
            is_primary_key: name == "id",
            has_unique: false,
            is_full_text: false,
            foreign_key: fk,
            is_recursive_fk: false,
            blocked: false,
        }
    }

    fn table(name: &str, columns: Vec<Column>) -> Table {
        Table {
            schema: "public".to_string(),
            name: name.to_string(),
            kind: TableKind::Base,
            columns,
            primary_col: Some("id".to_string()),
            full_text_cols: Vec::new(),
            backing_function: None,
            blocked: false,
            declaration: TableDeclaration::None,
        }
    }

    fn blog_catalog() -> Catalog {
        let users = table("user", vec![column("id", None)]);
        let posts = table(
            "post",
            vec![
                column("id", None),
                column(
                    "user_id",
                    Some(ForeignKey {
                        target_schema: "public".to_string(),
                        target_table: "user".to_string(),
                        target_column: "id".to_string(),
                    }),
                ),
            ],
        );
        let comments = table(
            "comment",
            vec![
                column("id", None),
                column(
                    "post_id",
                    Some(ForeignKey {
                        target_schema: "public".to_string(),
                        target_table: "post".to_string(),
                        target_column: "id".to_string(),
                    }),
                ),
            ],
        );
        Catalog {
            dialect: Dialect::Postgres,
            dialect_version: 150000,
            default_schema: "public".to_string(),
            database_name: "blog".to_string(),
            tables: vec![users, posts, comments],
            functions: Vec::new(),
            content_hash: 0,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn resolves_direct_and_multi_hop_paths() {
        let schema = new_schema(blog_catalog(), HashMap::new()).unwrap();

        let direct = find_path(&schema, "user", "post", "").unwrap();
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].relation_name, "user");

        let two_hop = find_path(&schema, "user", "comment", "").unwrap();
        assert_eq!(two_hop.len(), 2);
        assert_eq!(two_hop[0].right_table, "post");
        assert_eq!(two_hop[1].right_table, "comment");
    }

    #[test]
    fn through_constraint_rejects_paths_that_skip_it() {
        let schema = new_schema(blog_catalog(), HashMap::new()).unwrap();
        let ok = find_path(&schema, "user", "comment", "post");
        assert!(ok.is_ok());

        let err = find_path(&schema, "user", "post", "comment");
        assert!(matches!(err, Err(RelgraphError::PathNotFound { .. })));
    }

    #[test]
    fn unknown_identifier_is_reported_precisely() {
        let schema = new_schema(blog_catalog(), HashMap::new()).unwrap();
        assert!(matches!(
            find_path(&schema, "nonexistent", "post", ""),
            Err(RelgraphError::FromEdgeNotFound { .. })
        ));
        assert!(matches!(
            find_path(&schema, "user", "nonexistent", ""),
            Err(RelgraphError::ToEdgeNotFound { .. })
        ));
    }

    #[test]
    fn disconnected_tables_produce_path_not_found() {
        let mut catalog = blog_catalog();
        catalog.tables.push(table("tag", vec![column("id", None)]));
        let schema = new_schema(catalog, HashMap::new()).unwrap();
        assert!(matches!(
            find_path(&schema, "user", "tag", ""),
            Err(RelgraphError::PathNotFound { .. })
        ));
    }

    #[test]
    fn path_to_rel_carries_the_caller_supplied_endpoints() {
        let schema = new_schema(blog_catalog(), HashMap::new()).unwrap();
        let steps = find_path(&schema, "user", "post", "").unwrap();
        let rel = path_to_rel("user", "post", steps.clone());
        assert_eq!(rel.from, "user");
        assert_eq!(rel.to, "post");
        assert_eq!(rel.steps, steps);
    }

    #[test]
    fn recursive_self_fk_resolves_via_relation_shorthand() {
        let employees = table(
            "employee",
            vec![
                column("id", None),
                column(
                    "manager_id",
                    Some(ForeignKey {
                        target_schema: "public".to_string(),
                        target_table: "employee".to_string(),
                        target_column: "id".to_string(),
                    }),
                ),
            ],
        );
        let catalog = Catalog {
            dialect: Dialect::Postgres,
            dialect_version: 150000,
            default_schema: "public".to_string(),
            database_name: "org".to_string(),
            tables: vec![employees],
            functions: Vec::new(),
            content_hash: 0,
            warnings: Vec::new(),
        };
        let schema = new_schema(catalog, HashMap::new()).unwrap();

        let steps = find_path(&schema, "employee", "manager", "").unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].kind, RelType::Recursive);
        assert_eq!(steps[0].left_table, "employee");
        assert_eq!(steps[0].right_table, "employee");
    }
}
