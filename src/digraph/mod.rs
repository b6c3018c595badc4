//! An unlabeled directed multigraph of integer node IDs carrying parallel
//! weighted edges, plus a k-best simple-path enumerator over it.
//!
//! This is the digraph primitive (component A) and its priority queue
//! (component B). It knows nothing about tables, columns, or
//! relationship kinds — those live in [`crate::schema`], which is the
//! only caller.

mod heap;

use heap::MinHeap;
use std::collections::{HashMap, HashSet};

/// Hard, non-configurable cap on heap pops inside `all_paths`. Bounds cost
/// on pathological dense schemas; never errors on hitting it, it just
/// returns whatever was already found.
pub const ALL_PATHS_POP_CAP: usize = 3000;

pub type NodeId = usize;
pub type EdgeId = usize;

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub opposite_id: EdgeId,
    pub weight: u32,
    pub name: String,
}

/// Directed multigraph: nodes are plain integer IDs, edges live in a flat
/// bucket-per-`(from, to)` map so parallel edges between the same pair of
/// nodes are just a longer bucket. `adj` holds each node's distinct
/// neighbor set (a neighbor reached by several parallel edges appears
/// once) so `all_paths` never visits the same pair edge-by-edge.
#[derive(Debug, Default)]
pub struct Digraph {
    next_edge_id: EdgeId,
    buckets: HashMap<(NodeId, NodeId), Vec<Edge>>,
    adj: Vec<Vec<NodeId>>,
}

impl Digraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self) -> NodeId {
        let id = self.adj.len();
        self.adj.push(Vec::new());
        id
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    /// Mint an edge ID, append it to the `(from, to)` bucket, and add `to`
    /// to `from`'s adjacency if it isn't already there.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        opposite: EdgeId,
        weight: u32,
        name: impl Into<String>,
    ) -> EdgeId {
        let id = self.next_edge_id;
        self.next_edge_id += 1;
        self.buckets.entry((from, to)).or_default().push(Edge {
            id,
            opposite_id: opposite,
            weight,
            name: name.into(),
        });
        if !self.adj[from].contains(&to) {
            self.adj[from].push(to);
        }
        id
    }

    /// Patch a previously-added edge's `opposite_id` in place. Used to
    /// close the mutual back-pointer once both halves of a pair exist
    /// (see [`Digraph::add_edge_pair`]).
    fn set_opposite(&mut self, from: NodeId, to: NodeId, edge_id: EdgeId, opposite_id: EdgeId) {
        if let Some(bucket) = self.buckets.get_mut(&(from, to)) {
            if let Some(edge) = bucket.iter_mut().find(|e| e.id == edge_id) {
                edge.opposite_id = opposite_id;
            }
        }
    }

    /// Add a forward edge and its reverse together, each pointing at the
    /// other's ID. Every relationship in this crate is added this way —
    /// spec requires every edge to be created with its opposite.
    pub fn add_edge_pair(
        &mut self,
        from: NodeId,
        to: NodeId,
        fwd_weight: u32,
        fwd_name: impl Into<String>,
        rev_weight: u32,
        rev_name: impl Into<String>,
    ) -> (EdgeId, EdgeId) {
        let fwd_id = self.add_edge(from, to, 0, fwd_weight, fwd_name);
        let rev_id = self.add_edge(to, from, fwd_id, rev_weight, rev_name);
        self.set_opposite(from, to, fwd_id, rev_id);
        (fwd_id, rev_id)
    }

    pub fn get_edges(&self, from: NodeId, to: NodeId) -> &[Edge] {
        self.buckets
            .get(&(from, to))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        &self.adj[node]
    }

    /// Enumerate minimum-hop-count simple node paths from `from` to `to`,
    /// ranked by ascending summed hop count. Edge weighting is applied
    /// later during edge selection (`resolver::pick_edges`); at the graph
    /// level every hop costs 1.
    ///
    /// Cycles are allowed to the extent the destination may be re-entered
    /// (so parallel routes terminating at `to` are all discoverable), but
    /// no other node repeats within a single path. Emission never prunes
    /// further expansion of an already-emitted path — distinct paths
    /// sharing a prefix are all wanted. Bounded by `ALL_PATHS_POP_CAP`
    /// heap pops; returns whatever was found so far if the cap is hit.
    pub fn all_paths(&self, from: NodeId, to: NodeId) -> Vec<Vec<NodeId>> {
        let mut heap: MinHeap<(NodeId, Vec<NodeId>, HashSet<NodeId>)> = MinHeap::new();
        let mut start_visited = HashSet::new();
        start_visited.insert(from);
        heap.push(0, (from, vec![from], start_visited));

        // Guards re-expansion of an already-popped (parent_node, u)
        // transition — not a global visited set, which would lose valid
        // alternative paths. `parent` is `None` only for the initial
        // state; a genuine self-loop (recursive FK) revisits `u` as its
        // own parent on the *second* pop, which must stay distinct from
        // the first pop's `(None, u)` transition or the self-loop is
        // never emitted.
        let mut expanded: HashSet<(Option<NodeId>, NodeId)> = HashSet::new();
        let mut emitted: HashSet<Vec<NodeId>> = HashSet::new();
        let mut results = Vec::new();
        let mut pops = 0usize;

        while let Some((cost, (u, path, visited))) = heap.pop() {
            pops += 1;
            if pops > ALL_PATHS_POP_CAP {
                break;
            }

            let parent = if path.len() >= 2 {
                Some(path[path.len() - 2])
            } else {
                None
            };
            if !expanded.insert((parent, u)) {
                continue;
            }

            if u == to && path.len() > 1 && emitted.insert(path.clone()) {
                results.push(path.clone());
            }

            for &v in self.neighbors(u) {
                if visited.contains(&v) && v != to {
                    continue;
                }
                let mut next_visited = visited.clone();
                next_visited.insert(v);
                let mut next_path = path.clone();
                next_path.push(v);
                heap.push(cost + 1, (v, next_path, next_visited));
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_graph() -> (Digraph, NodeId, NodeId, NodeId) {
        let mut g = Digraph::new();
        let a = g.add_node();
        let b = g.add_node();
        let c = g.add_node();
        g.add_edge_pair(a, b, 1, "ab", 1, "ba");
        g.add_edge_pair(b, c, 1, "bc", 1, "cb");
        (g, a, b, c)
    }

    #[test]
    fn opposite_ids_are_mutual() {
        let (g, a, b, _c) = linear_graph();
        let fwd = &g.get_edges(a, b)[0];
        let rev = &g.get_edges(b, a)[0];
        assert_eq!(fwd.opposite_id, rev.id);
        assert_eq!(rev.opposite_id, fwd.id);
    }

    #[test]
    fn finds_direct_and_two_hop_paths() {
        let (g, a, _b, c) = linear_graph();
        let paths = g.all_paths(a, c);
        assert!(paths.contains(&vec![a, _b, c]));
    }

    #[test]
    fn no_path_between_disconnected_nodes() {
        let mut g = Digraph::new();
        let a = g.add_node();
        let b = g.add_node();
        assert!(g.all_paths(a, b).is_empty());
    }

    #[test]
    fn finds_multiple_parallel_paths() {
        // a -> b -> d, a -> c -> d : two distinct 2-hop paths to d.
        let mut g = Digraph::new();
        let a = g.add_node();
        let b = g.add_node();
        let c = g.add_node();
        let d = g.add_node();
        g.add_edge_pair(a, b, 1, "ab", 1, "ba");
        g.add_edge_pair(b, d, 1, "bd", 1, "db");
        g.add_edge_pair(a, c, 1, "ac", 1, "ca");
        g.add_edge_pair(c, d, 1, "cd", 1, "dc");

        let mut paths = g.all_paths(a, d);
        paths.sort();
        let mut expected = vec![vec![a, b, d], vec![a, c, d]];
        expected.sort();
        assert_eq!(paths, expected);
    }

    #[test]
    fn cycle_does_not_hang_and_destination_reentry_is_allowed() {
        // a -> b -> a (cycle), and b -> c directly, a -> c directly.
        let mut g = Digraph::new();
        let a = g.add_node();
        let b = g.add_node();
        let c = g.add_node();
        g.add_edge_pair(a, b, 1, "ab", 1, "ba");
        g.add_edge_pair(b, c, 1, "bc", 1, "cb");
        g.add_edge_pair(a, c, 1, "ac", 1, "ca");

        let paths = g.all_paths(a, c);
        assert!(paths.contains(&vec![a, c]));
        assert!(paths.contains(&vec![a, b, c]));
        // No path should ever repeat a non-destination node.
        for p in &paths {
            let mut seen = HashSet::new();
            for (i, n) in p.iter().enumerate() {
                if *n != c {
                    assert!(seen.insert(*n), "node {n} repeated in path {p:?} at {i}");
                }
            }
        }
    }

    #[test]
    fn self_loop_edge_is_found_as_a_one_node_path() {
        // A node with a self-referential edge pair (the shape a recursive
        // FK produces) must yield a [node, node] path from and to itself —
        // this is the only way `resolver::find_path` can resolve a
        // recursive relationship, since `from` and `to` both name the
        // same table.
        let mut g = Digraph::new();
        let a = g.add_node();
        g.add_edge_pair(a, a, 10, "self-fwd", 10, "self-rev");
        let paths = g.all_paths(a, a);
        assert_eq!(paths, vec![vec![a, a]]);
    }
}
