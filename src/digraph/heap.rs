//! A binary min-heap keyed on path cost.
//!
//! Used by [`super::Digraph::all_paths`] to drive a Dijkstra-style
//! best-first expansion. Wraps `std::collections::BinaryHeap`, which is a
//! max-heap, by reversing the cost ordering.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Entry<T> {
    cost: usize,
    // Insertion order, used only to make pops deterministic across runs
    // when costs tie (the heap itself does not require this for
    // correctness — spec ties "may be broken arbitrarily" — but a stable
    // order keeps `find_path`'s output reproducible per spec's
    // determinism property).
    seq: usize,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct MinHeap<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: usize,
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, cost: usize, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { cost, seq, item });
    }

    pub fn pop(&mut self) -> Option<(usize, T)> {
        self.heap.pop().map(|e| (e.cost, e.item))
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_ascending_cost_order() {
        let mut heap = MinHeap::new();
        heap.push(5, "e");
        heap.push(1, "a");
        heap.push(3, "b");
        assert_eq!(heap.pop().unwrap(), (1, "a"));
        assert_eq!(heap.pop().unwrap(), (3, "b"));
        assert_eq!(heap.pop().unwrap(), (5, "e"));
        assert!(heap.pop().is_none());
    }

    #[test]
    fn ties_broken_by_insertion_order() {
        let mut heap = MinHeap::new();
        heap.push(1, "first");
        heap.push(1, "second");
        assert_eq!(heap.pop().unwrap(), (1, "first"));
        assert_eq!(heap.pop().unwrap(), (1, "second"));
    }
}
