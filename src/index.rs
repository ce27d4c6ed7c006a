//! Interval index over annotation spans.
//!
//! Entries live in a map keyed by annotation id, so inserting and removing
//! are `O(1)`. The tree itself is a balanced interval tree laid out over the
//! entries sorted by `(start, end, id)`: the node for a slice `[lo, hi)` is
//! its midpoint, and every node carries the maximum end of its subtree for
//! pruning. It is rebuilt lazily on the first query after a mutation, so a
//! run of mutations with no queries in between costs one `O(n log n)`
//! rebuild, and queries are `O(log n + k)`.
//!
//! Results come back in span order.

use crate::annotation::AnnotationId;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use tessera_core::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    start: usize,
    end: usize,
    id: AnnotationId,
}

#[derive(Debug, Clone)]
struct IntervalTree {
    nodes: Vec<Entry>,
    /// Maximum end within the subtree rooted at each node.
    max_end: Vec<usize>,
}

impl IntervalTree {
    fn build(entries: &HashMap<AnnotationId, Span>) -> Self {
        let mut nodes: Vec<Entry> = entries
            .iter()
            .map(|(&id, span)| Entry {
                start: span.start(),
                end: span.end(),
                id,
            })
            .collect();
        nodes.sort_unstable();
        let mut max_end = vec![0; nodes.len()];
        Self::fill_max_end(&nodes, &mut max_end, 0, nodes.len());
        Self { nodes, max_end }
    }

    fn fill_max_end(nodes: &[Entry], max_end: &mut [usize], lo: usize, hi: usize) -> usize {
        if lo >= hi {
            return 0;
        }
        let mid = lo + (hi - lo) / 2;
        let left = Self::fill_max_end(nodes, max_end, lo, mid);
        let right = Self::fill_max_end(nodes, max_end, mid + 1, hi);
        let max = nodes[mid].end.max(left).max(right);
        max_end[mid] = max;
        max
    }

    fn query_overlap(&self, lo: usize, hi: usize, query: Span, results: &mut Vec<AnnotationId>) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        // Nothing below ends after the query starts
        if self.max_end[mid] <= query.start() {
            return;
        }
        self.query_overlap(lo, mid, query, results);

        let node = self.nodes[mid];
        if node.start < query.end() {
            if node.start < node.end && query.start() < node.end {
                results.push(node.id);
            }
            self.query_overlap(mid + 1, hi, query, results);
        }
    }

    fn query_containing(&self, lo: usize, hi: usize, query: Span, results: &mut Vec<AnnotationId>) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        if self.max_end[mid] < query.end() {
            return;
        }
        self.query_containing(lo, mid, query, results);

        let node = self.nodes[mid];
        if node.start <= query.start() {
            if node.end >= query.end() {
                results.push(node.id);
            }
            self.query_containing(mid + 1, hi, query, results);
        }
    }

    fn query_contained_in(&self, range: Span) -> Vec<AnnotationId> {
        let first = self.nodes.partition_point(|e| e.start < range.start());
        self.nodes[first..]
            .iter()
            .take_while(|e| e.start <= range.end())
            .filter(|e| e.end <= range.end())
            .map(|e| e.id)
            .collect()
    }
}

/// Span index for the annotations of one document.
#[derive(Debug, Default)]
pub struct SpanIndex {
    entries: HashMap<AnnotationId, Span>,
    tree: OnceCell<IntervalTree>,
}

impl SpanIndex {
    /// Create a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a span, replacing any earlier span stored for `id`.
    pub fn insert(&mut self, id: AnnotationId, span: Span) {
        self.entries.insert(id, span);
        self.tree.take();
    }

    /// Remove the entry for `id`.
    pub fn remove(&mut self, id: AnnotationId) -> bool {
        let removed = self.entries.remove(&id).is_some();
        if removed {
            self.tree.take();
        }
        removed
    }

    /// Find entries sharing at least one character with `span`.
    ///
    /// Empty spans overlap nothing, on either side.
    #[must_use]
    pub fn query_overlap(&self, span: Span) -> Vec<AnnotationId> {
        let mut results = Vec::new();
        if span.is_empty() {
            return results;
        }
        let tree = self.tree();
        tree.query_overlap(0, tree.nodes.len(), span, &mut results);
        results
    }

    /// Find entries that fully contain `span`.
    #[must_use]
    pub fn query_containing(&self, span: Span) -> Vec<AnnotationId> {
        let mut results = Vec::new();
        let tree = self.tree();
        tree.query_containing(0, tree.nodes.len(), span, &mut results);
        results
    }

    /// Find entries fully contained within `span`.
    #[must_use]
    pub fn query_contained_in(&self, span: Span) -> Vec<AnnotationId> {
        self.tree().query_contained_in(span)
    }

    /// Number of entries in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn tree(&self) -> &IntervalTree {
        self.tree.get_or_init(|| {
            log::trace!("rebuilding span index over {} entries", self.entries.len());
            IntervalTree::build(&self.entries)
        })
    }
}
