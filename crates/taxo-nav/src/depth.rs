//! Maximum-depth resolution over the child → parents index.
//!
//! A node with no parents has depth 1; any other node has depth
//! `1 + max(depth(parent))`. Results are memoized for the lifetime of the
//! resolver, so each node is expanded at most once per run.
//!
//! Resolution walks an explicit frame stack rather than recursing, so very
//! deep hierarchies cannot exhaust the thread stack. A parent that is already
//! on the active path closes a cycle: that occurrence counts as depth 1, a
//! [`CycleDiagnostic`] is recorded, and resolution continues. The colliding
//! node is memoized only when its own frame completes.

use crate::{CycleDiagnostic, CycleSource};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, btree_set};
use taxo_core::graph::EdgeIndex;

/// Memoizing depth resolver bound to one edge index.
#[derive(Debug)]
pub struct DepthResolver<'a> {
    index: &'a EdgeIndex,
    memo: HashMap<String, usize>,
    diagnostics: Vec<CycleDiagnostic>,
}

/// A node whose parents are being resolved.
struct Frame<'a> {
    node: &'a str,
    parents: btree_set::Iter<'a, String>,
    max_parent: usize,
}

impl<'a> Frame<'a> {
    fn new(node: &'a str, parents: &'a BTreeSet<String>) -> Self {
        Self {
            node,
            parents: parents.iter(),
            max_parent: 0,
        }
    }
}

impl<'a> DepthResolver<'a> {
    pub fn new(index: &'a EdgeIndex) -> Self {
        Self {
            index,
            memo: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Depth of `node`, 1 for roots.
    pub fn depth(&mut self, node: &str) -> usize {
        if let Some(&depth) = self.memo.get(node) {
            return depth;
        }

        let index = self.index;
        let Some((key, parents)) = index.entry(node) else {
            self.memo.insert(node.to_string(), 1);
            return 1;
        };

        // Nodes whose frames are currently on the stack.
        let mut on_path: HashSet<&'a str> = HashSet::from([key.as_str()]);
        let mut stack = vec![Frame::new(key, parents)];
        let mut result = 1;

        while let Some(frame) = stack.last_mut() {
            let child = frame.node;
            if let Some(parent) = frame.parents.next() {
                let parent = parent.as_str();
                let known = if let Some(&depth) = self.memo.get(parent) {
                    depth
                } else if on_path.contains(parent) {
                    self.record_cycle(parent, child, node);
                    1
                } else if let Some((parent_key, grandparents)) = index.entry(parent) {
                    on_path.insert(parent_key.as_str());
                    stack.push(Frame::new(parent_key, grandparents));
                    continue;
                } else {
                    self.memo.insert(parent.to_string(), 1);
                    1
                };
                if let Some(frame) = stack.last_mut() {
                    frame.max_parent = frame.max_parent.max(known);
                }
            } else if let Some(done) = stack.pop() {
                on_path.remove(done.node);
                let depth = done.max_parent + 1;
                self.memo.insert(done.node.to_string(), depth);
                if let Some(frame) = stack.last_mut() {
                    frame.max_parent = frame.max_parent.max(depth);
                }
                result = depth;
            }
        }

        result
    }

    fn record_cycle(&mut self, node: &str, via: &str, query: &str) {
        tracing::warn!("cycle detected at {} (reached from {} while resolving {})", node, via, query);
        self.diagnostics.push(CycleDiagnostic {
            node: node.to_string(),
            via: via.to_string(),
            query: query.to_string(),
            source: CycleSource::Depth,
        });
    }

    /// Memoized depth of `node`, without resolving it.
    pub fn cached(&self, node: &str) -> Option<usize> {
        self.memo.get(node).copied()
    }

    /// Number of nodes resolved so far, ancestors included.
    pub fn resolved(&self) -> usize {
        self.memo.len()
    }

    /// Count of resolved nodes at each depth.
    pub fn level_distribution(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for &depth in self.memo.values() {
            *counts.entry(depth).or_insert(0) += 1;
        }
        counts
    }

    /// Cycles contained so far, in the order they were met.
    pub fn diagnostics(&self) -> &[CycleDiagnostic] {
        &self.diagnostics
    }

    pub fn index(&self) -> &'a EdgeIndex {
        self.index
    }
}
