//! Edge index for taxonomy hierarchies: child → set of parents.

use std::collections::{BTreeSet, HashMap};

/// A directed child → parent relationship ("child is subordinate to parent").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub child: String,
    pub parent: String,
}

impl Edge {
    pub fn new(child: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            child: child.into(),
            parent: parent.into(),
        }
    }
}

impl<C: Into<String>, P: Into<String>> From<(C, P)> for Edge {
    fn from((child, parent): (C, P)) -> Self {
        Self::new(child, parent)
    }
}

/// Adjacency from each child to the set of its parents.
///
/// Parent sets are ordered so that path enumeration is reproducible across
/// runs. A node that never appears as a child has no entry and is treated
/// as a root; dangling parent references are tolerated the same way.
#[derive(Debug, Clone, Default)]
pub struct EdgeIndex {
    parents: HashMap<String, BTreeSet<String>>,
    edge_count: usize,
}

impl EdgeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a stream of (child, parent) pairs.
    pub fn from_edges<I, E>(edges: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Edge>,
    {
        let mut index = Self::new();
        for edge in edges {
            index.insert(edge.into());
        }
        index
    }

    /// Record an edge. Returns false if the edge was already present.
    pub fn insert(&mut self, edge: Edge) -> bool {
        let added = self.parents.entry(edge.child).or_default().insert(edge.parent);
        if added {
            self.edge_count += 1;
        }
        added
    }

    /// Parents of `id`, or `None` when the node has no recorded parents.
    pub fn parents(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.parents.get(id).filter(|set| !set.is_empty())
    }

    /// The index's own copy of `id` together with its parents.
    ///
    /// Lets callers borrow node ids for the lifetime of the index instead of
    /// the lifetime of the query string.
    pub fn entry(&self, id: &str) -> Option<(&String, &BTreeSet<String>)> {
        self.parents
            .get_key_value(id)
            .filter(|(_, set)| !set.is_empty())
    }

    pub fn has_parents(&self, id: &str) -> bool {
        self.parents(id).is_some()
    }

    /// Whether `id` was ever recorded as a child.
    pub fn contains_child(&self, id: &str) -> bool {
        self.parents.contains_key(id)
    }

    /// Number of nodes that have at least one parent.
    pub fn child_count(&self) -> usize {
        self.parents.len()
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }

    /// All node ids mentioned by any edge, children and parents alike, sorted.
    pub fn node_ids(&self) -> BTreeSet<&str> {
        let mut ids = BTreeSet::new();
        for (child, parents) in &self.parents {
            ids.insert(child.as_str());
            ids.extend(parents.iter().map(String::as_str));
        }
        ids
    }

    /// Iterate over every (child, parent) pair.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parents.iter().flat_map(|(child, parents)| {
            parents
                .iter()
                .map(move |parent| (child.as_str(), parent.as_str()))
        })
    }

    /// Nodes mentioned only as parents: the implicit roots of the hierarchy.
    pub fn roots(&self) -> BTreeSet<&str> {
        self.node_ids()
            .into_iter()
            .filter(|id| !self.has_parents(id))
            .collect()
    }
}

impl<E: Into<Edge>> FromIterator<E> for EdgeIndex {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::from_edges(iter)
    }
}
