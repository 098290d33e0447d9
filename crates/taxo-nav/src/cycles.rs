//! Upfront acyclicity check for strict runs.
//!
//! The resolvers contain cycles locally. When a hierarchy is expected to be a
//! true DAG, [`ensure_acyclic`] rejects it before any depth is computed.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, btree_set};
use taxo_core::graph::EdgeIndex;

/// A closed chain of child → parent edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    /// Node ids in edge order; the first node is repeated at the end.
    pub nodes: Vec<String>,
}

impl Cycle {
    /// Number of distinct nodes in the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable representation: A → B → A
    pub fn representation(&self) -> String {
        self.nodes.join(" → ")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("hierarchy is not acyclic: {}", .0.representation())]
    Cyclic(Cycle),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// Frame is on the DFS stack.
    Open,
    /// Every ancestor has been explored.
    Done,
}

struct Frame<'a> {
    node: &'a str,
    parents: Option<btree_set::Iter<'a, String>>,
}

/// Find one cycle, if any, by depth-first search along parent edges.
///
/// Start nodes are visited in sorted order, so the reported cycle is stable
/// across runs.
pub fn find_cycle(index: &EdgeIndex) -> Option<Cycle> {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let starts: BTreeSet<&str> = index.node_ids();

    for start in starts {
        if marks.contains_key(start) {
            continue;
        }
        marks.insert(start, Mark::Open);
        let mut stack = vec![Frame {
            node: start,
            parents: index.parents(start).map(BTreeSet::iter),
        }];

        while let Some(frame) = stack.last_mut() {
            let next = frame.parents.as_mut().and_then(Iterator::next);
            let Some(parent) = next else {
                if let Some(done) = stack.pop() {
                    marks.insert(done.node, Mark::Done);
                }
                continue;
            };

            let parent = parent.as_str();
            match marks.get(parent) {
                Some(Mark::Open) => {
                    let from = stack
                        .iter()
                        .position(|f| f.node == parent)
                        .unwrap_or_default();
                    let mut nodes: Vec<String> =
                        stack[from..].iter().map(|f| f.node.to_string()).collect();
                    nodes.push(parent.to_string());
                    return Some(Cycle { nodes });
                }
                Some(Mark::Done) => {}
                None => {
                    marks.insert(parent, Mark::Open);
                    stack.push(Frame {
                        node: parent,
                        parents: index.parents(parent).map(BTreeSet::iter),
                    });
                }
            }
        }
    }

    None
}

/// Fail with the first cycle found.
pub fn ensure_acyclic(index: &EdgeIndex) -> Result<(), CycleError> {
    match find_cycle(index) {
        Some(cycle) => Err(CycleError::Cyclic(cycle)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dag_has_no_cycle() {
        let index = EdgeIndex::from_edges([("B", "A"), ("C", "A"), ("D", "B"), ("D", "C")]);
        assert!(find_cycle(&index).is_none());
        assert!(ensure_acyclic(&index).is_ok());
    }

    #[test]
    fn test_two_node_cycle() {
        let index = EdgeIndex::from_edges([("X", "Y"), ("Y", "X")]);
        let cycle = find_cycle(&index).unwrap();
        assert_eq!(cycle.nodes, vec!["X", "Y", "X"]);
        assert_eq!(cycle.len(), 2);
        assert_eq!(cycle.representation(), "X → Y → X");
    }

    #[test]
    fn test_self_loop() {
        let index = EdgeIndex::from_edges([("A", "A")]);
        let cycle = find_cycle(&index).unwrap();
        assert_eq!(cycle.nodes, vec!["A", "A"]);
        assert_eq!(cycle.len(), 1);
    }

    #[test]
    fn test_cycle_below_acyclic_prefix() {
        // Q → P → M → N → M: only M and N are in the cycle.
        let index = EdgeIndex::from_edges([("Q", "P"), ("P", "M"), ("M", "N"), ("N", "M")]);
        let cycle = find_cycle(&index).unwrap();
        assert_eq!(cycle.nodes, vec!["M", "N", "M"]);
    }

    #[test]
    fn test_shared_ancestor_is_not_a_cycle() {
        let index = EdgeIndex::from_edges([("N", "A"), ("N", "B"), ("A", "P"), ("B", "P")]);
        assert!(find_cycle(&index).is_none());
    }

    #[test]
    fn test_error_names_cycle() {
        let index = EdgeIndex::from_edges([("X", "Y"), ("Y", "X")]);
        let err = ensure_acyclic(&index).unwrap_err();
        assert_eq!(err.to_string(), "hierarchy is not acyclic: X → Y → X");
    }
}
