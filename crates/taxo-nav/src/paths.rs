//! Exhaustive upward path enumeration.
//!
//! Every path starts at the queried node and climbs one parent per step until
//! it reaches a node with no parents, or a node already earlier in the same
//! path (the repeated node is kept as the last element). A node with several
//! parents forks the path, so the result is the full set of maximal chains.
//!
//! Each branch carries its own copy of the visited set. Siblings never see
//! each other's visits: two branches that meet at a shared ancestor both climb
//! through it.

use crate::{CycleDiagnostic, CycleSource};
use std::collections::HashSet;
use taxo_core::graph::EdgeIndex;

/// An ancestor chain, queried node first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HierarchyPath {
    pub nodes: Vec<String>,
}

impl HierarchyPath {
    pub fn new(nodes: Vec<String>) -> Self {
        Self { nodes }
    }

    /// The queried node.
    pub fn origin(&self) -> &str {
        self.nodes.first().map_or("", String::as_str)
    }

    /// The most distant ancestor reached.
    pub fn terminal(&self) -> &str {
        self.nodes.last().map_or("", String::as_str)
    }

    /// Ancestors only, nearest first.
    pub fn ancestors(&self) -> &[String] {
        self.nodes.get(1..).unwrap_or_default()
    }

    /// Number of nodes, the queried node included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the path stopped because its last node repeats an earlier one.
    pub fn is_cycle_closed(&self) -> bool {
        match self.nodes.split_last() {
            Some((last, rest)) => rest.contains(last),
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }
}

/// A partial path awaiting expansion.
struct Branch<'s> {
    path: Vec<&'s str>,
    /// Nodes whose parents this branch has already expanded.
    visited: HashSet<&'s str>,
}

/// Path enumerator bound to one edge index.
#[derive(Debug)]
pub struct PathEnumerator<'a> {
    index: &'a EdgeIndex,
    max_paths: Option<usize>,
    diagnostics: Vec<CycleDiagnostic>,
    truncated: Vec<String>,
}

impl<'a> PathEnumerator<'a> {
    pub fn new(index: &'a EdgeIndex) -> Self {
        Self {
            index,
            max_paths: None,
            diagnostics: Vec::new(),
            truncated: Vec::new(),
        }
    }

    /// Stop after `limit` paths per node. `None` enumerates everything.
    pub fn with_max_paths(mut self, limit: Option<usize>) -> Self {
        self.max_paths = limit;
        self
    }

    /// All maximal upward paths from `node`. Never empty.
    pub fn paths(&mut self, node: &str) -> Vec<HierarchyPath> {
        let index = self.index;
        let mut completed: Vec<Vec<&str>> = Vec::new();
        let mut stack = vec![Branch {
            path: vec![node],
            visited: HashSet::new(),
        }];

        while let Some(mut branch) = stack.pop() {
            let Some(&current) = branch.path.last() else {
                continue;
            };

            let parents = if branch.visited.contains(current) {
                let via = branch.path[branch.path.len() - 2];
                self.record_closure(current, via, node);
                None
            } else {
                index.parents(current)
            };

            let Some(parents) = parents else {
                completed.push(branch.path);
                if self.max_paths.is_some_and(|cap| completed.len() >= cap) && !stack.is_empty() {
                    tracing::warn!(
                        "path enumeration for {} stopped at {} paths",
                        node,
                        completed.len()
                    );
                    self.truncated.push(node.to_string());
                    break;
                }
                continue;
            };

            branch.visited.insert(current);
            // Reverse push keeps the first parent's subtree first in the output.
            for parent in parents.iter().rev() {
                let mut path = Vec::with_capacity(branch.path.len() + 1);
                path.extend_from_slice(&branch.path);
                path.push(parent.as_str());
                stack.push(Branch {
                    path,
                    visited: branch.visited.clone(),
                });
            }
        }

        completed
            .into_iter()
            .map(|nodes| HierarchyPath::new(nodes.into_iter().map(str::to_string).collect()))
            .collect()
    }

    fn record_closure(&mut self, node: &str, via: &str, query: &str) {
        tracing::debug!("path from {} closes a cycle at {} (via {})", query, node, via);
        self.diagnostics.push(CycleDiagnostic {
            node: node.to_string(),
            via: via.to_string(),
            query: query.to_string(),
            source: CycleSource::Paths,
        });
    }

    pub fn max_paths(&self) -> Option<usize> {
        self.max_paths
    }

    /// Cycle closures met so far.
    pub fn diagnostics(&self) -> &[CycleDiagnostic] {
        &self.diagnostics
    }

    /// Nodes whose enumeration hit the path cap.
    pub fn truncated(&self) -> &[String] {
        &self.truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(paths: &[HierarchyPath]) -> Vec<Vec<&str>> {
        paths.iter().map(|p| p.iter().collect()).collect()
    }

    #[test]
    fn test_root_yields_single_element_path() {
        let index = EdgeIndex::from_edges([("B", "A")]);
        let mut paths = PathEnumerator::new(&index);
        assert_eq!(ids(&paths.paths("A")), vec![vec!["A"]]);
        assert_eq!(ids(&paths.paths("unknown")), vec![vec!["unknown"]]);
    }

    #[test]
    fn test_diamond() {
        let index = EdgeIndex::from_edges([("B", "A"), ("C", "A"), ("D", "B"), ("D", "C")]);
        let mut paths = PathEnumerator::new(&index);
        assert_eq!(
            ids(&paths.paths("D")),
            vec![vec!["D", "B", "A"], vec!["D", "C", "A"]]
        );
    }

    #[test]
    fn test_siblings_do_not_share_visits() {
        // Both parents of N climb through the shared ancestor P.
        let index = EdgeIndex::from_edges([("N", "A"), ("N", "B"), ("A", "P"), ("B", "P"), ("P", "R")]);
        let mut paths = PathEnumerator::new(&index);
        assert_eq!(
            ids(&paths.paths("N")),
            vec![vec!["N", "A", "P", "R"], vec!["N", "B", "P", "R"]]
        );
        assert!(paths.diagnostics().is_empty());
    }

    #[test]
    fn test_cycle_closure_keeps_repeated_node() {
        let index = EdgeIndex::from_edges([("X", "Y"), ("Y", "X")]);
        let mut paths = PathEnumerator::new(&index);
        let result = paths.paths("X");
        assert_eq!(ids(&result), vec![vec!["X", "Y", "X"]]);
        assert!(result[0].is_cycle_closed());
        assert_eq!(paths.diagnostics().len(), 1);
        assert_eq!(paths.diagnostics()[0].via, "Y");
        assert_eq!(paths.diagnostics()[0].source, CycleSource::Paths);
    }

    #[test]
    fn test_cycle_in_one_branch_leaves_other_intact() {
        // N → C → N is a loop; N → R is a clean route to a root.
        let index = EdgeIndex::from_edges([("N", "C"), ("N", "R"), ("C", "N")]);
        let mut paths = PathEnumerator::new(&index);
        assert_eq!(
            ids(&paths.paths("N")),
            vec![vec!["N", "C", "N"], vec!["N", "R"]]
        );
    }

    #[test]
    fn test_path_cap_truncates() {
        let index = EdgeIndex::from_edges([("B", "A"), ("C", "A"), ("D", "B"), ("D", "C")]);
        let mut paths = PathEnumerator::new(&index).with_max_paths(Some(1));
        let result = paths.paths("D");
        assert_eq!(ids(&result), vec![vec!["D", "B", "A"]]);
        assert_eq!(paths.truncated(), ["D".to_string()]);

        // A node with exactly `cap` paths is not reported as truncated.
        let result = paths.paths("B");
        assert_eq!(result.len(), 1);
        assert_eq!(paths.truncated().len(), 1);
    }

    #[test]
    fn test_path_accessors() {
        let path = HierarchyPath::new(vec!["D".into(), "B".into(), "A".into()]);
        assert_eq!(path.origin(), "D");
        assert_eq!(path.terminal(), "A");
        assert_eq!(path.ancestors(), ["B".to_string(), "A".to_string()]);
        assert!(!path.is_cycle_closed());
        assert_eq!(path.len(), 3);
    }
}
