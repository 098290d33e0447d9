//! Run summaries: level distribution and path multiplicity.

use crate::paths::HierarchyPath;
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary of a depth run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LevelReport {
    /// Entity rows processed.
    pub entities: usize,
    /// Nodes with a memoized depth, ancestors included.
    pub resolved_nodes: usize,
    /// Depth → number of resolved nodes.
    pub levels: BTreeMap<usize, usize>,
    /// Cycles contained while resolving.
    pub cycles: usize,
}

impl LevelReport {
    pub fn max_level(&self) -> usize {
        self.levels.keys().next_back().copied().unwrap_or(0)
    }
}

/// Buckets of entities by number of paths.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PathCountDistribution {
    pub one: usize,
    pub two_to_five: usize,
    pub six_to_ten: usize,
    pub over_ten: usize,
}

/// Accumulated statistics over a path run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PathStats {
    /// Entity rows processed.
    pub entities: usize,
    /// Output rows, one per path.
    pub rows: usize,
    pub single_path: usize,
    pub multi_path: usize,
    /// Most paths produced for one entity.
    pub max_paths: usize,
    /// Longest path in nodes, the entity included.
    pub max_path_len: usize,
    pub distribution: PathCountDistribution,
    /// Path length in nodes → number of rows.
    pub rows_by_length: BTreeMap<usize, usize>,
    pub cycle_closures: usize,
    /// Entities whose enumeration hit the path cap.
    pub truncated: usize,
}

impl PathStats {
    /// Fold in the paths of one entity.
    pub fn record(&mut self, paths: &[HierarchyPath]) {
        let count = paths.len();
        self.entities += 1;
        self.rows += count;
        if count <= 1 {
            self.single_path += 1;
        } else {
            self.multi_path += 1;
        }
        self.max_paths = self.max_paths.max(count);

        match count {
            0 | 1 => self.distribution.one += 1,
            2..=5 => self.distribution.two_to_five += 1,
            6..=10 => self.distribution.six_to_ten += 1,
            _ => self.distribution.over_ten += 1,
        }

        for path in paths {
            self.max_path_len = self.max_path_len.max(path.len());
            *self.rows_by_length.entry(path.len()).or_insert(0) += 1;
        }
    }

    /// Rows whose path climbs at least `levels_up` ancestors.
    pub fn rows_reaching(&self, levels_up: usize) -> usize {
        self.rows_by_length
            .range(levels_up + 1..)
            .map(|(_, rows)| rows)
            .sum()
    }

    pub fn average_paths(&self) -> f64 {
        if self.entities == 0 {
            0.0
        } else {
            self.rows as f64 / self.entities as f64
        }
    }

    /// Share of rows, as a percentage.
    pub fn percent_of_rows(&self, rows: usize) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            rows as f64 * 100.0 / self.rows as f64
        }
    }
}
