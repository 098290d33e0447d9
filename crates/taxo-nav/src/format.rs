//! Render paths with display labels.

use crate::paths::HierarchyPath;
use taxo_core::labels::LabelTable;

pub const DEFAULT_SEPARATOR: &str = " ; ";

/// Joins path labels with a fixed separator, queried node first.
#[derive(Debug, Clone)]
pub struct PathFormatter<'a> {
    labels: &'a LabelTable,
    separator: String,
}

impl<'a> PathFormatter<'a> {
    pub fn new(labels: &'a LabelTable) -> Self {
        Self::with_separator(labels, DEFAULT_SEPARATOR)
    }

    pub fn with_separator(labels: &'a LabelTable, separator: impl Into<String>) -> Self {
        Self {
            labels,
            separator: separator.into(),
        }
    }

    /// Label of `id`, or `id` itself when unlabeled.
    pub fn label<'s>(&'s self, id: &'s str) -> &'s str {
        self.labels.label(id)
    }

    pub fn format_path(&self, path: &HierarchyPath) -> String {
        self.format_ids(path.iter())
    }

    /// Same as [`format_path`](Self::format_path) for a bare id sequence.
    pub fn format_ids<'i>(&self, ids: impl IntoIterator<Item = &'i str>) -> String {
        let labels: Vec<&str> = ids.into_iter().map(|id| self.labels.label(id)).collect();
        labels.join(self.separator.as_str())
    }

    /// Per-level id and label cells for the ancestors of `path`.
    ///
    /// Entry `k - 1` describes the ancestor `k` levels up. Missing labels are
    /// empty here rather than falling back to the id, so the id column and
    /// label column never repeat each other.
    pub fn level_cells(&self, path: &HierarchyPath) -> Vec<(String, String)> {
        path.ancestors()
            .iter()
            .map(|id| (id.clone(), self.labels.get(id).unwrap_or_default().to_string()))
            .collect()
    }
}

/// Header of the id column for the ancestor `level` steps up (1-based).
pub fn level_column(level: usize) -> String {
    if level == 1 {
        "1_level_up".to_string()
    } else {
        format!("{}_levels_up", level)
    }
}

/// Header of the label column paired with [`level_column`].
pub fn level_label_column(level: usize) -> String {
    format!("{}_preferredlabel", level_column(level))
}

/// Interleaved id/label headers for levels `1..=depth`.
pub fn level_headers(depth: usize) -> Vec<String> {
    (1..=depth)
        .flat_map(|level| [level_column(level), level_label_column(level)])
        .collect()
}
