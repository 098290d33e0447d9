//! Display labels for node ids.

use std::collections::HashMap;

/// Mapping from node id to a human-readable label.
///
/// Tables may be incomplete; lookups fall back to the raw id.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    labels: HashMap<String, String>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(id.into(), label.into());
    }

    /// Merge `other` into this table. Entries from `other` win on collision.
    pub fn merge(&mut self, other: LabelTable) {
        self.labels.extend(other.labels);
    }

    /// The recorded label for `id`, if any.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    /// The label for `id`, or `id` itself when none is recorded.
    pub fn label<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (id, label) in iter {
            table.insert(id, label);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_falls_back_to_id() {
        let table: LabelTable = [("A", "Root Skill")].into_iter().collect();
        assert_eq!(table.label("A"), "Root Skill");
        assert_eq!(table.label("B"), "B");
        assert_eq!(table.get("B"), None);
    }

    #[test]
    fn test_merge_later_source_overrides() {
        let mut skills: LabelTable = [("x", "skill x"), ("y", "skill y")].into_iter().collect();
        let groups: LabelTable = [("y", "group y"), ("z", "group z")].into_iter().collect();
        skills.merge(groups);
        assert_eq!(skills.len(), 3);
        assert_eq!(skills.label("x"), "skill x");
        assert_eq!(skills.label("y"), "group y");
        assert_eq!(skills.label("z"), "group z");
    }
}
