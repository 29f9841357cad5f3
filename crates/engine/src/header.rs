//! Normalized-label lookup over a header row.

use std::collections::HashMap;

use crate::cell::CellValue;

/// Trim + case-fold. Both header cells and queries go through this.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Column positions of one header row, keyed by normalized label.
///
/// Duplicate labels are kept in `labels` but only the first occurrence is
/// reachable through [`HeaderIndex::lookup`].
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    labels: Vec<String>,
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn build(header_row: &[CellValue]) -> Self {
        let labels: Vec<String> = header_row.iter().map(|c| c.text()).collect();
        let mut positions = HashMap::with_capacity(labels.len());
        for (col, label) in labels.iter().enumerate() {
            let key = normalize_label(label);
            if key.is_empty() {
                continue;
            }
            positions.entry(key).or_insert(col);
        }
        Self { labels, positions }
    }

    pub fn lookup(&self, label: &str) -> Option<usize> {
        self.positions.get(&normalize_label(label)).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.lookup(label).is_some()
    }

    /// Required labels that do not resolve, in the order they were asked for.
    pub fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|label| !self.contains(label))
            .map(|label| label.to_string())
            .collect()
    }

    /// Normalized labels that appear more than once, in first-seen order.
    pub fn duplicates(&self) -> Vec<String> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut dups = Vec::new();
        for label in &self.labels {
            let key = normalize_label(label);
            if key.is_empty() {
                continue;
            }
            let count = seen.entry(key.clone()).or_insert(0);
            *count += 1;
            if *count == 2 {
                dups.push(key);
            }
        }
        dups
    }

    /// Raw (trimmed) header labels in column order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
