//! Read-only queries over ledger history: search, statistics, and
//! line diffs between consecutive versions.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::ledger::chain::Ledger;
use crate::ledger::entry::HistoryRow;
use crate::ledger::record::Category;

/// Counts by category and author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub substantive: usize,
    pub editorial: usize,
    pub authors: BTreeMap<String, usize>,
}

/// Line-level changes between a version and its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmendmentDiff {
    pub version: usize,
    pub added_lines: Vec<String>,
    pub removed_lines: Vec<String>,
    pub total_changes: usize,
}

impl AmendmentDiff {
    /// Compare two texts as sets of lines.
    pub fn between(version: usize, old_content: &str, new_content: &str) -> Self {
        let old_lines: BTreeSet<&str> = old_content.lines().collect();
        let new_lines: BTreeSet<&str> = new_content.lines().collect();

        let added_lines: Vec<String> = new_lines
            .difference(&old_lines)
            .map(|line| line.to_string())
            .collect();
        let removed_lines: Vec<String> = old_lines
            .difference(&new_lines)
            .map(|line| line.to_string())
            .collect();
        let total_changes = added_lines.len() + removed_lines.len();

        Self {
            version,
            added_lines,
            removed_lines,
            total_changes,
        }
    }
}

impl Ledger {
    /// Case-insensitive substring match on content, summary, and author.
    pub fn search(&self, query: &str) -> Vec<HistoryRow> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.history()
            .into_iter()
            .filter(|row| {
                row.content.to_lowercase().contains(&needle)
                    || row.summary.to_lowercase().contains(&needle)
                    || row.author.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn statistics(&self) -> Statistics {
        let history = self.history();
        let mut stats = Statistics {
            total: history.len(),
            substantive: 0,
            editorial: 0,
            authors: BTreeMap::new(),
        };

        for row in &history {
            match row.category.parse::<Category>() {
                Ok(Category::Substantive) => stats.substantive += 1,
                Ok(Category::Editorial) => stats.editorial += 1,
                Err(_) => {}
            }
            *stats.authors.entry(row.author.clone()).or_insert(0) += 1;
        }

        stats
    }

    /// Diff `version` against the version before it. Version 1 is
    /// compared with empty text.
    pub fn diff(&self, version: usize) -> Option<AmendmentDiff> {
        let current = self.entry(version)?;
        let previous = match version {
            1 => String::new(),
            _ => self.entry(version - 1)?.content,
        };
        Some(AmendmentDiff::between(version, &previous, &current.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Record;

    fn sample_ledger() -> Ledger {
        let ledger = Ledger::new("ACT-1", "Test Act").unwrap();
        let rows = [
            ("Art. 1\nArt. 2", "substantive", "Alice"),
            ("Art. 1\nArt. 2 zmieniony", "editorial", "Bob"),
            ("Podatek VAT", "substantive", "Alice"),
        ];
        for (content, category, author) in rows {
            ledger
                .append(Record::new(content, category, author, None, None).unwrap())
                .unwrap();
        }
        ledger
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let ledger = sample_ledger();
        let hits = ledger.search("podatek");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].version, 3);
        assert_eq!(ledger.search("ALICE").len(), 2);
        assert!(ledger.search("  ").is_empty());
    }

    #[test]
    fn test_statistics() {
        let stats = sample_ledger().statistics();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.substantive, 2);
        assert_eq!(stats.editorial, 1);
        assert_eq!(stats.authors.get("Alice"), Some(&2));
    }

    #[test]
    fn test_diff_against_previous() {
        let diff = sample_ledger().diff(2).unwrap();
        assert_eq!(diff.added_lines, vec!["Art. 2 zmieniony".to_string()]);
        assert_eq!(diff.removed_lines, vec!["Art. 2".to_string()]);
        assert_eq!(diff.total_changes, 2);
    }

    #[test]
    fn test_diff_first_version_and_missing() {
        let ledger = sample_ledger();
        assert_eq!(ledger.diff(1).unwrap().added_lines.len(), 2);
        assert!(ledger.diff(0).is_none());
        assert!(ledger.diff(9).is_none());
    }
}
