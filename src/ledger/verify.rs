//! Integrity Verification
//!
//! Forward walk over a chain recomputing every hash and checking every
//! parent link. Works on anything that yields [`ChainLink`]s, so the same
//! rules apply to a live ledger and to exported history rows.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{LedgerError, ViolationKind};
use crate::ledger::entry::{HistoryRow, LedgerEntry};

/// What the walk needs to know about one position in the chain.
#[derive(Debug, Clone)]
pub struct ChainLink<'a> {
    pub sequence_index: usize,
    pub stored_hash: &'a str,
    pub parent_hash: &'a str,
    pub recomputed_hash: String,
}

impl<'a> From<&'a LedgerEntry> for ChainLink<'a> {
    fn from(entry: &'a LedgerEntry) -> Self {
        Self {
            sequence_index: entry.sequence_index(),
            stored_hash: entry.hash(),
            parent_hash: entry.parent_hash(),
            recomputed_hash: entry.calculate_hash(),
        }
    }
}

impl<'a> From<&'a HistoryRow> for ChainLink<'a> {
    fn from(row: &'a HistoryRow) -> Self {
        Self {
            sequence_index: row.version,
            stored_hash: &row.hash,
            parent_hash: &row.parent_hash,
            recomputed_hash: row.hash_input().digest(),
        }
    }
}

/// Fail closed when a chain is longer than `max_entries`.
pub fn check_capacity(len: usize, max_entries: Option<usize>) -> Result<(), LedgerError> {
    match max_entries {
        Some(limit) if len > limit => Err(LedgerError::CapacityExceeded { limit, actual: len }),
        _ => Ok(()),
    }
}

/// Verify a chain, stopping at the first violation.
///
/// Each link's parent is checked before its own hash, so a rewritten
/// `parent_hash` reports a broken link rather than a hash mismatch.
/// Returns the number of verified links.
pub fn verify_chain<'a, I>(links: I) -> Result<usize, LedgerError>
where
    I: IntoIterator<Item = ChainLink<'a>>,
{
    let mut previous_hash: Option<&str> = None;
    let mut count = 0;

    for link in links {
        if let Some(expected) = previous_hash {
            if link.parent_hash != expected {
                return Err(LedgerError::IntegrityViolation {
                    sequence_index: link.sequence_index,
                    kind: ViolationKind::ParentLinkBroken,
                });
            }
        }

        if link.recomputed_hash != link.stored_hash {
            return Err(LedgerError::IntegrityViolation {
                sequence_index: link.sequence_index,
                kind: ViolationKind::HashMismatch,
            });
        }

        previous_hash = Some(link.stored_hash);
        count += 1;
    }

    Ok(count)
}

/// One problem found by a full scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub sequence_index: usize,
    pub kind: ViolationKind,
}

/// Result of a non-short-circuiting scan, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub is_valid: bool,
    pub entry_count: usize,
    pub capacity_exceeded: bool,
    pub violations: Vec<Violation>,
}

impl IntegrityReport {
    /// Scan every link and collect all violations.
    pub fn scan<'a, I>(links: I, max_entries: Option<usize>) -> Self
    where
        I: IntoIterator<Item = ChainLink<'a>>,
    {
        let mut violations = Vec::new();
        let mut previous_hash: Option<&str> = None;
        let mut entry_count = 0;

        for link in links {
            if let Some(expected) = previous_hash {
                if link.parent_hash != expected {
                    violations.push(Violation {
                        sequence_index: link.sequence_index,
                        kind: ViolationKind::ParentLinkBroken,
                    });
                }
            }
            if link.recomputed_hash != link.stored_hash {
                violations.push(Violation {
                    sequence_index: link.sequence_index,
                    kind: ViolationKind::HashMismatch,
                });
            }
            previous_hash = Some(link.stored_hash);
            entry_count += 1;
        }

        let capacity_exceeded = check_capacity(entry_count, max_entries).is_err();
        if !violations.is_empty() {
            warn!("Integrity scan found {} violations", violations.len());
        } else if !capacity_exceeded {
            info!("Integrity scan clean: {} entries", entry_count);
        }

        Self {
            is_valid: violations.is_empty() && !capacity_exceeded,
            entry_count,
            capacity_exceeded,
            violations,
        }
    }

    /// Indices of entries whose stored hash does not match their content.
    pub fn tampered_entries(&self) -> Vec<usize> {
        self.violations
            .iter()
            .filter(|v| v.kind == ViolationKind::HashMismatch)
            .map(|v| v.sequence_index)
            .collect()
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        if self.is_valid {
            format!("Ledger is valid ({} entries)", self.entry_count)
        } else if self.capacity_exceeded && self.violations.is_empty() {
            format!("Ledger exceeds capacity ({} entries)", self.entry_count)
        } else {
            let first = &self.violations[0];
            format!(
                "Ledger is invalid ({} entries): {} violations, first {} at entry {}",
                self.entry_count,
                self.violations.len(),
                first.kind,
                first.sequence_index
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link<'a>(index: usize, stored: &'a str, parent: &'a str, recomputed: &str) -> ChainLink<'a> {
        ChainLink {
            sequence_index: index,
            stored_hash: stored,
            parent_hash: parent,
            recomputed_hash: recomputed.to_string(),
        }
    }

    #[test]
    fn test_empty_chain_is_valid() {
        assert_eq!(verify_chain(Vec::<ChainLink>::new()), Ok(0));
    }

    #[test]
    fn test_valid_chain() {
        let links = vec![link(1, "a", "0", "a"), link(2, "b", "a", "b"), link(3, "c", "b", "c")];
        assert_eq!(verify_chain(links), Ok(3));
    }

    #[test]
    fn test_link_checked_before_hash() {
        let links = vec![link(1, "a", "0", "a"), link(2, "b", "x", "not-b")];
        assert_eq!(
            verify_chain(links).unwrap_err().violation(),
            Some((2, ViolationKind::ParentLinkBroken))
        );

        let links = vec![link(1, "a", "0", "a"), link(2, "b", "a", "not-b")];
        assert_eq!(
            verify_chain(links).unwrap_err().violation(),
            Some((2, ViolationKind::HashMismatch))
        );
    }

    #[test]
    fn test_report_orders_link_before_hash() {
        let links = vec![link(1, "a", "0", "a"), link(2, "b", "x", "not-b")];
        let report = IntegrityReport::scan(links, None);
        assert_eq!(
            report.violations,
            vec![
                Violation { sequence_index: 2, kind: ViolationKind::ParentLinkBroken },
                Violation { sequence_index: 2, kind: ViolationKind::HashMismatch },
            ]
        );
    }

    #[test]
    fn test_broken_link() {
        let links = vec![link(1, "a", "0", "a"), link(2, "b", "x", "b")];
        assert_eq!(
            verify_chain(links).unwrap_err().violation(),
            Some((2, ViolationKind::ParentLinkBroken))
        );
    }

    #[test]
    fn test_first_link_parent_not_checked() {
        let links = vec![link(1, "a", "anything", "a")];
        assert_eq!(verify_chain(links), Ok(1));
    }

    #[test]
    fn test_capacity() {
        assert!(check_capacity(10, Some(10)).is_ok());
        assert!(check_capacity(10, None).is_ok());
        assert_eq!(
            check_capacity(11, Some(10)),
            Err(LedgerError::CapacityExceeded { limit: 10, actual: 11 })
        );
    }

    #[test]
    fn test_report_collects_all_violations() {
        let links = vec![
            link(1, "a", "0", "tampered"),
            link(2, "b", "a", "b"),
            link(3, "c", "zz", "c"),
        ];
        let report = IntegrityReport::scan(links, None);
        assert!(!report.is_valid);
        assert_eq!(report.entry_count, 3);
        assert_eq!(report.violations.len(), 2);
        assert_eq!(report.tampered_entries(), vec![1]);
        assert!(report.summary().contains("hash_mismatch at entry 1"));
    }

    #[test]
    fn test_report_capacity() {
        let links = vec![link(1, "a", "0", "a"), link(2, "b", "a", "b")];
        let report = IntegrityReport::scan(links, Some(1));
        assert!(!report.is_valid);
        assert!(report.capacity_exceeded);
        assert!(report.summary().contains("exceeds capacity"));
    }
}
