//! Ledger Entry
//!
//! Couples a record with the hash of its predecessor and its own
//! SHA-256 digest over a canonical encoding of both.

use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::ledger::record::Record;

/// Parent hash of the first entry in every ledger.
pub const GENESIS_PARENT_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// Fields covered by an entry hash, in their stored string form.
#[derive(Debug, Clone, Copy)]
pub struct HashInput<'a> {
    pub content: &'a str,
    pub category: &'a str,
    pub author: &'a str,
    pub summary: &'a str,
    pub created_at: &'a str,
    pub parent_hash: &'a str,
}

impl<'a> HashInput<'a> {
    /// Deterministic byte encoding: JSON with keys in sorted order.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // Keys are written in lexical order, so the encoding is the same
        // whether or not serde_json preserves insertion order.
        json!({
            "parent_hash": self.parent_hash,
            "record": {
                "author": self.author,
                "category": self.category,
                "content": self.content,
                "created_at": self.created_at,
                "summary": self.summary,
            },
        })
        .to_string()
        .into_bytes()
    }

    /// Lowercase hex SHA-256 of the canonical encoding.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes());
        hex::encode(hasher.finalize())
    }
}

/// One row of ledger history, the flat format handed to listing, export,
/// and search consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub version: usize,
    pub hash: String,
    pub parent_hash: String,
    pub content: String,
    pub category: String,
    pub author: String,
    pub summary: String,
    pub created_at: String,
}

impl HistoryRow {
    pub fn hash_input(&self) -> HashInput<'_> {
        HashInput {
            content: &self.content,
            category: &self.category,
            author: &self.author,
            summary: &self.summary,
            created_at: &self.created_at,
            parent_hash: &self.parent_hash,
        }
    }
}

/// Hashed, chained unit stored in a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    sequence_index: usize,
    record: Record,
    parent_hash: String,
    hash: String,
}

impl LedgerEntry {
    /// Create an entry, hashing `record` against `parent_hash`
    /// (the genesis sentinel when `None`).
    pub fn new(sequence_index: usize, record: Record, parent_hash: Option<&str>) -> Self {
        let parent_hash = parent_hash.unwrap_or(GENESIS_PARENT_HASH).to_string();
        let hash = compute_hash(&record, &parent_hash);

        Self {
            sequence_index,
            record,
            parent_hash,
            hash,
        }
    }

    /// Reassemble an entry from stored parts without recomputing its hash.
    pub(crate) fn from_parts(
        sequence_index: usize,
        record: Record,
        parent_hash: String,
        hash: String,
    ) -> Self {
        Self {
            sequence_index,
            record,
            parent_hash,
            hash,
        }
    }

    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn parent_hash(&self) -> &str {
        &self.parent_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Hash recomputed from the current field values.
    pub fn calculate_hash(&self) -> String {
        compute_hash(&self.record, &self.parent_hash)
    }

    /// True iff the stored hash matches the recomputed one.
    pub fn verify(&self) -> bool {
        self.hash == self.calculate_hash()
    }

    pub fn to_row(&self) -> HistoryRow {
        HistoryRow {
            version: self.sequence_index,
            hash: self.hash.clone(),
            parent_hash: self.parent_hash.clone(),
            content: self.record.content().to_string(),
            category: self.record.category().as_str().to_string(),
            author: self.record.author().to_string(),
            summary: self.record.summary().to_string(),
            created_at: self.record.timestamp(),
        }
    }

    /// Short form for log lines.
    pub fn summary(&self) -> String {
        format!(
            "#{} {} by {} ({})",
            self.sequence_index,
            self.record.category(),
            self.record.author(),
            &self.hash[..16.min(self.hash.len())]
        )
    }
}

#[cfg(test)]
impl LedgerEntry {
    pub(crate) fn overwrite_hash_at_rest(&mut self, hash: &str) {
        self.hash = hash.to_string();
    }

    pub(crate) fn overwrite_parent_hash_at_rest(&mut self, parent_hash: &str) {
        self.parent_hash = parent_hash.to_string();
    }

    pub(crate) fn overwrite_record_at_rest(&mut self, record: Record) {
        self.record = record;
    }

    pub(crate) fn set_sequence_index(&mut self, sequence_index: usize) {
        self.sequence_index = sequence_index;
    }
}

/// Hash of `(record, parent_hash)`.
pub fn compute_hash(record: &Record, parent_hash: &str) -> String {
    let created_at = record.timestamp();
    HashInput {
        content: record.content(),
        category: record.category().as_str(),
        author: record.author(),
        summary: record.summary(),
        created_at: &created_at,
        parent_hash,
    }
    .digest()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str) -> Record {
        Record::new(content, "substantive", "Alice", None, None).unwrap()
    }

    #[test]
    fn test_entry_creation() {
        let entry = LedgerEntry::new(1, record("Test"), None);
        assert_eq!(entry.sequence_index(), 1);
        assert_eq!(entry.parent_hash(), GENESIS_PARENT_HASH);
        assert_eq!(entry.hash().len(), HASH_HEX_LEN);
        assert!(entry.hash().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(entry.verify());
    }

    #[test]
    fn test_hash_calculation_is_deterministic() {
        let entry = LedgerEntry::new(1, record("Test"), Some("ab".repeat(32).as_str()));
        assert_eq!(entry.calculate_hash(), entry.calculate_hash());
        assert_eq!(compute_hash(entry.record(), entry.parent_hash()), entry.hash());
    }

    #[test]
    fn test_parent_hash_changes_digest() {
        let r = record("Test");
        let a = LedgerEntry::new(1, r.clone(), None);
        let b = LedgerEntry::new(1, r, Some("ff".repeat(32).as_str()));
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_canonical_bytes_sorted_keys() {
        let input = HashInput {
            content: "c",
            category: "editorial",
            author: "a",
            summary: "s",
            created_at: "2024-01-01T00:00:00.000000Z",
            parent_hash: GENESIS_PARENT_HASH,
        };
        let encoded = String::from_utf8(input.canonical_bytes()).unwrap();
        assert_eq!(
            encoded,
            format!(
                r#"{{"parent_hash":"{}","record":{{"author":"a","category":"editorial","content":"c","created_at":"2024-01-01T00:00:00.000000Z","summary":"s"}}}}"#,
                GENESIS_PARENT_HASH
            )
        );
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        let base = HashInput {
            content: "ab",
            category: "editorial",
            author: "c",
            summary: "s",
            created_at: "t",
            parent_hash: GENESIS_PARENT_HASH,
        };
        let shifted = HashInput {
            content: "a",
            author: "bc",
            ..base
        };
        assert_ne!(base.digest(), shifted.digest());
    }

    #[test]
    fn test_tampered_record_fails_verify() {
        let mut entry = LedgerEntry::new(1, record("Original"), None);
        let tampered = entry.record().with_content_at_rest("TAMPERED");
        entry.overwrite_record_at_rest(tampered);
        assert!(!entry.verify());
    }

    #[test]
    fn test_row_hash_matches_entry_hash() {
        let entry = LedgerEntry::new(3, record("Row"), None);
        let row = entry.to_row();
        assert_eq!(row.version, 3);
        assert_eq!(row.hash_input().digest(), entry.hash());
    }
}
