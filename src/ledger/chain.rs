//! Amendment Ledger
//!
//! Append-only, hash-linked sequence of entries for one legal act.
//! Appends are serialized behind a write lock; reads and verification take
//! a read lock and therefore always see a whole number of entries.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{LedgerError, ValidationError};
use crate::ledger::entry::{HistoryRow, LedgerEntry};
use crate::ledger::record::Record;
use crate::ledger::snapshot::LedgerSnapshot;
use crate::ledger::verify::{self, ChainLink, IntegrityReport};

/// Default cap on ledger length.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Tamper-evident amendment history for one act.
#[derive(Debug)]
pub struct Ledger {
    id: String,
    title: String,
    max_entries: usize,
    entries: RwLock<Vec<LedgerEntry>>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Result<Self, LedgerError> {
        let id = id.into();
        let title = title.into();

        if id.trim().is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }

        debug!("Created ledger {} ({})", id, title);
        Ok(Self {
            id,
            title,
            max_entries: DEFAULT_MAX_ENTRIES,
            entries: RwLock::new(Vec::new()),
        })
    }

    /// Set the maximum number of entries. Appends beyond it are refused.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// Hash of the newest entry, if any.
    pub fn head_hash(&self) -> Option<String> {
        self.read_entries().last().map(|entry| entry.hash().to_string())
    }

    /// Append a record and return the new entry's hash.
    pub fn append(&self, record: Record) -> Result<String, LedgerError> {
        self.append_entry(record).map(|row| row.hash)
    }

    /// Append a record and return the stored row.
    ///
    /// Reading the tail, hashing, and pushing happen under one write lock,
    /// so two appends can never share a parent.
    pub fn append_entry(&self, record: Record) -> Result<HistoryRow, LedgerError> {
        let mut entries = self.write_entries();

        if entries.len() >= self.max_entries {
            warn!(
                act = %self.id,
                size = entries.len(),
                "Refusing append: ledger at capacity ({})",
                self.max_entries
            );
            return Err(LedgerError::CapacityExceeded {
                limit: self.max_entries,
                actual: entries.len() + 1,
            });
        }

        let parent_hash = entries.last().map(|entry| entry.hash().to_string());
        let entry = LedgerEntry::new(entries.len() + 1, record, parent_hash.as_deref());
        let row = entry.to_row();

        info!(
            act = %self.id,
            hash = &row.hash[..16],
            author = entry.record().author(),
            "amendment_added"
        );
        debug!("Appended {}", entry.summary());

        entries.push(entry);
        Ok(row)
    }

    /// Snapshot of every entry in insertion order.
    pub fn history(&self) -> Vec<HistoryRow> {
        self.read_entries().iter().map(LedgerEntry::to_row).collect()
    }

    /// Row for a 1-based version number.
    pub fn entry(&self, version: usize) -> Option<HistoryRow> {
        if version == 0 {
            return None;
        }
        self.read_entries().get(version - 1).map(LedgerEntry::to_row)
    }

    /// Walk the chain from the oldest entry, stopping at the first failure.
    ///
    /// Returns the number of verified entries. Fails closed with
    /// `CapacityExceeded` when the ledger is over its limit.
    pub fn check_integrity(&self) -> Result<usize, LedgerError> {
        let entries = self.read_entries();
        self.check_entries(&entries)
    }

    /// Like [`Ledger::check_integrity`], also returning the ledger length
    /// seen under the same read lock.
    pub fn check_integrity_with_len(&self) -> (usize, Result<usize, LedgerError>) {
        let entries = self.read_entries();
        (entries.len(), self.check_entries(&entries))
    }

    fn check_entries(&self, entries: &[LedgerEntry]) -> Result<usize, LedgerError> {
        if let Err(e) = verify::check_capacity(entries.len(), Some(self.max_entries)) {
            warn!(act = %self.id, size = entries.len(), "chain_too_large");
            return Err(e);
        }

        match verify::verify_chain(entries.iter().map(ChainLink::from)) {
            Ok(count) => {
                info!(act = %self.id, amendments = count, "chain_verified");
                Ok(count)
            }
            Err(e) => {
                if let Some((index, kind)) = e.violation() {
                    warn!(act = %self.id, node = index, reason = %kind, "tampering_detected");
                }
                Err(e)
            }
        }
    }

    /// True iff every hash and parent link checks out.
    pub fn verify_integrity(&self) -> bool {
        self.check_integrity().is_ok()
    }

    /// Full diagnostic scan listing every violation. Never repairs.
    pub fn integrity_report(&self) -> IntegrityReport {
        let entries = self.read_entries();
        IntegrityReport::scan(entries.iter().map(ChainLink::from), Some(self.max_entries))
    }

    /// Export id, title, and full history.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            act_id: self.id.clone(),
            act_title: self.title.clone(),
            exported_at: Utc::now(),
            history: self.history(),
        }
    }

    /// Rebuild a ledger from an exported snapshot.
    ///
    /// Every row is re-validated as a record, then the whole chain is
    /// verified. Any failure rejects the snapshot.
    pub fn restore(snapshot: &LedgerSnapshot, max_entries: usize) -> Result<Self, LedgerError> {
        let ledger = Self::new(snapshot.act_id.clone(), snapshot.act_title.clone())?
            .with_max_entries(max_entries);

        verify::check_capacity(snapshot.history.len(), Some(max_entries))?;

        let mut entries = Vec::with_capacity(snapshot.history.len());
        for (position, row) in snapshot.history.iter().enumerate() {
            let created_at = DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| {
                    LedgerError::Snapshot(format!(
                        "Invalid created_at in version {}: {}",
                        row.version, e
                    ))
                })?
                .with_timezone(&Utc);

            let record = Record::restore(
                row.content.clone(),
                &row.category,
                row.author.clone(),
                row.summary.clone(),
                created_at,
            )
            .map_err(LedgerError::InvalidRecord)?;

            entries.push(LedgerEntry::from_parts(
                position + 1,
                record,
                row.parent_hash.clone(),
                row.hash.clone(),
            ));
        }

        *ledger.write_entries() = entries;
        ledger.check_integrity()?;

        info!("Restored ledger {} with {} entries", ledger.id, ledger.len());
        Ok(ledger)
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, Vec<LedgerEntry>> {
        // Entries are pushed fully built, so a poisoned lock still guards
        // a consistent vector.
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, Vec<LedgerEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
impl Ledger {
    pub(crate) fn overwrite_hash_at_rest(&self, version: usize, hash: &str) {
        self.write_entries()[version - 1].overwrite_hash_at_rest(hash);
    }
}
