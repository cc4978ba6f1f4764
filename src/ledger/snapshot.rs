//! Ledger Snapshots
//!
//! JSON export of a ledger's history. Rows carry every hashed field, so
//! an export can be verified offline without the live ledger.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::LedgerError;
use crate::ledger::entry::HistoryRow;
use crate::ledger::verify::{self, ChainLink, IntegrityReport};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub act_id: String,
    pub act_title: String,
    pub exported_at: DateTime<Utc>,
    pub history: Vec<HistoryRow>,
}

impl LedgerSnapshot {
    /// Write as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;

        info!("Snapshot of {} saved to {:?}", self.act_id, path);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            LedgerError::Snapshot(format!("Failed to read {:?}: {}", path, e))
        })?;
        let snapshot: Self = serde_json::from_str(&contents)?;

        debug!("Loaded {} rows from {:?}", snapshot.history.len(), path);
        Ok(snapshot)
    }

    /// Apply the ledger verification walk to the exported rows.
    pub fn verify(&self, max_entries: Option<usize>) -> Result<usize, LedgerError> {
        verify::check_capacity(self.history.len(), max_entries)?;
        verify::verify_chain(self.history.iter().map(ChainLink::from))
    }

    pub fn integrity_report(&self, max_entries: Option<usize>) -> IntegrityReport {
        IntegrityReport::scan(self.history.iter().map(ChainLink::from), max_entries)
    }

    /// File name used for timestamped backups.
    pub fn backup_file_name(&self) -> String {
        format!(
            "{}-{}.json",
            self.act_id,
            self.exported_at.format("%Y%m%dT%H%M%SZ")
        )
    }
}
