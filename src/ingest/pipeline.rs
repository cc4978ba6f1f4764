//! Ingestion Pipeline
//!
//! Turns parsed amendment drafts into records and appends them to a
//! ledger in document order.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{IngestError, LedgerError};
use crate::ingest::parser::{self, AmendmentDraft};
use crate::ledger::{HistoryRow, Ledger, Record};
use crate::summarizer::Summarizer;

/// A draft that did not make it into the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedDraft {
    /// 1-based position in the source document
    pub position: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub act_id: String,
    pub parsed: usize,
    pub appended: usize,
    pub rejected: Vec<RejectedDraft>,
    pub capacity_reached: bool,
    pub head_hash: Option<String>,
    pub verified: bool,
    /// Rows appended by this run, in ledger order
    #[serde(skip)]
    pub appended_rows: Vec<HistoryRow>,
}

pub struct IngestionPipeline {
    summarizer: Option<Arc<dyn Summarizer>>,
    max_entries: usize,
}

impl IngestionPipeline {
    pub fn new(summarizer: Option<Arc<dyn Summarizer>>, max_entries: usize) -> Self {
        Self {
            summarizer,
            max_entries,
        }
    }

    /// Append `drafts` to an existing ledger.
    ///
    /// Invalid drafts are skipped and reported. Reaching capacity stops
    /// ingestion; everything appended before that stays.
    pub fn ingest_into(&self, ledger: &Ledger, drafts: &[AmendmentDraft]) -> IngestReport {
        let mut report = IngestReport {
            act_id: ledger.id().to_string(),
            parsed: drafts.len(),
            appended: 0,
            rejected: Vec::new(),
            capacity_reached: false,
            head_hash: None,
            verified: false,
            appended_rows: Vec::new(),
        };

        for (i, draft) in drafts.iter().enumerate() {
            let record = match Record::new(
                draft.content.clone(),
                &draft.change_type,
                draft.author.clone(),
                draft.summary.clone(),
                self.summarizer.as_deref(),
            ) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping amendment {}: {}", i + 1, e);
                    report.rejected.push(RejectedDraft {
                        position: i + 1,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match ledger.append_entry(record) {
                Ok(row) => {
                    report.appended += 1;
                    report.appended_rows.push(row);
                }
                Err(e @ LedgerError::CapacityExceeded { .. }) => {
                    warn!("Stopping ingestion at amendment {}: {}", i + 1, e);
                    report.capacity_reached = true;
                    report.rejected.push(RejectedDraft {
                        position: i + 1,
                        reason: e.to_string(),
                    });
                    break;
                }
                Err(e) => {
                    report.rejected.push(RejectedDraft {
                        position: i + 1,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.head_hash = ledger.head_hash();
        report.verified = ledger.verify_integrity();

        info!(
            act = %report.act_id,
            appended = report.appended,
            rejected = report.rejected.len(),
            verified = report.verified,
            "ingest_completed"
        );
        report
    }

    /// Parse an XML document into a fresh ledger for its act.
    pub fn ingest_str(&self, xml: &str) -> Result<(Ledger, IngestReport), IngestError> {
        let parsed = parser::parse_str(xml)?;
        let ledger = Ledger::new(parsed.act_id, parsed.act_title)?.with_max_entries(self.max_entries);
        let report = self.ingest_into(&ledger, &parsed.amendments);
        Ok((ledger, report))
    }

    /// Read an XML file into a fresh ledger for its act.
    pub fn ingest_file(&self, path: &Path) -> Result<(Ledger, IngestReport), IngestError> {
        info!("Ingesting {:?}", path);
        let parsed = parser::parse_file(path)?;
        let ledger = Ledger::new(parsed.act_id, parsed.act_title)?.with_max_entries(self.max_entries);
        let report = self.ingest_into(&ledger, &parsed.amendments);
        Ok((ledger, report))
    }
}
