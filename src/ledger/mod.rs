//! Amendment Ledger
//!
//! Tamper-evident history of amendments to a legal act. Each entry hashes
//! its record together with the previous entry's hash, so rewriting any
//! stored record, hash, or link breaks verification from that point on.

pub mod chain;
pub mod entry;
pub mod query;
pub mod record;
pub mod snapshot;
pub mod verify;

pub use chain::{Ledger, DEFAULT_MAX_ENTRIES};
pub use entry::{HistoryRow, LedgerEntry, GENESIS_PARENT_HASH};
pub use query::{AmendmentDiff, Statistics};
pub use record::{Category, Record};
pub use snapshot::LedgerSnapshot;
pub use verify::{IntegrityReport, Violation};
