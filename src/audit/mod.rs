//! Audit Trail
//!
//! Append-only JSONL record of ledger events: appends, verifications,
//! tampering detections, capacity refusals, ingests, and snapshots.

pub mod event;
pub mod logger;

pub use event::AuditEvent;
pub use logger::AuditLogger;
