//! Audit Event
//!
//! One line of the audit trail.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const AMENDMENT_ADDED: &str = "amendment_added";
pub const CHAIN_VERIFIED: &str = "chain_verified";
pub const TAMPERING_DETECTED: &str = "tampering_detected";
pub const CAPACITY_EXCEEDED: &str = "capacity_exceeded";
pub const INGEST_COMPLETED: &str = "ingest_completed";
pub const SNAPSHOT_WRITTEN: &str = "snapshot_written";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub event: String,
    pub act_id: String,
    /// Sorted so serialized lines are stable
    pub details: BTreeMap<String, String>,
}

impl AuditEvent {
    pub fn new(event: &str, act_id: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            event: event.to_string(),
            act_id: act_id.to_string(),
            details: BTreeMap::new(),
        }
    }

    /// Attach a detail, builder style.
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }

    /// `event | act=.. | key=value ...`
    pub fn summary(&self) -> String {
        let mut parts = vec![self.event.clone(), format!("act={}", self.act_id)];
        parts.extend(self.details.iter().map(|(k, v)| format!("{}={}", k, v)));
        parts.join(" | ")
    }
}
