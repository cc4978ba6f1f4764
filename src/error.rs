use std::fmt;

use thiserror::Error;

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Snapshot(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Snapshot(format!("I/O error: {}", err))
    }
}

/// Caller-correctable input errors. Never coerced, never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("content must not be empty")]
    EmptyContent,

    #[error("invalid category {0:?}: must be one of substantive, editorial")]
    InvalidCategory(String),

    #[error("author must not be empty")]
    EmptyAuthor,

    #[error("ledger id must not be empty")]
    EmptyId,

    #[error("ledger title must not be empty")]
    EmptyTitle,
}

/// Which check a verification walk failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    HashMismatch,
    ParentLinkBroken,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HashMismatch => f.write_str("hash_mismatch"),
            Self::ParentLinkBroken => f.write_str("parent_link_broken"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid record: {0}")]
    InvalidRecord(ValidationError),

    #[error("Integrity violation at entry {sequence_index}: {kind}")]
    IntegrityViolation {
        sequence_index: usize,
        kind: ViolationKind,
    },

    #[error("Capacity exceeded: ledger holds {actual} entries, limit is {limit}")]
    CapacityExceeded { limit: usize, actual: usize },

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl LedgerError {
    /// The offending entry, if this is an integrity violation.
    pub fn violation(&self) -> Option<(usize, ViolationKind)> {
        match self {
            Self::IntegrityViolation {
                sequence_index,
                kind,
            } => Some((*sequence_index, *kind)),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("XML parsing error: {0}")]
    Parse(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
