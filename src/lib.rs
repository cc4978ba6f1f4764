pub mod api;
pub mod audit;
pub mod config;
pub mod error;
pub mod ingest;
pub mod ledger;
pub mod summarizer;

pub use error::{IngestError, LedgerError, ValidationError, ViolationKind};
pub use ledger::{HistoryRow, Ledger, LedgerSnapshot, Record};
pub use summarizer::Summarizer;
