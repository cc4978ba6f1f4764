//! XML ingestion of amendment histories

pub mod parser;
pub mod pipeline;

pub use parser::{parse_file, parse_str, AmendmentDraft, ParsedAct};
pub use pipeline::{IngestReport, IngestionPipeline, RejectedDraft};
