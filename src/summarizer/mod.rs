//! Plain-language summaries for amendment text
//!
//! A [`Summarizer`] turns legal wording into something a non-lawyer can
//! read. The rule-based table is the default; an external text-generation
//! service can be swapped in without touching records or the ledger.

pub mod remote;
pub mod rules;

pub use remote::TextGenerationSummarizer;
pub use rules::RuleSummarizer;

/// Returned for empty or whitespace-only input.
pub const EMPTY_INPUT_SUMMARY: &str = "No content";

/// Stored on a record built with neither a summary nor a summarizer.
pub const PLACEHOLDER_SUMMARY: &str = "No summary";

/// Maximum summary length in characters before truncation.
pub const MAX_SUMMARY_CHARS: usize = 200;

/// Capability for producing a summary of amendment content.
///
/// Implementations must return non-empty text for any input and must not
/// panic on well-formed UTF-8. Wording may vary between calls.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> String;
}
