//! Amendment Record
//!
//! Validated, immutable content of a single change to a legal act.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::summarizer::{Summarizer, PLACEHOLDER_SUMMARY};

/// Classification of an amendment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Changes the legal effect of the act
    Substantive,
    /// Wording, numbering, or formatting only
    Editorial,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substantive => "substantive",
            Self::Editorial => "editorial",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "substantive" => Ok(Self::Substantive),
            "editorial" => Ok(Self::Editorial),
            other => Err(ValidationError::InvalidCategory(other.to_string())),
        }
    }
}

/// A validated amendment. There are no setters: once built, a record can
/// only change by rewriting the bytes it is stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    content: String,
    category: Category,
    author: String,
    summary: String,
    created_at: DateTime<Utc>,
}

impl Record {
    /// Validate inputs and build a record stamped with the current time.
    ///
    /// A supplied non-blank `summary` is kept as is. Otherwise the summary
    /// comes from `summarizer`, or [`PLACEHOLDER_SUMMARY`] without one.
    pub fn new(
        content: impl Into<String>,
        category: &str,
        author: impl Into<String>,
        summary: Option<String>,
        summarizer: Option<&dyn Summarizer>,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        let author = author.into();
        let category = validate(&content, category, &author)?;

        let summary = match summary.filter(|s| !s.trim().is_empty()) {
            Some(summary) => summary,
            None => match summarizer {
                Some(summarizer) => summarizer.summarize(&content),
                None => PLACEHOLDER_SUMMARY.to_string(),
            },
        };

        Ok(Self {
            content,
            category,
            author,
            summary,
            // Micro precision so the canonical timestamp round-trips exactly
            created_at: Utc::now().trunc_subsecs(6),
        })
    }

    /// Rebuild a record read back from storage, re-running validation.
    pub(crate) fn restore(
        content: String,
        category: &str,
        author: String,
        summary: String,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let category = validate(&content, category, &author)?;
        Ok(Self {
            content,
            category,
            author,
            summary,
            created_at,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Canonical string form of `created_at`, as fed to the hash.
    pub fn timestamp(&self) -> String {
        canonical_timestamp(&self.created_at)
    }
}

#[cfg(test)]
impl Record {
    /// Copy of this record with different content, keeping every other
    /// field. Stands in for storage being overwritten.
    pub(crate) fn with_content_at_rest(&self, content: &str) -> Self {
        Self {
            content: content.to_string(),
            ..self.clone()
        }
    }
}

pub(crate) fn canonical_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn validate(content: &str, category: &str, author: &str) -> Result<Category, ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    let category = category.parse::<Category>()?;
    if author.trim().is_empty() {
        return Err(ValidationError::EmptyAuthor);
    }
    Ok(category)
}
