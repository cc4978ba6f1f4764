//! XML amendment parser
//!
//! Reads documents of the form
//! `<Act id=".." title=".."><Amendments><Amendment>...</Amendment></Amendments></Act>`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::IngestError;

pub const DEFAULT_ACT_ID: &str = "ACT-UNKNOWN";
pub const DEFAULT_ACT_TITLE: &str = "Unknown Legal Act";
pub const DEFAULT_AUTHOR: &str = "Unknown";
pub const DEFAULT_CHANGE_TYPE: &str = "substantive";

#[derive(Debug, Deserialize)]
struct ActDocument {
    #[serde(rename = "@id")]
    id: Option<String>,
    #[serde(rename = "@title")]
    title: Option<String>,
    #[serde(rename = "Amendments")]
    amendments: Option<AmendmentList>,
}

#[derive(Debug, Deserialize)]
struct AmendmentList {
    #[serde(rename = "Amendment", default)]
    items: Vec<AmendmentElement>,
}

#[derive(Debug, Deserialize)]
struct AmendmentElement {
    #[serde(rename = "Version")]
    version: Option<String>,
    #[serde(rename = "Content")]
    content: Option<String>,
    #[serde(rename = "Author")]
    author: Option<String>,
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Type")]
    change_type: Option<String>,
    #[serde(rename = "Summary")]
    summary: Option<String>,
}

/// An amendment as read from a document, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmendmentDraft {
    pub version: Option<String>,
    pub content: String,
    pub author: String,
    pub date: Option<String>,
    pub change_type: String,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedAct {
    pub act_id: String,
    pub act_title: String,
    pub amendments: Vec<AmendmentDraft>,
}

impl From<AmendmentElement> for AmendmentDraft {
    fn from(element: AmendmentElement) -> Self {
        Self {
            version: element.version,
            content: element.content.unwrap_or_default(),
            author: non_blank(element.author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            date: element.date,
            change_type: non_blank(element.change_type)
                .unwrap_or_else(|| DEFAULT_CHANGE_TYPE.to_string()),
            summary: non_blank(element.summary),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse an XML document held in memory.
pub fn parse_str(xml: &str) -> Result<ParsedAct, IngestError> {
    let document: ActDocument =
        quick_xml::de::from_str(xml).map_err(|e| IngestError::Parse(e.to_string()))?;

    let amendments: Vec<AmendmentDraft> = document
        .amendments
        .map(|list| list.items.into_iter().map(AmendmentDraft::from).collect())
        .unwrap_or_default();

    debug!("Parsed {} amendments", amendments.len());
    Ok(ParsedAct {
        act_id: non_blank(document.id).unwrap_or_else(|| DEFAULT_ACT_ID.to_string()),
        act_title: non_blank(document.title).unwrap_or_else(|| DEFAULT_ACT_TITLE.to_string()),
        amendments,
    })
}

/// Read and parse an XML file.
pub fn parse_file(path: &Path) -> Result<ParsedAct, IngestError> {
    let xml = fs::read_to_string(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let parsed = parse_str(&xml)?;
    info!("Parsed {} amendments from {:?}", parsed.amendments.len(), path);
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Act id="DU-2024-17" title="Ustawa o podatku">
  <Amendments>
    <Amendment>
      <Version>1</Version>
      <Content>Art. 1 otrzymuje brzmienie</Content>
      <Author>Sejm</Author>
      <Date>2024-03-01</Date>
      <Type>substantive</Type>
    </Amendment>
    <Amendment>
      <Content>Poprawka redakcyjna</Content>
      <Type>editorial</Type>
      <Summary>Literówka</Summary>
    </Amendment>
  </Amendments>
</Act>"#;

    #[test]
    fn test_parse_document() {
        let parsed = parse_str(SAMPLE).unwrap();
        assert_eq!(parsed.act_id, "DU-2024-17");
        assert_eq!(parsed.act_title, "Ustawa o podatku");
        assert_eq!(parsed.amendments.len(), 2);

        let first = &parsed.amendments[0];
        assert_eq!(first.version.as_deref(), Some("1"));
        assert_eq!(first.content, "Art. 1 otrzymuje brzmienie");
        assert_eq!(first.author, "Sejm");
        assert_eq!(first.summary, None);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let parsed = parse_str(SAMPLE).unwrap();
        let second = &parsed.amendments[1];
        assert_eq!(second.author, DEFAULT_AUTHOR);
        assert_eq!(second.change_type, "editorial");
        assert_eq!(second.summary.as_deref(), Some("Literówka"));
    }

    #[test]
    fn test_missing_amendments_yields_none() {
        let parsed = parse_str("<Act></Act>").unwrap();
        assert_eq!(parsed.act_id, DEFAULT_ACT_ID);
        assert_eq!(parsed.act_title, DEFAULT_ACT_TITLE);
        assert!(parsed.amendments.is_empty());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            parse_str("<Act><Amendments><Amendment>"),
            Err(IngestError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            parse_file(Path::new("/nonexistent/act.xml")),
            Err(IngestError::Io { .. })
        ));
    }
}
