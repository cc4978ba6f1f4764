#![allow(dead_code)]

use std::sync::Arc;

use act_ledger::api::AppState;
use act_ledger::audit::AuditLogger;
use act_ledger::config::AppConfig;
use act_ledger::ledger::{Ledger, Record};
use act_ledger::summarizer::RuleSummarizer;
use tempfile::TempDir;

pub const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Act id="DU-2024-17" title="Ustawa o podatku dochodowym">
  <Amendments>
    <Amendment>
      <Version>1</Version>
      <Content>Artykuł 1. Podmiot powinien zapłacić podatek do dnia 31 marca.</Content>
      <Author>Sejm</Author>
      <Date>2024-01-15</Date>
      <Type>substantive</Type>
    </Amendment>
    <Amendment>
      <Version>2</Version>
      <Content>W artykule 1 wyraz "marca" zastępuje się wyrazem "kwietnia".</Content>
      <Author>Senat</Author>
      <Type>editorial</Type>
      <Summary>Przesunięcie terminu</Summary>
    </Amendment>
    <Amendment>
      <Version>3</Version>
      <Content>Zabrania się zwolnień z wyjątkiem osób prawnych.</Content>
      <Type>substantive</Type>
    </Amendment>
  </Amendments>
</Act>"#;

pub fn record(content: &str, author: &str) -> Record {
    Record::new(content, "substantive", author, None, None).expect("valid test record")
}

/// The three-entry ACT-1 ledger used across scenarios
pub fn sample_ledger() -> Ledger {
    let ledger = Ledger::new("ACT-1", "Test Act").expect("valid ledger");
    for (content, author) in [("A", "Alice"), ("B", "Bob"), ("C", "Carol")] {
        ledger.append(record(content, author)).expect("append");
    }
    ledger
}

/// Server state backed by a temporary audit log
pub fn test_state(config: AppConfig) -> (AppState, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let audit = AuditLogger::new(dir.path().join("audit.log")).expect("audit log");
    let ledger = Ledger::new(config.act_id.clone(), config.act_title.clone())
        .expect("valid ledger")
        .with_max_entries(config.max_ledger_size);
    let state = AppState::new(
        config,
        Arc::new(ledger),
        Arc::new(RuleSummarizer::new()),
        Some(audit),
    );
    (state, dir)
}
