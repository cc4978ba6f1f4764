//! Shared server state

use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use crate::api::rate_limit::RateLimiter;
use crate::audit::event::{AMENDMENT_ADDED, INGEST_COMPLETED};
use crate::audit::{AuditEvent, AuditLogger};
use crate::config::AppConfig;
use crate::ingest::IngestReport;
use crate::ledger::Ledger;
use crate::summarizer::Summarizer;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub summarizer: Arc<dyn Summarizer>,
    pub audit: Option<AuditLogger>,
    pub rate_limiter: Arc<RateLimiter>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        ledger: Arc<Ledger>,
        summarizer: Arc<dyn Summarizer>,
        audit: Option<AuditLogger>,
    ) -> Self {
        let rate_limiter = RateLimiter::new(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        );
        Self {
            ledger,
            summarizer,
            audit,
            rate_limiter: Arc::new(rate_limiter),
            config: Arc::new(config),
        }
    }

    /// Write an audit event if auditing is on. Failures are logged, not returned.
    pub async fn audit(&self, event: AuditEvent) {
        if let Some(logger) = &self.audit {
            if let Err(e) = logger.record(event).await {
                error!("Failed to write audit event: {}", e);
            }
        }
    }

    /// One `amendment_added` per appended row, then the run summary.
    pub async fn audit_ingest(&self, report: &IngestReport) {
        for row in &report.appended_rows {
            self.audit(
                AuditEvent::new(AMENDMENT_ADDED, self.ledger.id())
                    .with("version", row.version)
                    .with("hash", &row.hash)
                    .with("author", &row.author)
                    .with("source", "ingest"),
            )
            .await;
        }
        self.audit(
            AuditEvent::new(INGEST_COMPLETED, self.ledger.id())
                .with("appended", report.appended)
                .with("rejected", report.rejected.len())
                .with("verified", report.verified),
        )
        .await;
    }
}
