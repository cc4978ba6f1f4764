//! Audit Logger
//!
//! Appends audit events to a JSONL file, one event per line.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::audit::event::AuditEvent;

/// Audit logger managing an append-only JSONL file
#[derive(Clone)]
pub struct AuditLogger {
    log_path: PathBuf,
    file: Arc<Mutex<File>>,
    event_count: Arc<Mutex<u64>>,
}

impl AuditLogger {
    /// Open (or create) the log file for appending
    pub fn new(log_path: impl Into<PathBuf>) -> Result<Self> {
        let log_path = log_path.into();

        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| anyhow!("Failed to create log directory: {}", e))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| anyhow!("Failed to open audit log file: {}", e))?;

        info!("Audit log at {:?}", log_path);
        Ok(Self {
            log_path,
            file: Arc::new(Mutex::new(file)),
            event_count: Arc::new(Mutex::new(0)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Append one event and flush
    pub async fn record(&self, event: AuditEvent) -> Result<()> {
        let json = serde_json::to_string(&event)
            .map_err(|e| anyhow!("Failed to serialize audit event: {}", e))?;

        {
            let mut file = self.file.lock().await;
            writeln!(file, "{}", json)
                .map_err(|e| anyhow!("Failed to write to audit log: {}", e))?;
            file.flush()
                .map_err(|e| anyhow!("Failed to flush audit log: {}", e))?;
        }

        *self.event_count.lock().await += 1;

        debug!("Audit: {}", event.summary());
        Ok(())
    }

    /// Events written through this logger since it was opened
    pub async fn event_count(&self) -> u64 {
        *self.event_count.lock().await
    }

    /// Read every event in the file, including ones from earlier runs
    pub async fn read_all(&self) -> Result<Vec<AuditEvent>> {
        // Hold the write lock so no line is read half-written
        let _guard = self.file.lock().await;

        let file = File::open(&self.log_path)
            .map_err(|e| anyhow!("Failed to open audit log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut events = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| anyhow!("Failed to read line {}: {}", line_num + 1, e))?;
            if line.trim().is_empty() {
                continue;
            }

            let event: AuditEvent = serde_json::from_str(&line)
                .map_err(|e| anyhow!("Failed to parse event at line {}: {}", line_num + 1, e))?;
            events.push(event);
        }

        Ok(events)
    }

    /// Events of one type, in file order
    pub async fn events_by_type(&self, event: &str) -> Result<Vec<AuditEvent>> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .filter(|e| e.event == event)
            .collect())
    }
}
