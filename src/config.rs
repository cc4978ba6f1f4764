//! Application configuration
//!
//! Defaults, then an optional TOML file named by `ACT_LEDGER_CONFIG`, then
//! `ACT_LEDGER_*` environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ledger::DEFAULT_MAX_ENTRIES;
use crate::summarizer::{RuleSummarizer, Summarizer, TextGenerationSummarizer};

pub const CONFIG_PATH_VAR: &str = "ACT_LEDGER_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub act_id: String,
    pub act_title: String,
    pub max_ledger_size: usize,
    pub max_request_size: usize,
    pub rate_limit_requests: usize,
    pub rate_limit_window_secs: u64,
    pub ingest_on_start: Option<PathBuf>,
    pub audit: AuditConfig,
    pub summarizer: SummarizerConfig,
    pub backup: BackupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    pub log_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Rule-based summaries when unset
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            act_id: "ACT-001".to_string(),
            act_title: "Untitled Act".to_string(),
            max_ledger_size: DEFAULT_MAX_ENTRIES,
            max_request_size: 10 * 1024 * 1024,
            rate_limit_requests: 1000,
            rate_limit_window_secs: 60,
            ingest_on_start: None,
            audit: AuditConfig::default(),
            summarizer: SummarizerConfig::default(),
            backup: BackupConfig::default(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: PathBuf::from("audit.log"),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("./backups"),
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self> {
        let mut config = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse {:?}: {}", path, e))?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Apply `ACT_LEDGER_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ACT_LEDGER_HOST") {
            self.server_host = v;
        }
        if let Some(v) = lookup("ACT_LEDGER_PORT") {
            self.server_port = parse_var("ACT_LEDGER_PORT", &v)?;
        }
        if let Some(v) = lookup("ACT_LEDGER_ACT_ID") {
            self.act_id = v;
        }
        if let Some(v) = lookup("ACT_LEDGER_ACT_TITLE") {
            self.act_title = v;
        }
        if let Some(v) = lookup("ACT_LEDGER_MAX_LEDGER_SIZE") {
            self.max_ledger_size = parse_var("ACT_LEDGER_MAX_LEDGER_SIZE", &v)?;
        }
        if let Some(v) = lookup("ACT_LEDGER_MAX_REQUEST_SIZE") {
            self.max_request_size = parse_var("ACT_LEDGER_MAX_REQUEST_SIZE", &v)?;
        }
        if let Some(v) = lookup("ACT_LEDGER_RATE_LIMIT_REQUESTS") {
            self.rate_limit_requests = parse_var("ACT_LEDGER_RATE_LIMIT_REQUESTS", &v)?;
        }
        if let Some(v) = lookup("ACT_LEDGER_RATE_LIMIT_WINDOW_SECS") {
            self.rate_limit_window_secs = parse_var("ACT_LEDGER_RATE_LIMIT_WINDOW_SECS", &v)?;
        }
        if let Some(v) = lookup("ACT_LEDGER_INGEST_ON_START") {
            self.ingest_on_start = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("ACT_LEDGER_AUDIT_LOG") {
            self.audit.log_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("ACT_LEDGER_AUDIT_ENABLED") {
            self.audit.enabled = parse_var("ACT_LEDGER_AUDIT_ENABLED", &v)?;
        }
        if let Some(v) = lookup("ACT_LEDGER_SUMMARIZER_API_KEY") {
            self.summarizer.api_key = Some(v);
        }
        if let Some(v) = lookup("ACT_LEDGER_SUMMARIZER_ENDPOINT") {
            self.summarizer.endpoint = v;
        }
        if let Some(v) = lookup("ACT_LEDGER_BACKUP_DIR") {
            self.backup.dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("ACT_LEDGER_BACKUP_ENABLED") {
            self.backup.enabled = parse_var("ACT_LEDGER_BACKUP_ENABLED", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow!("server_port must be non-zero"));
        }
        if self.act_id.trim().is_empty() {
            return Err(anyhow!("act_id must not be empty"));
        }
        if self.act_title.trim().is_empty() {
            return Err(anyhow!("act_title must not be empty"));
        }
        if self.max_ledger_size == 0 {
            return Err(anyhow!("max_ledger_size must be at least 1"));
        }
        if self.rate_limit_requests == 0 || self.rate_limit_window_secs == 0 {
            return Err(anyhow!("rate limit requests and window must be non-zero"));
        }
        Ok(())
    }
}

impl SummarizerConfig {
    /// Remote summarizer when an API key is configured, rule table otherwise.
    pub fn build(&self) -> Result<Arc<dyn Summarizer>> {
        match &self.api_key {
            Some(key) if !key.trim().is_empty() => {
                info!("Using text generation summarizer ({})", self.model);
                let summarizer = TextGenerationSummarizer::new(
                    self.endpoint.clone(),
                    key.clone(),
                    self.model.clone(),
                )?;
                Ok(Arc::new(summarizer))
            }
            _ => {
                info!("Using rule-based summarizer");
                Ok(Arc::new(RuleSummarizer::new()))
            }
        }
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| anyhow!("Invalid value for {}: {:?} ({})", name, value, e))
}
