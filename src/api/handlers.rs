//! Route handlers

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::audit::event::{
    AuditEvent, AMENDMENT_ADDED, CAPACITY_EXCEEDED, CHAIN_VERIFIED, TAMPERING_DETECTED,
};
use crate::error::LedgerError;
use crate::ingest::{self, IngestReport, IngestionPipeline};
use crate::ledger::{AmendmentDiff, HistoryRow, LedgerSnapshot, Record, Statistics};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AmendmentRequest {
    pub content: String,
    pub change_type: String,
    pub author: String,
    pub summary: Option<String>,
}

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": "act-ledger",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "act_id": state.ledger.id(),
        "act_title": state.ledger.title(),
    }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "act-ledger",
        "timestamp": chrono::Utc::now()
    }))
}

/// Paginated history, oldest first
pub async fn list_amendments(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Json<Value> {
    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

    let history = state.ledger.history();
    let total = history.len();
    let page: Vec<HistoryRow> = history.into_iter().skip(skip).take(limit).collect();

    Json(json!({
        "amendments": page,
        "total": total,
        "skip": skip,
        "limit": limit,
    }))
}

pub async fn add_amendment(
    State(state): State<AppState>,
    payload: Result<Json<AmendmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    // Summarizers may call out over the network
    let summarizer = state.summarizer.clone();
    let record = tokio::task::spawn_blocking(move || {
        Record::new(
            request.content,
            &request.change_type,
            request.author,
            request.summary,
            Some(summarizer.as_ref()),
        )
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Summarizer task failed: {}", e)))?
    .map_err(LedgerError::from)?;

    let author = record.author().to_string();
    let row = match state.ledger.append_entry(record) {
        Ok(row) => row,
        Err(e @ LedgerError::CapacityExceeded { .. }) => {
            state
                .audit(
                    AuditEvent::new(CAPACITY_EXCEEDED, state.ledger.id())
                        .with("limit", state.ledger.max_entries()),
                )
                .await;
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    state
        .audit(
            AuditEvent::new(AMENDMENT_ADDED, state.ledger.id())
                .with("version", row.version)
                .with("hash", &row.hash)
                .with("author", author),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "hash": row.hash,
            "version": row.version,
        })),
    ))
}

pub async fn get_amendment(
    State(state): State<AppState>,
    Path(version): Path<usize>,
) -> Result<Json<HistoryRow>, ApiError> {
    state
        .ledger
        .entry(version)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Amendment {} not found", version)))
}

pub async fn get_amendment_diff(
    State(state): State<AppState>,
    Path(version): Path<usize>,
) -> Result<Json<AmendmentDiff>, ApiError> {
    state
        .ledger
        .diff(version)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Amendment {} not found", version)))
}

pub async fn verify_chain(State(state): State<AppState>) -> Json<Value> {
    let act_id = state.ledger.id();
    let (amendments, result) = state.ledger.check_integrity_with_len();

    let (valid, violation, event) = match result {
        Ok(count) => (
            true,
            Value::Null,
            AuditEvent::new(CHAIN_VERIFIED, act_id).with("amendments", count),
        ),
        Err(LedgerError::IntegrityViolation {
            sequence_index,
            kind,
        }) => (
            false,
            json!({ "sequence_index": sequence_index, "kind": kind }),
            AuditEvent::new(TAMPERING_DETECTED, act_id)
                .with("node", sequence_index)
                .with("reason", kind),
        ),
        Err(e) => {
            warn!("Verification refused: {}", e);
            (
                false,
                json!({ "error": e.to_string() }),
                AuditEvent::new(CAPACITY_EXCEEDED, act_id).with("size", amendments),
            )
        }
    };
    state.audit(event).await;

    Json(json!({
        "valid": valid,
        "amendments": amendments,
        "violation": violation,
        "timestamp": chrono::Utc::now(),
    }))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("query must not be empty".to_string()))?;

    let results = state.ledger.search(&query);
    Ok(Json(json!({
        "query": query,
        "count": results.len(),
        "results": results,
    })))
}

pub async fn export(State(state): State<AppState>) -> Json<LedgerSnapshot> {
    Json(state.ledger.snapshot())
}

pub async fn statistics(State(state): State<AppState>) -> Json<Statistics> {
    Json(state.ledger.statistics())
}

/// Ingest an XML document into the served ledger
pub async fn ingest_xml(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<IngestReport>, ApiError> {
    let parsed = ingest::parse_str(&body)?;
    if parsed.act_id != state.ledger.id() {
        info!(
            "Ingesting amendments of {} into ledger {}",
            parsed.act_id,
            state.ledger.id()
        );
    }

    let ledger = state.ledger.clone();
    let pipeline = IngestionPipeline::new(Some(state.summarizer.clone()), ledger.max_entries());
    let report = tokio::task::spawn_blocking(move || {
        pipeline.ingest_into(&ledger, &parsed.amendments)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Ingest task failed: {}", e)))?;

    state.audit_ingest(&report).await;

    Ok(Json(report))
}
