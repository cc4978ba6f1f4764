//! HTTP API
//!
//! Serves one ledger owned by [`AppState`]. Every route passes through
//! request tracing, the body size limit, and the per-client rate limiter.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use rate_limit::RateLimiter;
pub use state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_request_size;

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route(
            "/amendments",
            get(handlers::list_amendments).post(handlers::add_amendment),
        )
        .route("/amendments/:version", get(handlers::get_amendment))
        .route("/amendments/:version/diff", get(handlers::get_amendment_diff))
        .route("/verify", get(handlers::verify_chain))
        .route("/search", get(handlers::search))
        .route("/export", get(handlers::export))
        .route("/statistics", get(handlers::statistics))
        .route("/ingest", axum::routing::post(handlers::ingest_xml))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    rate_limit::enforce,
                ))
                .into_inner(),
        )
        .with_state(state)
}
