//! Per-client sliding-window rate limiting

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::api::error::ApiError;
use crate::api::state::AppState;

pub const ANONYMOUS_CLIENT: &str = "anonymous";

/// Allows at most `max_requests` per client within any `window`.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    state: Mutex<ClientWindows>,
}

#[derive(Debug)]
struct ClientWindows {
    requests: HashMap<String, VecDeque<Instant>>,
    last_sweep: Instant,
}

impl ClientWindows {
    /// Drop expired timestamps everywhere and forget clients left with none.
    fn sweep(&mut self, now: Instant, window: Duration) {
        self.requests.retain(|_, timestamps| {
            timestamps.retain(|t| now.duration_since(*t) < window);
            !timestamps.is_empty()
        });
        self.last_sweep = now;
    }
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Mutex::new(ClientWindows {
                requests: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Record a request from `client` and report whether it is within limits.
    pub fn is_allowed(&self, client: &str) -> bool {
        self.is_allowed_at(client, Instant::now())
    }

    /// Forget every client with no request inside the current window.
    pub fn cleanup(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.sweep(Instant::now(), self.window);
    }

    /// Number of clients currently holding request history.
    pub fn tracked_clients(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.requests.len()
    }

    fn is_allowed_at(&self, client: &str, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        // Stale clients are swept at most once per window
        if now.duration_since(state.last_sweep) >= self.window {
            state.sweep(now, self.window);
        }

        let timestamps = state.requests.entry(client.to_string()).or_default();
        while let Some(oldest) = timestamps.front() {
            if now.duration_since(*oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() >= self.max_requests {
            if timestamps.is_empty() {
                state.requests.remove(client);
            }
            return false;
        }
        timestamps.push_back(now);
        true
    }
}

/// First `x-forwarded-for` hop, else the peer address, else `anonymous`.
pub fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string())
}

pub async fn enforce(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_id(request.headers(), peer);

    if !state.rate_limiter.is_allowed(&client) {
        warn!(client = %client, "Rate limit exceeded");
        return Err(ApiError::RateLimited);
    }
    Ok(next.run(request).await)
}
