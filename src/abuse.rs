//! Rate limiting for the game API
//!
//! Every round may trigger a paid generative call, so each session gets a
//! fixed request budget per time window. Requests without a session cookie
//! share a budget per client address.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request, Response, StatusCode},
    middleware::Next,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use crate::api::session_id_from_headers;

/// Entries kept before stale windows are swept
const CLEANUP_THRESHOLD: usize = 10_000;

/// Rate limiter state
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Map of key to (request count, window start)
    requests: Arc<RwLock<HashMap<String, (u32, Instant)>>>,
    /// Maximum requests per window
    max_requests: u32,
    /// Time window duration
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(60, Duration::from_secs(10))
    }
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    /// Check if a request should be allowed
    /// Returns true if allowed, false if rate limited
    pub async fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut requests = self.requests.write().await;

        if requests.len() >= CLEANUP_THRESHOLD {
            let window = self.window;
            requests.retain(|_, (_, start)| now.duration_since(*start) < window * 2);
        }

        match requests.get_mut(key) {
            Some((count, window_start)) => {
                if now.duration_since(*window_start) >= self.window {
                    *count = 1;
                    *window_start = now;
                    true
                } else if *count >= self.max_requests {
                    false
                } else {
                    *count += 1;
                    true
                }
            }
            None => {
                requests.insert(key.to_string(), (1, now));
                true
            }
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Anti-abuse configuration
#[derive(Debug, Clone, Default)]
pub struct AbuseConfig {
    /// Rate limiter (None = disabled)
    pub rate_limiter: Option<RateLimiter>,
}

impl AbuseConfig {
    pub fn disabled() -> Self {
        Self { rate_limiter: None }
    }

    /// Load config from environment variables
    pub fn from_env() -> Self {
        let rate_limit_enabled = std::env::var("ABUSE_RATE_LIMIT")
            .map(|v| v != "0" && v.to_lowercase() != "false")
            .unwrap_or(true);

        let rate_limiter = if rate_limit_enabled {
            let max_requests = std::env::var("ABUSE_RATE_LIMIT_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            let window_secs = std::env::var("ABUSE_RATE_LIMIT_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10);

            Some(RateLimiter::new(
                max_requests,
                Duration::from_secs(window_secs),
            ))
        } else {
            None
        };

        tracing::info!(rate_limit_enabled, "Anti-abuse config loaded");

        Self { rate_limiter }
    }
}

/// Build a 429 Too Many Requests response
fn rate_limited(retry_after: Duration) -> Response<Body> {
    let mut response = Response::new(Body::from("Rate limit exceeded. Please slow down."));
    *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/plain"),
    );
    response.headers_mut().insert(
        header::RETRY_AFTER,
        header::HeaderValue::from(retry_after.as_secs().max(1)),
    );
    response
}

/// Key a request by its session cookie, or by client address when it has none.
///
/// Cookie-less requests create a session each, so they must not go unmetered.
fn rate_limit_key(request: &Request<Body>) -> String {
    if let Some(session_id) = session_id_from_headers(request.headers()) {
        return format!("session:{}", session_id);
    }
    match request.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => format!("ip:{}", addr.ip()),
        None => "anonymous".to_string(),
    }
}

/// Middleware limiting API requests per session or per client address
pub async fn api_rate_limit_middleware(
    State(config): State<Arc<AbuseConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    if let Some(ref rate_limiter) = config.rate_limiter {
        let key = rate_limit_key(&request);
        if !rate_limiter.check(&key).await {
            tracing::warn!(key, "Rate limited");
            return rate_limited(rate_limiter.window());
        }
    }

    next.run(request).await
}
