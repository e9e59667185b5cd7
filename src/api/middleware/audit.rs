//! Audit logging middleware.
//!
//! Logs every API request with request id, method, path, status and
//! latency. Runs innermost (after the request id has been assigned).
//! Bodies are never logged.

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::RequestId;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.to_string())
        .unwrap_or_default();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    if response.status().is_server_error() {
        tracing::warn!(%request_id, %method, %path, status, latency_ms, "API access");
    } else {
        tracing::info!(%request_id, %method, %path, status, latency_ms, "API access");
    }

    response
}
