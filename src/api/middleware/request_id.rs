//! Correlation id middleware.

use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::api::types::RequestId;
use crate::pipeline::stages::http::REQUEST_ID_HEADER;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Attach a `RequestId` to the request and echo it on the response.
///
/// A caller-supplied id is kept only if it parses as a UUID.
pub async fn assign(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .unwrap_or_else(Uuid::new_v4);

    req.extensions_mut().insert(RequestId(id));
    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(REQUEST_ID, value);
    }
    response
}
