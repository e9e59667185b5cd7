//! Complaint analysis and review endpoints.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{
    AnalyzeRequest, ApiContext, EditReplyRequest, RequestId, ReviewActionRequest,
};
use crate::models::{ComplaintEdit, ComplaintRecord};

/// Header naming the reviewer who edits a draft.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// `POST /api/analyze`: run the pipeline on one complaint.
///
/// Rejected input never reaches the pipeline and leaves no record. The
/// pipeline mints its own correlation id per run; the HTTP request id is
/// attached to the run's logs as `http_request_id`.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    request_id: Option<Extension<RequestId>>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ComplaintRecord>, ApiError> {
    let Json(AnalyzeRequest { text }) = body.map_err(|rejection| {
        ApiError::BadRequest(format!(
            "Body must be JSON with a \"text\" string ({})",
            rejection.status()
        ))
    })?;

    if text.is_blank() {
        return Err(ApiError::BadRequest("Complaint text is required".into()));
    }
    if text.char_count() > ctx.max_complaint_chars {
        return Err(ApiError::BadRequest(format!(
            "Complaint text exceeds {} characters",
            ctx.max_complaint_chars
        )));
    }

    let http_request_id = request_id.map(|Extension(RequestId(id))| id);
    let pipeline = Arc::clone(&ctx.pipeline);
    let record = tokio::task::spawn_blocking(move || {
        let _span = tracing::info_span!(
            "http_analyze",
            http_request_id = http_request_id.map(tracing::field::display)
        )
        .entered();
        pipeline.analyze(text)
    })
    .await??;

    Ok(Json(record))
}

/// `GET /api/complaints`: newest first.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<ComplaintRecord>>, ApiError> {
    Ok(Json(ctx.store.list()?))
}

/// `GET /api/complaints/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<ComplaintRecord>, ApiError> {
    ctx.store
        .get(id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("complaint {id} not found")))
}

/// `PATCH /api/complaints/:id/edit`: replace the reply draft.
pub async fn edit_reply(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Result<Json<EditReplyRequest>, JsonRejection>,
) -> Result<Json<ComplaintRecord>, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        ApiError::BadRequest(format!(
            "Body must be JSON with a \"customer_reply_draft\" string ({})",
            rejection.status()
        ))
    })?;
    let editor = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok());

    let record = ctx.review.edit_reply(
        id,
        &request.customer_reply_draft,
        editor,
        request.edit_reason.as_deref(),
    )?;
    Ok(Json(record))
}

/// `GET /api/complaints/:id/edit-history`
pub async fn edit_history(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ComplaintEdit>>, ApiError> {
    Ok(Json(ctx.review.edit_history(id)?))
}

/// `POST /api/complaints/:id/approve`: body `{notes}` is optional.
pub async fn approve(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<ComplaintRecord>, ApiError> {
    let notes = parse_notes(&body)?;
    let review = Arc::clone(&ctx.review);
    let record =
        tokio::task::spawn_blocking(move || review.approve(id, notes.as_deref())).await??;
    Ok(Json(record))
}

/// `POST /api/complaints/:id/reject`: body `{notes}` is optional.
pub async fn reject(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<ComplaintRecord>, ApiError> {
    let notes = parse_notes(&body)?;
    let review = Arc::clone(&ctx.review);
    let record =
        tokio::task::spawn_blocking(move || review.reject(id, notes.as_deref())).await??;
    Ok(Json(record))
}

fn parse_notes(body: &[u8]) -> Result<Option<String>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<ReviewActionRequest>(body)
        .map(|r| r.notes)
        .map_err(|_| ApiError::BadRequest("Body must be JSON with an optional \"notes\" string".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_has_no_notes() {
        assert_eq!(parse_notes(b"").unwrap(), None);
        assert_eq!(parse_notes(b" \n").unwrap(), None);
        assert_eq!(parse_notes(b"{}").unwrap(), None);
    }

    #[test]
    fn notes_are_read() {
        assert_eq!(
            parse_notes(br#"{"notes":"kontrol edildi"}"#).unwrap().as_deref(),
            Some("kontrol edildi")
        );
    }

    #[test]
    fn malformed_body_is_bad_request() {
        assert!(matches!(parse_notes(b"notes"), Err(ApiError::BadRequest(_))));
    }
}
