//! Shared state and request/response bodies for the API layer.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::db::ComplaintStore;
use crate::pipeline::{ComplaintPipeline, RawComplaintText};
use crate::review::ReviewService;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub pipeline: Arc<ComplaintPipeline>,
    pub review: Arc<ReviewService>,
    pub store: Arc<dyn ComplaintStore>,
    pub max_complaint_chars: usize,
}

/// Correlation id of one HTTP request, injected by middleware.
///
/// `POST /api/analyze` reuses it as the pipeline correlation id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

/// Body of `POST /api/analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: RawComplaintText,
}

/// Body of `PATCH /api/complaints/:id/edit`.
#[derive(Debug, Deserialize)]
pub struct EditReplyRequest {
    pub customer_reply_draft: String,
    #[serde(default)]
    pub edit_reason: Option<String>,
}

/// Optional body of approve/reject.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewActionRequest {
    #[serde(default)]
    pub notes: Option<String>,
}
