use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{ComplaintStatus, LlmStatus, RagStatus};

/// A citation backing the drafted reply, kept for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceItem {
    pub doc_name: String,
    pub source: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<String>,
}

/// An analysed complaint that has not been persisted yet.
///
/// Built only by the pipeline. `masked_text` is either the masking
/// collaborator's output or the fixed fail-closed sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewComplaint {
    pub masked_text: String,
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub category_confidence: Option<f64>,
    pub urgency_confidence: Option<f64>,
    pub action_plan: Vec<String>,
    pub customer_reply_draft: String,
    pub sources: Vec<SourceItem>,
    pub needs_human_review: bool,
    pub review_id: Option<String>,
    pub rag_status: RagStatus,
    pub llm_status: LlmStatus,
    pub status: ComplaintStatus,
}

/// A persisted complaint analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub id: i64,
    pub masked_text: String,
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub category_confidence: Option<f64>,
    pub urgency_confidence: Option<f64>,
    pub action_plan: Vec<String>,
    pub customer_reply_draft: String,
    pub sources: Vec<SourceItem>,
    pub needs_human_review: bool,
    pub review_id: Option<String>,
    pub rag_status: RagStatus,
    pub llm_status: LlmStatus,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}

impl ComplaintRecord {
    /// Attach the identity assigned by the store.
    pub fn from_new(id: i64, created_at: DateTime<Utc>, new: NewComplaint) -> Self {
        Self {
            id,
            masked_text: new.masked_text,
            category: new.category,
            urgency: new.urgency,
            category_confidence: new.category_confidence,
            urgency_confidence: new.urgency_confidence,
            action_plan: new.action_plan,
            customer_reply_draft: new.customer_reply_draft,
            sources: new.sources,
            needs_human_review: new.needs_human_review,
            review_id: new.review_id,
            rag_status: new.rag_status,
            llm_status: new.llm_status,
            status: new.status,
            created_at,
        }
    }
}

/// One entry of the reviewer edit audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintEdit {
    pub id: i64,
    pub complaint_id: i64,
    pub field_name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub edited_by: String,
    pub edit_reason: Option<String>,
    pub edited_at: DateTime<Utc>,
}
