//! Reviewer workflow on finished analyses.
//!
//! Edits to the reply draft are audited in `complaint_edits`. Approve and
//! reject forward the decision to the AI service's review tracker when the
//! triage stage opened a review; that callback is best-effort.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::db::{ComplaintStore, DatabaseError, ReplyEdit};
use crate::models::{ComplaintEdit, ComplaintRecord, ComplaintStatus};
use crate::pipeline::stages::{ReviewDecision, ReviewNotifier};
use crate::pipeline::CallContext;

/// Editor recorded when the caller does not identify themselves.
pub const ANONYMOUS_EDITOR: &str = "anonymous";

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Complaint not found: {0}")]
    NotFound(i64),

    #[error("Complaint {id} is {status}; cannot {action}")]
    InvalidTransition {
        id: i64,
        status: ComplaintStatus,
        action: &'static str,
    },

    #[error("Reply draft cannot be empty")]
    EmptyReply,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

pub struct ReviewService {
    store: Arc<dyn ComplaintStore>,
    notifier: Arc<dyn ReviewNotifier>,
    timeout: Duration,
}

impl ReviewService {
    pub fn new(
        store: Arc<dyn ComplaintStore>,
        notifier: Arc<dyn ReviewNotifier>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            timeout,
        }
    }

    /// Replace the reply draft and record the change in the audit trail.
    pub fn edit_reply(
        &self,
        id: i64,
        new_draft: &str,
        editor: Option<&str>,
        reason: Option<&str>,
    ) -> Result<ComplaintRecord, ReviewError> {
        if new_draft.trim().is_empty() {
            return Err(ReviewError::EmptyReply);
        }
        self.require(id)?;

        let edited_by = editor
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(ANONYMOUS_EDITOR);
        let edit = ReplyEdit {
            new_value: new_draft.to_string(),
            edited_by: edited_by.to_string(),
            reason: reason.map(str::to_string),
        };
        let record = self.store.update_reply_draft(id, &edit)?;
        tracing::info!(complaint_id = id, edited_by, "Reply draft edited");
        Ok(record)
    }

    /// Audit entries for one complaint, newest first.
    pub fn edit_history(&self, id: i64) -> Result<Vec<ComplaintEdit>, ReviewError> {
        self.require(id)?;
        Ok(self.store.edit_history(id)?)
    }

    /// Mark the analysis as handled. MASKING_FAILED records may be approved
    /// once the manual review is done.
    ///
    /// Only the caller whose update resolves the complaint notifies the
    /// review tracker.
    pub fn approve(&self, id: i64, notes: Option<&str>) -> Result<ComplaintRecord, ReviewError> {
        self.require(id)?;
        let Some(record) = self.store.resolve(id)? else {
            return Err(ReviewError::InvalidTransition {
                id,
                status: ComplaintStatus::Resolved,
                action: ReviewDecision::Approve.as_str(),
            });
        };
        self.notify(ReviewDecision::Approve, &record, notes);
        tracing::info!(complaint_id = id, "Complaint approved");
        Ok(record)
    }

    /// Record a rejection. The complaint stays in its current status.
    pub fn reject(&self, id: i64, notes: Option<&str>) -> Result<ComplaintRecord, ReviewError> {
        let record = self.require_open(id, ReviewDecision::Reject)?;
        self.notify(ReviewDecision::Reject, &record, notes);
        tracing::info!(complaint_id = id, "Complaint rejected");
        Ok(record)
    }

    fn require(&self, id: i64) -> Result<ComplaintRecord, ReviewError> {
        self.store.get(id)?.ok_or(ReviewError::NotFound(id))
    }

    fn require_open(
        &self,
        id: i64,
        decision: ReviewDecision,
    ) -> Result<ComplaintRecord, ReviewError> {
        let record = self.require(id)?;
        if record.status == ComplaintStatus::Resolved {
            return Err(ReviewError::InvalidTransition {
                id,
                status: record.status,
                action: decision.as_str(),
            });
        }
        Ok(record)
    }

    fn notify(&self, decision: ReviewDecision, record: &ComplaintRecord, notes: Option<&str>) {
        let Some(review_id) = record.review_id.as_deref() else {
            tracing::debug!(complaint_id = record.id, "No review opened, skipping callback");
            return;
        };

        let ctx = CallContext::new(Uuid::new_v4(), self.timeout);
        if let Err(e) = self.notifier.notify(decision, review_id, notes, &ctx) {
            tracing::warn!(
                complaint_id = record.id,
                request_id = %ctx.request_id,
                decision = decision.as_str(),
                error = %e,
                "Review callback failed"
            );
        }
    }
}
