use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::edit::NewEdit;
use crate::db::DatabaseError;
use crate::models::*;

const COMPLAINT_COLUMNS: &str = "id, masked_text, category, urgency, category_confidence,
     urgency_confidence, action_plan, customer_reply_draft, sources, needs_human_review,
     review_id, rag_status, llm_status, status, created_at";

/// Raw column values, converted outside the rusqlite row closure so enum
/// and JSON failures surface as `DatabaseError`.
struct ComplaintRow {
    id: i64,
    masked_text: String,
    category: Option<String>,
    urgency: Option<String>,
    category_confidence: Option<f64>,
    urgency_confidence: Option<f64>,
    action_plan: String,
    customer_reply_draft: String,
    sources: String,
    needs_human_review: bool,
    review_id: Option<String>,
    rag_status: String,
    llm_status: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl ComplaintRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            masked_text: row.get(1)?,
            category: row.get(2)?,
            urgency: row.get(3)?,
            category_confidence: row.get(4)?,
            urgency_confidence: row.get(5)?,
            action_plan: row.get(6)?,
            customer_reply_draft: row.get(7)?,
            sources: row.get(8)?,
            needs_human_review: row.get::<_, i32>(9)? != 0,
            review_id: row.get(10)?,
            rag_status: row.get(11)?,
            llm_status: row.get(12)?,
            status: row.get(13)?,
            created_at: row.get(14)?,
        })
    }

    fn into_record(self) -> Result<ComplaintRecord, DatabaseError> {
        let action_plan: Vec<String> = serde_json::from_str(&self.action_plan).map_err(|e| {
            DatabaseError::ConstraintViolation(format!("Invalid action_plan JSON: {e}"))
        })?;
        let sources: Vec<SourceItem> = serde_json::from_str(&self.sources).map_err(|e| {
            DatabaseError::ConstraintViolation(format!("Invalid sources JSON: {e}"))
        })?;

        Ok(ComplaintRecord {
            id: self.id,
            masked_text: self.masked_text,
            category: self.category,
            urgency: self.urgency,
            category_confidence: self.category_confidence,
            urgency_confidence: self.urgency_confidence,
            action_plan,
            customer_reply_draft: self.customer_reply_draft,
            sources,
            needs_human_review: self.needs_human_review,
            review_id: self.review_id,
            rag_status: RagStatus::from_str(&self.rag_status)?,
            llm_status: LlmStatus::from_str(&self.llm_status)?,
            status: ComplaintStatus::from_str(&self.status)?,
            created_at: self.created_at,
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T, field: &str) -> Result<String, DatabaseError> {
    serde_json::to_string(value)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("Cannot encode {field}: {e}")))
}

/// Insert an analysed complaint and return it with its assigned id.
pub fn insert_complaint(
    conn: &Connection,
    complaint: &NewComplaint,
    created_at: DateTime<Utc>,
) -> Result<ComplaintRecord, DatabaseError> {
    let action_plan = to_json(&complaint.action_plan, "action_plan")?;
    let sources = to_json(&complaint.sources, "sources")?;

    conn.execute(
        "INSERT INTO complaints
         (masked_text, category, urgency, category_confidence, urgency_confidence,
          action_plan, customer_reply_draft, sources, needs_human_review, review_id,
          rag_status, llm_status, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            complaint.masked_text,
            complaint.category,
            complaint.urgency,
            complaint.category_confidence,
            complaint.urgency_confidence,
            action_plan,
            complaint.customer_reply_draft,
            sources,
            complaint.needs_human_review as i32,
            complaint.review_id,
            complaint.rag_status.as_str(),
            complaint.llm_status.as_str(),
            complaint.status.as_str(),
            created_at,
        ],
    )?;

    let id = conn.last_insert_rowid();
    Ok(ComplaintRecord::from_new(id, created_at, complaint.clone()))
}

pub fn get_complaint(conn: &Connection, id: i64) -> Result<Option<ComplaintRecord>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE id = ?1"),
            params![id],
            ComplaintRow::read,
        )
        .optional()?;
    row.map(ComplaintRow::into_record).transpose()
}

/// All complaints, newest first.
pub fn list_complaints(conn: &Connection) -> Result<Vec<ComplaintRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COMPLAINT_COLUMNS} FROM complaints ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt
        .query_map([], ComplaintRow::read)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(ComplaintRow::into_record).collect()
}

fn require_complaint(conn: &Connection, id: i64) -> Result<ComplaintRecord, DatabaseError> {
    get_complaint(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "complaint".into(),
        id: id.to_string(),
    })
}

/// Move a complaint to `RESOLVED` unless it already is.
///
/// The check and the write are one statement. Returns `None` when the
/// complaint was already resolved.
pub fn resolve_complaint(
    conn: &Connection,
    id: i64,
) -> Result<Option<ComplaintRecord>, DatabaseError> {
    let updated = conn.execute(
        "UPDATE complaints SET status = ?1 WHERE id = ?2 AND status != ?1",
        params![ComplaintStatus::Resolved.as_str(), id],
    )?;
    let record = require_complaint(conn, id)?;
    Ok((updated > 0).then_some(record))
}

/// Replace the reply draft and record the change in `complaint_edits`.
///
/// Both writes happen in one transaction.
pub fn update_reply_draft(
    conn: &Connection,
    id: i64,
    edit: &ReplyEdit,
    edited_at: DateTime<Utc>,
) -> Result<ComplaintRecord, DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    let current = require_complaint(&tx, id)?;

    super::edit::insert_edit(
        &tx,
        &NewEdit {
            complaint_id: id,
            field_name: REPLY_DRAFT_FIELD,
            old_value: Some(&current.customer_reply_draft),
            new_value: Some(&edit.new_value),
            edited_by: &edit.edited_by,
            edit_reason: edit.reason.as_deref(),
            edited_at,
        },
    )?;
    tx.execute(
        "UPDATE complaints SET customer_reply_draft = ?1 WHERE id = ?2",
        params![edit.new_value, id],
    )?;
    tx.commit()?;

    require_complaint(conn, id)
}

/// Field name recorded in the audit trail for reply-draft edits.
pub const REPLY_DRAFT_FIELD: &str = "customer_reply_draft";

/// A reviewer's replacement of the drafted customer reply.
#[derive(Debug, Clone)]
pub struct ReplyEdit {
    pub new_value: String,
    pub edited_by: String,
    pub reason: Option<String>,
}
