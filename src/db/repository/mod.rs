//! Repository layer: complaint-scoped database operations.
//!
//! Free functions take a `&Connection`; `SqliteComplaintStore` wraps them
//! behind the `ComplaintStore` trait used by the pipeline and the API.

mod complaint;
mod edit;

use std::sync::Mutex;

use chrono::Utc;
use rusqlite::Connection;

use super::DatabaseError;
use crate::models::{ComplaintEdit, ComplaintRecord, NewComplaint};

pub use complaint::*;
pub use edit::*;

/// Durable storage for complaint analyses.
///
/// Implementations serialize concurrent writers themselves; the pipeline
/// holds no lock of its own.
pub trait ComplaintStore: Send + Sync {
    /// Persist a new analysis; assigns `id` and `created_at`.
    fn insert(&self, complaint: &NewComplaint) -> Result<ComplaintRecord, DatabaseError>;

    fn get(&self, id: i64) -> Result<Option<ComplaintRecord>, DatabaseError>;

    fn list(&self) -> Result<Vec<ComplaintRecord>, DatabaseError>;

    /// Mark a complaint `RESOLVED`; `None` when it already was.
    fn resolve(&self, id: i64) -> Result<Option<ComplaintRecord>, DatabaseError>;

    fn update_reply_draft(&self, id: i64, edit: &ReplyEdit) -> Result<ComplaintRecord, DatabaseError>;

    fn edit_history(&self, id: i64) -> Result<Vec<ComplaintEdit>, DatabaseError>;
}

/// SQLite-backed store. One connection, guarded by a mutex.
pub struct SqliteComplaintStore {
    conn: Mutex<Connection>,
}

impl SqliteComplaintStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }
}

impl ComplaintStore for SqliteComplaintStore {
    fn insert(&self, complaint: &NewComplaint) -> Result<ComplaintRecord, DatabaseError> {
        self.with_conn(|conn| insert_complaint(conn, complaint, Utc::now()))
    }

    fn get(&self, id: i64) -> Result<Option<ComplaintRecord>, DatabaseError> {
        self.with_conn(|conn| get_complaint(conn, id))
    }

    fn list(&self) -> Result<Vec<ComplaintRecord>, DatabaseError> {
        self.with_conn(list_complaints)
    }

    fn resolve(&self, id: i64) -> Result<Option<ComplaintRecord>, DatabaseError> {
        self.with_conn(|conn| resolve_complaint(conn, id))
    }

    fn update_reply_draft(&self, id: i64, edit: &ReplyEdit) -> Result<ComplaintRecord, DatabaseError> {
        self.with_conn(|conn| update_reply_draft(conn, id, edit, Utc::now()))
    }

    fn edit_history(&self, id: i64) -> Result<Vec<ComplaintEdit>, DatabaseError> {
        self.with_conn(|conn| {
            if get_complaint(conn, id)?.is_none() {
                return Err(DatabaseError::NotFound {
                    entity_type: "complaint".into(),
                    id: id.to_string(),
                });
            }
            list_edits(conn, id)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{ComplaintStatus, LlmStatus, RagStatus};

    fn store() -> SqliteComplaintStore {
        SqliteComplaintStore::new(open_memory_database().unwrap())
    }

    fn fail_closed() -> NewComplaint {
        NewComplaint {
            masked_text: "[MASKING_ERROR]".into(),
            category: Some("MANUAL_REVIEW".into()),
            urgency: Some("HIGH".into()),
            category_confidence: None,
            urgency_confidence: None,
            action_plan: vec!["Manuel inceleme gerekli".into()],
            customer_reply_draft: "Şikayetiniz alındı.".into(),
            sources: vec![],
            needs_human_review: true,
            review_id: None,
            rag_status: RagStatus::Unavailable,
            llm_status: LlmStatus::TemplateFallback,
            status: ComplaintStatus::MaskingFailed,
        }
    }

    #[test]
    fn store_assigns_increasing_ids() {
        let store = store();
        let a = store.insert(&fail_closed()).unwrap();
        let b = store.insert(&fail_closed()).unwrap();
        assert!(b.id > a.id);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn edit_history_of_missing_complaint_is_not_found() {
        let store = store();
        assert!(matches!(
            store.edit_history(77),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn concurrent_inserts_are_serialized() {
        let store = Arc::new(store());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.insert(&fail_closed()).unwrap().id)
            })
            .collect();
        let mut ids: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }
}
