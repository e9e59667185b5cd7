use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::ComplaintEdit;

/// Audit entry about to be written.
#[derive(Debug, Clone)]
pub struct NewEdit<'a> {
    pub complaint_id: i64,
    pub field_name: &'a str,
    pub old_value: Option<&'a str>,
    pub new_value: Option<&'a str>,
    pub edited_by: &'a str,
    pub edit_reason: Option<&'a str>,
    pub edited_at: DateTime<Utc>,
}

pub fn insert_edit(conn: &Connection, edit: &NewEdit<'_>) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO complaint_edits
         (complaint_id, field_name, old_value, new_value, edited_by, edit_reason, edited_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            edit.complaint_id,
            edit.field_name,
            edit.old_value,
            edit.new_value,
            edit.edited_by,
            edit.edit_reason,
            edit.edited_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Edit history of one complaint, newest first.
pub fn list_edits(conn: &Connection, complaint_id: i64) -> Result<Vec<ComplaintEdit>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, complaint_id, field_name, old_value, new_value, edited_by, edit_reason, edited_at
         FROM complaint_edits
         WHERE complaint_id = ?1
         ORDER BY edited_at DESC, id DESC",
    )?;
    let edits = stmt
        .query_map(params![complaint_id], |row| {
            Ok(ComplaintEdit {
                id: row.get(0)?,
                complaint_id: row.get(1)?,
                field_name: row.get(2)?,
                old_value: row.get(3)?,
                new_value: row.get(4)?,
                edited_by: row.get(5)?,
                edit_reason: row.get(6)?,
                edited_at: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(edits)
}
