//! Trophy submission storage
//!
//! A submission is keyed by the (user, trophy) pair — at most one
//! record per pair. A fresh submit overwrites a terminal record back
//! to `pending`; resolved records keep their terminal status while the
//! photo artifacts are purged by the workflow.

use rusqlite::Result;

use super::db::{now_unix, DbConnection};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

/// Заявка на трофей.
#[derive(Debug, Clone)]
pub struct Submission {
    pub user_id: i64,
    pub trophy_id: String,
    pub comment: String,
    pub status: String,
    pub photo_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

fn row_to_submission(row: &rusqlite::Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        user_id: row.get(0)?,
        trophy_id: row.get(1)?,
        comment: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        status: row.get(3)?,
        photo_count: row.get(4)?,
        created_at: row.get::<_, Option<i64>>(5)?.unwrap_or(0),
        updated_at: row.get::<_, Option<i64>>(6)?.unwrap_or(0),
    })
}

/// Creates a pending submission, overwriting any prior record for the
/// same (user, trophy) pair.
pub fn upsert_pending(
    conn: &DbConnection,
    user_id: i64,
    trophy_id: &str,
    comment: &str,
    photo_count: usize,
) -> Result<()> {
    let now = now_unix();
    conn.execute(
        "INSERT OR REPLACE INTO submissions
            (user_id, trophy_id, comment, status, photo_count, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        rusqlite::params![user_id, trophy_id, comment, STATUS_PENDING, photo_count as i64, now],
    )?;
    Ok(())
}

/// Gets the submission for a (user, trophy) pair, if any.
pub fn get_submission(conn: &DbConnection, user_id: i64, trophy_id: &str) -> Result<Option<Submission>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, trophy_id, comment, status, photo_count, created_at, updated_at
         FROM submissions WHERE user_id = ? AND trophy_id = ?",
    )?;
    let mut rows = stmt.query(rusqlite::params![user_id, trophy_id])?;

    match rows.next()? {
        Some(row) => Ok(Some(row_to_submission(row)?)),
        None => Ok(None),
    }
}

/// Moves a submission to a terminal status.
///
/// Returns `Ok(false)` when no record exists for the pair. Concurrent
/// approve+reject on the same pair is last-writer-wins by design — the
/// storage layer serializes the writes, the core adds no locking.
pub fn set_status(conn: &DbConnection, user_id: i64, trophy_id: &str, status: &str) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE submissions SET status = ?, photo_count = 0, updated_at = ?
         WHERE user_id = ? AND trophy_id = ?",
        rusqlite::params![status, now_unix(), user_id, trophy_id],
    )?;
    Ok(rows > 0)
}

/// Deletes a submission record entirely (compensation path for a
/// half-created submit).
pub fn delete_submission(conn: &DbConnection, user_id: i64, trophy_id: &str) -> Result<bool> {
    let rows = conn.execute(
        "DELETE FROM submissions WHERE user_id = ? AND trophy_id = ?",
        rusqlite::params![user_id, trophy_id],
    )?;
    Ok(rows > 0)
}
