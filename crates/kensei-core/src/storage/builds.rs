//! Build storage
//!
//! User-authored shareable configuration records. Ownership checks are
//! baked into the owner-scoped queries: an UPDATE/DELETE with a wrong
//! owner touches zero rows and the caller reports "not found" without
//! distinguishing existence from ownership.

use rusqlite::Result;
use serde::Serialize;

use super::db::{now_unix, DbConnection};

/// Билд — именованная сборка с классом, тегами и скриншотами.
#[derive(Debug, Clone, Serialize)]
pub struct Build {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub class_name: String,
    pub tags: Vec<String>,
    pub description: String,
    pub photo_count: i64,
    pub is_public: bool,
    pub created_at: i64,
}

/// Parameters for creating a build.
#[derive(Debug)]
pub struct NewBuild<'a> {
    pub user_id: i64,
    pub name: &'a str,
    pub class_name: &'a str,
    pub tags: &'a [String],
    pub description: &'a str,
    pub photo_count: usize,
}

const BUILD_COLUMNS: &str =
    "id, user_id, name, class_name, tags, description, photo_count, is_public, created_at";

fn row_to_build(row: &rusqlite::Row<'_>) -> rusqlite::Result<Build> {
    let tags_raw: Option<String> = row.get(4)?;
    Ok(Build {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        class_name: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        tags: tags_raw.and_then(|s| serde_json::from_str(&s).ok()).unwrap_or_default(),
        description: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        photo_count: row.get(6)?,
        is_public: row.get::<_, i64>(7)? != 0,
        created_at: row.get::<_, Option<i64>>(8)?.unwrap_or(0),
    })
}

/// Inserts a new build and returns its id.
pub fn insert_build(conn: &DbConnection, build: &NewBuild) -> Result<i64> {
    conn.execute(
        "INSERT INTO builds (user_id, name, class_name, tags, description, photo_count, is_public, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
        rusqlite::params![
            build.user_id,
            build.name,
            build.class_name,
            serde_json::to_string(build.tags).unwrap_or_else(|_| "[]".to_string()),
            build.description,
            build.photo_count as i64,
            now_unix(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Gets a build by id regardless of owner (the deletion path needs the
/// owner id to cascade stored images).
pub fn get_build(conn: &DbConnection, build_id: i64) -> Result<Option<Build>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM builds WHERE id = ?", BUILD_COLUMNS))?;
    let mut rows = stmt.query(rusqlite::params![build_id])?;

    match rows.next()? {
        Some(row) => Ok(Some(row_to_build(row)?)),
        None => Ok(None),
    }
}

/// Lists all builds of one owner, newest first.
pub fn list_builds_by_owner(conn: &DbConnection, user_id: i64) -> Result<Vec<Build>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM builds WHERE user_id = ? ORDER BY created_at DESC",
        BUILD_COLUMNS
    ))?;
    let builds = stmt
        .query_map(rusqlite::params![user_id], row_to_build)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(builds)
}

/// Lists public builds across all users, newest first.
pub fn list_public_builds(conn: &DbConnection) -> Result<Vec<Build>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM builds WHERE is_public = 1 ORDER BY created_at DESC",
        BUILD_COLUMNS
    ))?;
    let builds = stmt
        .query_map([], row_to_build)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(builds)
}

/// Lists one user's public builds (participant detail view).
pub fn list_public_builds_by_owner(conn: &DbConnection, user_id: i64) -> Result<Vec<Build>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM builds WHERE user_id = ? AND is_public = 1 ORDER BY created_at DESC",
        BUILD_COLUMNS
    ))?;
    let builds = stmt
        .query_map(rusqlite::params![user_id], row_to_build)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(builds)
}

/// Sets the visibility flag, owner-scoped. `Ok(false)` when the build
/// does not exist or belongs to someone else.
pub fn set_public(conn: &DbConnection, user_id: i64, build_id: i64, is_public: bool) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE builds SET is_public = ? WHERE id = ? AND user_id = ?",
        rusqlite::params![is_public as i64, build_id, user_id],
    )?;
    Ok(rows > 0)
}

/// Deletes a build row, owner-scoped. The caller cascades stored
/// images via the photo store.
pub fn delete_build(conn: &DbConnection, user_id: i64, build_id: i64) -> Result<bool> {
    let rows = conn.execute(
        "DELETE FROM builds WHERE id = ? AND user_id = ?",
        rusqlite::params![build_id, user_id],
    )?;
    Ok(rows > 0)
}
