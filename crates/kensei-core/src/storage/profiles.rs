//! User profile storage
//!
//! One row per Telegram user. Tag lists are stored as JSON arrays;
//! `trophies` is an accumulated set that profile saves never touch —
//! only the approval path appends to it.

use rusqlite::Result;
use serde::Serialize;

use super::db::{now_unix, DbConnection};

/// Профиль пользователя Mini App.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user_id: i64,
    pub real_name: String,
    pub psn_id: String,
    pub platforms: Vec<String>,
    pub modes: Vec<String>,
    pub goals: Vec<String>,
    pub difficulties: Vec<String>,
    pub trophies: Vec<String>,
    pub updated_at: i64,
}

/// Parameters for saving a profile (everything except the accumulated
/// trophy set).
#[derive(Debug)]
pub struct NewProfile<'a> {
    pub real_name: &'a str,
    pub psn_id: &'a str,
    pub platforms: &'a [String],
    pub modes: &'a [String],
    pub goals: &'a [String],
    pub difficulties: &'a [String],
}

fn to_json(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

fn from_json(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(&s).ok()).unwrap_or_default()
}

fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        user_id: row.get(0)?,
        real_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        psn_id: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        platforms: from_json(row.get(3)?),
        modes: from_json(row.get(4)?),
        goals: from_json(row.get(5)?),
        difficulties: from_json(row.get(6)?),
        trophies: from_json(row.get(7)?),
        updated_at: row.get::<_, Option<i64>>(8)?.unwrap_or(0),
    })
}

const PROFILE_COLUMNS: &str =
    "user_id, real_name, psn_id, platforms, modes, goals, difficulties, trophies, updated_at";

/// Gets a profile by user id, `None` when the user never saved one.
pub fn get_profile(conn: &DbConnection, user_id: i64) -> Result<Option<Profile>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {} FROM users WHERE user_id = ?", PROFILE_COLUMNS))?;
    let mut rows = stmt.query(rusqlite::params![user_id])?;

    match rows.next()? {
        Some(row) => Ok(Some(row_to_profile(row)?)),
        None => Ok(None),
    }
}

/// Saves or fully replaces a profile's editable fields.
///
/// Upsert, not merge — every save overwrites all tag lists — but the
/// accumulated `trophies` column is left alone so a re-save cannot
/// wipe earned trophies.
pub fn upsert_profile(conn: &DbConnection, user_id: i64, profile: &NewProfile) -> Result<()> {
    conn.execute(
        "INSERT INTO users (user_id, real_name, psn_id, platforms, modes, goals, difficulties, trophies, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, '[]', ?8)
         ON CONFLICT(user_id) DO UPDATE SET
            real_name = excluded.real_name,
            psn_id = excluded.psn_id,
            platforms = excluded.platforms,
            modes = excluded.modes,
            goals = excluded.goals,
            difficulties = excluded.difficulties,
            updated_at = excluded.updated_at",
        rusqlite::params![
            user_id,
            profile.real_name,
            profile.psn_id,
            to_json(profile.platforms),
            to_json(profile.modes),
            to_json(profile.goals),
            to_json(profile.difficulties),
            now_unix(),
        ],
    )?;
    Ok(())
}

/// Appends a trophy to the profile's trophy set.
///
/// Set semantics: returns `Ok(false)` without writing when the trophy
/// is already present. Returns `Ok(true)` when it was added.
/// The caller is responsible for checking the profile exists first.
pub fn add_trophy(conn: &DbConnection, user_id: i64, trophy_id: &str) -> Result<bool> {
    let raw: Option<String> = conn.query_row(
        "SELECT trophies FROM users WHERE user_id = ?",
        rusqlite::params![user_id],
        |row| row.get(0),
    )?;

    let mut trophies = from_json(raw);
    if trophies.iter().any(|t| t == trophy_id) {
        return Ok(false);
    }
    trophies.push(trophy_id.to_string());

    conn.execute(
        "UPDATE users SET trophies = ?, updated_at = ? WHERE user_id = ?",
        rusqlite::params![to_json(&trophies), now_unix(), user_id],
    )?;
    Ok(true)
}

/// Lists all profiles for the participants screen (ordered by PSN).
pub fn list_profiles(conn: &DbConnection) -> Result<Vec<Profile>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users ORDER BY psn_id COLLATE NOCASE",
        PROFILE_COLUMNS
    ))?;
    let profiles = stmt
        .query_map([], row_to_profile)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(profiles)
}

/// Total number of saved profiles.
pub fn user_count(conn: &DbConnection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
}
