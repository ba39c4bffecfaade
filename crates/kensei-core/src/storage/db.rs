use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Result;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and ensures
/// the schema exists on the first connection.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    let conn = pool.get()?;
    if let Err(e) = init_schema(&conn) {
        log::warn!("Failed to initialize schema: {}", e);
    }

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Creates the tables used by the Mini App backend.
///
/// List-valued profile columns (`platforms`, `modes`, ...) are stored
/// as JSON-serialized arrays; a submission is keyed by the
/// (user, trophy) pair — one active record per pair.
fn init_schema(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY,
            real_name TEXT,
            psn_id TEXT,
            platforms TEXT,
            modes TEXT,
            goals TEXT,
            difficulties TEXT,
            trophies TEXT,
            updated_at INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_users_user_id ON users(user_id);

        CREATE TABLE IF NOT EXISTS submissions (
            user_id INTEGER NOT NULL,
            trophy_id TEXT NOT NULL,
            comment TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            photo_count INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER,
            updated_at INTEGER,
            PRIMARY KEY (user_id, trophy_id)
        );

        CREATE TABLE IF NOT EXISTS builds (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            class_name TEXT,
            tags TEXT,
            description TEXT,
            photo_count INTEGER NOT NULL DEFAULT 0,
            is_public INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_builds_user ON builds(user_id);",
    )
}

/// Current unix timestamp for `created_at` / `updated_at` columns.
pub(crate) fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
