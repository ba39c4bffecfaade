//! API handlers, one module per resource

pub mod builds;
pub mod profile;
pub mod trophies;
pub mod users;

use kensei_core::storage::{get_connection, DbConnection, DbPool};

use crate::error::ApiError;

/// Достаёт соединение из пула, сворачивая ошибку пула в 500.
pub(crate) fn db_conn(pool: &DbPool) -> Result<DbConnection, ApiError> {
    get_connection(pool).map_err(|e| ApiError::Internal(format!("db pool: {}", e)))
}
