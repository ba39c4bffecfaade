//! Участники сообщества: /api/users.list, /api/users.getProfile

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use kensei_core::storage::profiles;

use super::db_conn;
use super::profile::profile_json;
use crate::auth::authorize;
use crate::error::ApiError;
use crate::state::ApiState;

/// GET /api/users.list — краткий список участников для экрана поиска.
pub async fn list_users(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(&headers, &state.bot_token)?;

    let conn = db_conn(&state.db)?;
    let users: Vec<Value> = profiles::list_profiles(&conn)
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .iter()
        .map(|p| {
            json!({
                "user_id": p.user_id,
                "psn_id": p.psn_id,
                "trophies_count": p.trophies.len(),
            })
        })
        .collect();

    Ok(Json(json!({ "users": users })))
}

#[derive(Debug, Deserialize)]
pub struct TargetUser {
    pub target_user_id: i64,
}

/// GET /api/users.getProfile?target_user_id= — публичная карточка
/// участника.
pub async fn get_user_profile(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Query(query): Query<TargetUser>,
) -> Result<Json<Value>, ApiError> {
    authorize(&headers, &state.bot_token)?;

    let conn = db_conn(&state.db)?;
    let profile = profiles::get_profile(&conn, query.target_user_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(profile_json(&profile)))
}
