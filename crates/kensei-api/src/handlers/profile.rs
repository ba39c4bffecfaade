//! Профиль текущего пользователя: /api/profile.get, /api/profile.save

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use kensei_core::core::validation;
use kensei_core::storage::profiles;

use super::db_conn;
use crate::auth::authorize;
use crate::error::ApiError;
use crate::state::ApiState;

/// Сериализация профиля в ответ API. Поле `psn_id` — по новой схеме;
/// `real_name` сохранён из старой ревизии таблицы.
pub(crate) fn profile_json(profile: &profiles::Profile) -> Value {
    json!({
        "user_id": profile.user_id,
        "real_name": profile.real_name,
        "psn_id": profile.psn_id,
        "platforms": profile.platforms,
        "modes": profile.modes,
        "goals": profile.goals,
        "difficulties": profile.difficulties,
        "trophies": profile.trophies,
    })
}

/// GET /api/profile.get — профиль текущего пользователя или 404.
pub async fn get_profile(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let user_id = authorize(&headers, &state.bot_token)?;

    let conn = db_conn(&state.db)?;
    let profile = profiles::get_profile(&conn, user_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(profile_json(&profile)))
}

#[derive(Default)]
struct ProfileForm {
    real_name: String,
    psn_id: String,
    platforms: Vec<String>,
    modes: Vec<String>,
    goals: Vec<String>,
    difficulties: Vec<String>,
}

async fn read_profile_form(mut multipart: Multipart) -> Result<ProfileForm, ApiError> {
    let mut form = ProfileForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await?;

        match name.as_str() {
            "real_name" => form.real_name = value,
            // "psn" — имя поля из первой ревизии формы
            "psn_id" | "psn" => form.psn_id = value,
            "platforms" => form.platforms.push(value),
            "modes" => form.modes.push(value),
            "goals" => form.goals.push(value),
            "difficulties" => form.difficulties.push(value),
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/profile.save — сохраняет/обновляет профиль.
///
/// Заработанные трофеи при этом не трогаются: их пополняет только
/// одобрение заявки.
pub async fn save_profile(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let user_id = authorize(&headers, &state.bot_token)?;
    let form = read_profile_form(multipart).await?;

    let real_name = form.real_name.trim();
    if real_name.is_empty() {
        return Err(ApiError::BadRequest(
            "Поле 'real_name' обязательно для заполнения".to_string(),
        ));
    }

    let psn_id = form.psn_id.trim();
    if !validation::is_valid_psn_id(psn_id) {
        return Err(ApiError::BadRequest(
            "Неверный формат PSN никнейма (3-16 символов: A-Z, a-z, 0-9, -, _)".to_string(),
        ));
    }

    let conn = db_conn(&state.db)?;
    profiles::upsert_profile(
        &conn,
        user_id,
        &profiles::NewProfile {
            real_name,
            psn_id,
            platforms: &form.platforms,
            modes: &form.modes,
            goals: &form.goals,
            difficulties: &form.difficulties,
        },
    )
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    log::info!("Profile saved for user {}", user_id);
    Ok(Json(json!({"status": "ok", "message": "Профиль успешно сохранен"})))
}
