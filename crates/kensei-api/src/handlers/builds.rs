//! Билды: создание, витрина, публикация, удаление

use axum::extract::{Multipart, Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use kensei_core::core::{config, validation};
use kensei_core::storage::photos::PhotoStore;
use kensei_core::storage::builds::{self, Build};

use super::db_conn;
use crate::auth::authorize;
use crate::error::ApiError;
use crate::state::ApiState;

/// Сериализация билда вместе с URL скриншотов. Файлы отдаются
/// статикой из `/uploads/builds/...`.
async fn build_json(store: &PhotoStore, build: &Build) -> Value {
    let photos: Vec<String> = store
        .get_all(build.user_id, &build.id.to_string())
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
        .map(|name| format!("/uploads/builds/{}/{}/{}", build.user_id, build.id, name))
        .collect();

    json!({
        "id": build.id,
        "user_id": build.user_id,
        "name": build.name,
        "class_name": build.class_name,
        "tags": build.tags,
        "description": build.description,
        "is_public": build.is_public,
        "created_at": build.created_at,
        "photos": photos,
    })
}

async fn builds_response(store: &PhotoStore, list: Vec<Build>) -> Value {
    let mut out = Vec::with_capacity(list.len());
    for build in &list {
        out.push(build_json(store, build).await);
    }
    json!({ "builds": out })
}

struct BuildForm {
    name: String,
    class_name: String,
    tags: Vec<String>,
    description: String,
    photos: Vec<(String, Vec<u8>)>, // (content_type, bytes)
}

async fn read_build_form(mut multipart: Multipart) -> Result<BuildForm, ApiError> {
    let mut name = String::new();
    let mut class_name = String::new();
    let mut tags = Vec::new();
    let mut description = String::new();
    let mut photos = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => name = field.text().await?,
            "class_name" => class_name = field.text().await?,
            // Клиент шлёт теги одной JSON-строкой
            "tags" => {
                let raw = field.text().await?;
                tags = serde_json::from_str(&raw).unwrap_or_default();
            }
            "description" => description = field.text().await?,
            "photo_1" | "photo_2" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await?.to_vec();
                photos.push((content_type, bytes));
            }
            _ => {}
        }
    }

    Ok(BuildForm {
        name,
        class_name,
        tags,
        description,
        photos,
    })
}

/// POST /api/builds.create — создаёт билд с 1-2 скриншотами.
pub async fn create_build(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let user_id = authorize(&headers, &state.bot_token)?;
    let form = read_build_form(multipart).await?;

    if form.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Укажите название билда".to_string()));
    }
    let content_types: Vec<String> = form.photos.iter().map(|(ct, _)| ct.clone()).collect();
    validation::validate_photo_set(&content_types, config::limits::MAX_BUILD_PHOTOS)
        .map_err(ApiError::from)?;

    let build_id = {
        let conn = db_conn(&state.db)?;
        builds::insert_build(
            &conn,
            &builds::NewBuild {
                user_id,
                name: form.name.trim(),
                class_name: form.class_name.trim(),
                tags: &form.tags,
                description: &form.description,
                photo_count: form.photos.len(),
            },
        )
        .map_err(|e| ApiError::Internal(e.to_string()))?
    };

    let key = build_id.to_string();
    for (index, (content_type, bytes)) in form.photos.iter().enumerate() {
        if let Err(e) = state.build_photos.put(user_id, &key, index, content_type, bytes).await {
            // Полусозданный билд не оставляем: подчищаем строку и
            // частичные файлы перед возвратом ошибки.
            if let Err(del) = state.build_photos.delete_all(user_id, &key).await {
                log::error!("Compensation: failed to remove build photos: {}", del);
            }
            if let Ok(conn) = db_conn(&state.db) {
                let _ = builds::delete_build(&conn, user_id, build_id);
            }
            return Err(ApiError::Internal(format!("photo write: {}", e)));
        }
    }

    log::info!("Build {} created by user {}", build_id, user_id);
    Ok(Json(json!({"status": "ok", "build_id": build_id})))
}

/// GET /api/builds.getMy — все свои билды.
pub async fn get_my_builds(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let user_id = authorize(&headers, &state.bot_token)?;

    let list = {
        let conn = db_conn(&state.db)?;
        builds::list_builds_by_owner(&conn, user_id).map_err(|e| ApiError::Internal(e.to_string()))?
    };
    Ok(Json(builds_response(&state.build_photos, list).await))
}

/// GET /api/builds.getPublic — публичная витрина, без авторизации.
pub async fn get_public_builds(State(state): State<Arc<ApiState>>) -> Result<Json<Value>, ApiError> {
    let list = {
        let conn = db_conn(&state.db)?;
        builds::list_public_builds(&conn).map_err(|e| ApiError::Internal(e.to_string()))?
    };
    Ok(Json(builds_response(&state.build_photos, list).await))
}

#[derive(Debug, Deserialize)]
pub struct TargetUser {
    pub target_user_id: i64,
}

/// GET /api/builds.getUserBuilds?target_user_id= — чужие публичные
/// билды.
pub async fn get_user_builds(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Query(query): Query<TargetUser>,
) -> Result<Json<Value>, ApiError> {
    authorize(&headers, &state.bot_token)?;

    let list = {
        let conn = db_conn(&state.db)?;
        builds::list_public_builds_by_owner(&conn, query.target_user_id)
            .map_err(|e| ApiError::Internal(e.to_string()))?
    };
    Ok(Json(builds_response(&state.build_photos, list).await))
}

/// POST /api/builds.togglePublish — смена видимости, только владелец.
pub async fn toggle_publish(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let user_id = authorize(&headers, &state.bot_token)?;

    let mut build_id: Option<i64> = None;
    let mut is_public = false;
    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        let value = field.text().await?;
        match field_name.as_str() {
            "build_id" => build_id = value.trim().parse().ok(),
            "is_public" => is_public = matches!(value.trim(), "1" | "true"),
            _ => {}
        }
    }

    let build_id =
        build_id.ok_or_else(|| ApiError::BadRequest("Некорректный build_id".to_string()))?;

    let updated = {
        let conn = db_conn(&state.db)?;
        builds::set_public(&conn, user_id, build_id, is_public)
            .map_err(|e| ApiError::Internal(e.to_string()))?
    };
    if !updated {
        // Чужой или несуществующий — снаружи неразличимо
        return Err(ApiError::NotFound);
    }

    Ok(Json(json!({"status": "ok", "is_public": is_public})))
}

#[derive(Debug, Deserialize)]
pub struct DeleteBuild {
    pub build_id: i64,
}

/// DELETE /api/builds.delete?build_id= — удаление с каскадом файлов.
pub async fn delete_build(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Query(query): Query<DeleteBuild>,
) -> Result<Json<Value>, ApiError> {
    let user_id = authorize(&headers, &state.bot_token)?;

    let deleted = {
        let conn = db_conn(&state.db)?;
        builds::delete_build(&conn, user_id, query.build_id)
            .map_err(|e| ApiError::Internal(e.to_string()))?
    };
    if !deleted {
        return Err(ApiError::NotFound);
    }

    if let Err(e) = state.build_photos.delete_all(user_id, &query.build_id.to_string()).await {
        log::error!("Failed to remove photos of build {}: {}", query.build_id, e);
    }

    log::info!("Build {} deleted by user {}", query.build_id, user_id);
    Ok(Json(json!({"status": "ok"})))
}
