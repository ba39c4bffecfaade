//! Роутер API и CORS

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::response::Json;
use axum::routing::{delete, get, post};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use kensei_core::core::config;
use kensei_core::storage::profiles;

use crate::auth::INIT_DATA_HEADER;
use crate::error::ApiError;
use crate::handlers::{builds, db_conn, profile, trophies, users};
use crate::state::ApiState;

/// Создаёт роутер Mini App API.
pub fn create_router(state: Arc<ApiState>) -> Router {
    // Скриншоты билдов отдаются статикой: /uploads/builds/<uid>/<id>/<file>
    let builds_dir = state.build_photos.root().to_path_buf();

    Router::new()
        .route("/health", get(health))
        .route("/api/stats", get(stats))
        .route("/api/profile.get", get(profile::get_profile))
        .route("/api/profile.save", post(profile::save_profile))
        .route("/api/users.list", get(users::list_users))
        .route("/api/users.getProfile", get(users::get_user_profile))
        .route("/api/builds.create", post(builds::create_build))
        .route("/api/builds.getMy", get(builds::get_my_builds))
        .route("/api/builds.getPublic", get(builds::get_public_builds))
        .route("/api/builds.getUserBuilds", get(builds::get_user_builds))
        .route("/api/builds.togglePublish", post(builds::toggle_publish))
        .route("/api/builds.delete", delete(builds::delete_build))
        .route("/api/trophies.submit", post(trophies::submit_trophy))
        .route("/api/trophies.approve", post(trophies::approve_trophy))
        .route("/api/trophies.reject", post(trophies::reject_trophy))
        .nest_service("/uploads/builds", ServeDir::new(builds_dir))
        .layer(DefaultBodyLimit::max(config::limits::MAX_UPLOAD_BODY_BYTES))
        .layer(cors_layer())
        .with_state(state)
}

/// CORS: с настроенным origin — строгий режим с credentials, без
/// него — разрешаем всё (локальная разработка).
fn cors_layer() -> CorsLayer {
    let configured = config::ALLOWED_ORIGIN
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok());

    match configured {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(INIT_DATA_HEADER)])
            .allow_credentials(true),
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    }
}

/// GET /health — проверка живости.
async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "service": "kensei-api"}))
}

/// GET /api/stats — количество пользователей и версия API.
async fn stats(State(state): State<Arc<ApiState>>) -> Result<Json<Value>, ApiError> {
    let conn = db_conn(&state.db)?;
    let total = profiles::user_count(&conn).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "total_users": total,
        "api_version": env!("CARGO_PKG_VERSION"),
    })))
}
