//! Заявки на трофеи: подача и модерация

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::Form;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use kensei_core::workflow::SubmissionPhoto;

use crate::auth::authorize;
use crate::error::ApiError;
use crate::state::ApiState;

struct SubmitForm {
    trophy_id: String,
    comment: String,
    photos: Vec<SubmissionPhoto>,
}

async fn read_submit_form(mut multipart: Multipart) -> Result<SubmitForm, ApiError> {
    let mut trophy_id = String::new();
    let mut comment = String::new();
    let mut photos = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "trophy_id" => trophy_id = field.text().await?,
            "comment" => comment = field.text().await?,
            "photos" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await?.to_vec();
                photos.push(SubmissionPhoto {
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    Ok(SubmitForm {
        trophy_id,
        comment,
        photos,
    })
}

/// POST /api/trophies.submit — подаёт заявку с фото-доказательствами.
///
/// Вся валидация и компенсация — в воркфлоу; уведомление модераторам
/// уходит уже после сохранения заявки.
pub async fn submit_trophy(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let user_id = authorize(&headers, &state.bot_token)?;
    let form = read_submit_form(multipart).await?;

    state
        .workflow
        .submit(user_id, form.trophy_id.trim(), form.comment.trim(), form.photos)
        .await?;

    Ok(Json(json!({"status": "ok", "message": "Заявка отправлена на рассмотрение"})))
}

/// Действие модерации, приходит от бота form-urlencoded.
#[derive(Debug, Deserialize)]
pub struct ModerationAction {
    pub user_id: i64,
    pub trophy_id: String,
}

/// POST /api/trophies.approve — одобряет заявку (кнопка модератора).
pub async fn approve_trophy(
    State(state): State<Arc<ApiState>>,
    Form(action): Form<ModerationAction>,
) -> Result<Json<Value>, ApiError> {
    state.workflow.approve(action.user_id, &action.trophy_id).await?;

    log::info!("Trophy {} approved for user {}", action.trophy_id, action.user_id);
    Ok(Json(json!({"status": "ok"})))
}

/// POST /api/trophies.reject — отклоняет заявку.
pub async fn reject_trophy(
    State(state): State<Arc<ApiState>>,
    Form(action): Form<ModerationAction>,
) -> Result<Json<Value>, ApiError> {
    state.workflow.reject(action.user_id, &action.trophy_id).await?;

    log::info!("Trophy {} rejected for user {}", action.trophy_id, action.user_id);
    Ok(Json(json!({"status": "ok"})))
}
