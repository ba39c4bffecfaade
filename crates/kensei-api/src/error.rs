use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use kensei_core::AppError;

/// HTTP-слой ошибок.
///
/// Авторизация всегда отдаёт один и тот же ответ — по нему нельзя
/// понять, что именно не так с подписью. "Не найдено" не различает
/// отсутствие ресурса и чужое владение. Тело ошибки — `{"detail": ...}`,
/// как его читает клиент Mini App.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(String),
    NotFound,
    Dependency(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Невалидные данные авторизации".to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Не найдено".to_string()),
            ApiError::Dependency(msg) => {
                log::error!("Dependency failure: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Сервис временно недоступен".to_string())
            }
            ApiError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Внутренняя ошибка сервера".to_string())
            }
        };

        let body = Json(serde_json::json!({ "detail": detail }));
        (status, body).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Unauthorized => ApiError::Unauthorized,
            AppError::Validation(msg) => ApiError::BadRequest(msg),
            AppError::NotFound => ApiError::NotFound,
            AppError::Dependency(msg) => ApiError::Dependency(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::BadRequest(format!("Некорректная multipart-форма: {}", err))
    }
}
