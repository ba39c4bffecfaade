use axum::http::HeaderMap;

use kensei_core::init_data;

use crate::error::ApiError;

/// Заголовок, в котором Mini App передаёт подписанный initData.
pub const INIT_DATA_HEADER: &str = "x-telegram-init-data";

/// Авторизация запроса: verify + extract по заголовку initData.
///
/// Отсутствующий заголовок, битая подпись и неизвлекаемый user_id
/// дают один и тот же `Unauthorized` — вызывающий не узнаёт, какой
/// шаг провалился.
pub fn authorize(headers: &HeaderMap, bot_token: &str) -> Result<i64, ApiError> {
    let raw = headers
        .get(INIT_DATA_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let data = init_data::verify(raw, bot_token).map_err(|_| ApiError::Unauthorized)?;
    data.user_id().ok_or(ApiError::Unauthorized)
}
