//! Kensei HTTP API
//!
//! axum-роутер поверх kensei-core: авторизация по initData в каждом
//! запросе, multipart-формы Mini App, CORS для фронтенда.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::ApiState;
