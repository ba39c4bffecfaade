use thiserror::Error;

/// Centralized error types for the application
///
/// All errors in the core are converted to this enum for consistent
/// handling. Uses `thiserror` for automatic conversion and display
/// formatting. The HTTP layer maps variants onto status codes; the
/// `Unauthorized` variant deliberately carries no detail so a caller
/// cannot tell a malformed header from a bad signature.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// HTTP/Fetch errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors (photo store, filesystem)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication failure — cause intentionally not surfaced
    #[error("Unauthorized")]
    Unauthorized,

    /// Caller-fixable input errors (bad PSN format, photo count, etc.)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing resource, or a resource the caller does not own
    #[error("Not found")]
    NotFound,

    /// An external dependency (trophy catalog) is unavailable and no
    /// cached data exists to fall back to
    #[error("Dependency unavailable: {0}")]
    Dependency(String),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
