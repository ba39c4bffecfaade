use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: miniapp.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "miniapp.sqlite".to_string()));

/// Root directory for uploaded photos (trophy evidence, build screenshots)
/// Read from UPLOADS_DIR environment variable
/// Default: uploads
pub static UPLOADS_DIR: Lazy<String> =
    Lazy::new(|| env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()));

/// Allowed CORS origin for the Mini App frontend
/// Read from ALLOWED_ORIGIN environment variable
/// When unset the API falls back to a permissive CORS policy (dev mode)
pub static ALLOWED_ORIGIN: Lazy<Option<String>> = Lazy::new(|| {
    env::var("ALLOWED_ORIGIN")
        .ok()
        .and_then(|s| if s.trim().is_empty() { None } else { Some(s) })
});

/// URL of the trophy catalog JSON (id -> {name, emoji, description})
/// Read from TROPHY_CATALOG_URL environment variable
pub static TROPHY_CATALOG_URL: Lazy<String> =
    Lazy::new(|| env::var("TROPHY_CATALOG_URL").unwrap_or_else(|_| String::new()));

/// Mini App URL used by the bot's /start button
/// Read from MINI_APP_URL environment variable
pub static MINI_APP_URL: Lazy<String> = Lazy::new(|| {
    env::var("MINI_APP_URL").unwrap_or_else(|_| "https://example.com/index.html".to_string())
});

/// Moderation configuration
pub mod moderation {
    use once_cell::sync::Lazy;
    use std::env;

    /// Chat ID of the moderation group that reviews trophy submissions
    /// Read from TROPHY_GROUP_CHAT_ID environment variable
    pub static GROUP_CHAT_ID: Lazy<i64> = Lazy::new(|| {
        env::var("TROPHY_GROUP_CHAT_ID")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    });

    /// Optional forum topic (thread) inside the moderation group
    /// Read from TROPHY_GROUP_TOPIC_ID environment variable
    pub static GROUP_TOPIC_ID: Lazy<Option<i32>> = Lazy::new(|| {
        env::var("TROPHY_GROUP_TOPIC_ID").ok().and_then(|s| s.parse().ok())
    });
}

/// HTTP API server configuration
pub mod api {
    use once_cell::sync::Lazy;
    use std::env;

    /// Port for the API server
    /// Read from API_PORT environment variable
    /// Default: 8000
    pub static PORT: Lazy<u16> = Lazy::new(|| {
        env::var("API_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8000)
    });

    /// Base URL of the API, used by the bot relay
    /// Read from API_BASE_URL environment variable
    /// Default: http://localhost:8000
    pub static BASE_URL: Lazy<String> = Lazy::new(|| {
        env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
    });
}

/// Network configuration for outbound calls (catalog fetch, notifications,
/// bot relay). Short on purpose: a slow dependency must not stall request
/// handling.
pub mod network {
    use super::Duration;

    /// Request timeout for outbound HTTP requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Trophy catalog cache configuration
pub mod catalog {
    use super::Duration;

    /// Cache lifetime for the fetched catalog (in seconds)
    pub const TTL_SECS: u64 = 3600; // 1 hour

    /// Cache TTL duration
    pub fn ttl() -> Duration {
        Duration::from_secs(TTL_SECS)
    }
}

/// Upload limits
pub mod limits {
    /// Maximum number of photos per trophy submission
    pub const MAX_SUBMISSION_PHOTOS: usize = 10;

    /// Maximum number of photos per build
    pub const MAX_BUILD_PHOTOS: usize = 2;

    /// Maximum multipart body size accepted by the API (bytes)
    pub const MAX_UPLOAD_BODY_BYTES: usize = 50 * 1024 * 1024; // 50 MB
}
