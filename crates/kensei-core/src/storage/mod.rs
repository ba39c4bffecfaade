//! SQLite access and the photo blob store

pub mod builds;
pub mod db;
pub mod photos;
pub mod profiles;
pub mod submissions;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use photos::PhotoStore;
