use std::sync::Arc;

use kensei_core::storage::photos::PhotoStore;
use kensei_core::storage::DbPool;
use kensei_core::workflow::SubmissionWorkflow;

/// Shared state для всех endpoints.
pub struct ApiState {
    pub db: Arc<DbPool>,
    pub workflow: SubmissionWorkflow,
    /// Blob store для скриншотов билдов (`<uploads>/builds`)
    pub build_photos: PhotoStore,
    pub bot_token: String,
}
