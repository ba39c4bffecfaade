//! Shared fixtures for kensei-core integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use kensei_core::catalog::TrophyCatalog;
use kensei_core::storage::photos::PhotoStore;
use kensei_core::storage::{create_pool, get_connection, profiles, DbPool};
use kensei_core::telegram::notify::{ModerationNotice, Notifier, NotifyOutcome};
use kensei_core::workflow::{SubmissionPhoto, SubmissionWorkflow};

/// Notifier that records every send instead of talking to Telegram.
#[derive(Default)]
pub struct RecordingNotifier {
    pub moderation: Mutex<Vec<ModerationNotice>>,
    pub user: Mutex<Vec<(i64, String)>>,
    /// When true, every send reports failure (workflow must not care).
    pub fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_moderators(&self, notice: &ModerationNotice) -> NotifyOutcome {
        self.moderation.lock().unwrap().push(notice.clone());
        if self.fail {
            NotifyOutcome::Failed("test failure".to_string())
        } else {
            NotifyOutcome::Sent
        }
    }

    async fn notify_user(&self, user_id: i64, text: &str) -> NotifyOutcome {
        self.user.lock().unwrap().push((user_id, text.to_string()));
        if self.fail {
            NotifyOutcome::Failed("test failure".to_string())
        } else {
            NotifyOutcome::Sent
        }
    }
}

/// Everything a workflow test needs: scratch DB, scratch photo root,
/// a catalog pointing nowhere (lookups fall back to raw ids) and a
/// recording notifier.
pub struct WorkflowEnv {
    pub dir: TempDir,
    pub db: Arc<DbPool>,
    pub store: PhotoStore,
    pub notifier: Arc<RecordingNotifier>,
    pub workflow: SubmissionWorkflow,
}

impl WorkflowEnv {
    pub fn new() -> Self {
        Self::with_catalog_url("http://127.0.0.1:1/catalog.json")
    }

    pub fn with_catalog_url(url: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.sqlite");
        let db = Arc::new(create_pool(db_path.to_str().unwrap()).unwrap());
        let store = PhotoStore::new(dir.path().join("trophies"));
        let notifier = Arc::new(RecordingNotifier::default());
        let notifier_dyn: Arc<dyn Notifier> = Arc::clone(&notifier);
        let catalog = Arc::new(TrophyCatalog::new(url));

        let workflow =
            SubmissionWorkflow::new(Arc::clone(&db), store.clone(), catalog, notifier_dyn);

        Self {
            dir,
            db,
            store,
            notifier,
            workflow,
        }
    }

    /// Creates a profile with a valid PSN so submissions pass the
    /// precondition.
    pub fn create_profile(&self, user_id: i64, psn: &str) {
        let conn = get_connection(&self.db).unwrap();
        profiles::upsert_profile(
            &conn,
            user_id,
            &profiles::NewProfile {
                real_name: "Test User",
                psn_id: psn,
                platforms: &[],
                modes: &[],
                goals: &[],
                difficulties: &[],
            },
        )
        .unwrap();
    }

    pub fn trophies_of(&self, user_id: i64) -> Vec<String> {
        let conn = get_connection(&self.db).unwrap();
        profiles::get_profile(&conn, user_id).unwrap().map(|p| p.trophies).unwrap_or_default()
    }
}

/// N dummy JPEG photos.
pub fn jpeg_photos(n: usize) -> Vec<SubmissionPhoto> {
    (0..n)
        .map(|i| SubmissionPhoto {
            content_type: "image/jpeg".to_string(),
            bytes: format!("photo-{}", i).into_bytes(),
        })
        .collect()
}
