//! Integration tests for the submission workflow
//!
//! Run with: cargo test --test workflow_test

mod common;

use std::time::Duration;

use common::{jpeg_photos, WorkflowEnv};
use kensei_core::core::error::AppError;
use kensei_core::storage::{get_connection, submissions};
use kensei_core::workflow::SubmissionPhoto;

const USER: i64 = 123456789;
const TROPHY: &str = "wave-50";

/// Waits until the spawned moderation notice lands (submit notifies
/// asynchronously after the record is durable).
async fn wait_for_moderation(env: &WorkflowEnv, expected: usize) {
    for _ in 0..100 {
        if env.notifier.moderation.lock().unwrap().len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("moderation notice never arrived");
}

#[tokio::test]
async fn submit_then_approve_adds_trophy_once_and_purges_photos() {
    let env = WorkflowEnv::new();
    env.create_profile(USER, "TestPSN");

    env.workflow.submit(USER, TROPHY, "proof attached", jpeg_photos(3)).await.unwrap();
    assert_eq!(env.store.get_all(USER, TROPHY).await.unwrap().len(), 3);

    env.workflow.approve(USER, TROPHY).await.unwrap();

    let trophies = env.trophies_of(USER);
    assert_eq!(trophies, vec![TROPHY.to_string()]);

    // Artifacts are gone, the record keeps its terminal status
    assert!(env.store.get_all(USER, TROPHY).await.unwrap().is_empty());
    let conn = get_connection(&env.db).unwrap();
    let sub = submissions::get_submission(&conn, USER, TROPHY).unwrap().unwrap();
    assert_eq!(sub.status, submissions::STATUS_APPROVED);

    // Submitter was told
    let user_notices = env.notifier.user.lock().unwrap();
    assert_eq!(user_notices.len(), 1);
    assert_eq!(user_notices[0].0, USER);
    assert!(user_notices[0].1.contains("одобрена"));
}

#[tokio::test]
async fn approve_twice_does_not_duplicate_trophy() {
    let env = WorkflowEnv::new();
    env.create_profile(USER, "TestPSN");

    env.workflow.submit(USER, TROPHY, "", jpeg_photos(1)).await.unwrap();
    env.workflow.approve(USER, TROPHY).await.unwrap();
    env.workflow.approve(USER, TROPHY).await.unwrap();

    assert_eq!(env.trophies_of(USER), vec![TROPHY.to_string()]);
}

#[tokio::test]
async fn submit_then_reject_leaves_profile_untouched() {
    let env = WorkflowEnv::new();
    env.create_profile(USER, "TestPSN");

    env.workflow.submit(USER, TROPHY, "nope", jpeg_photos(2)).await.unwrap();
    env.workflow.reject(USER, TROPHY).await.unwrap();

    assert!(env.trophies_of(USER).is_empty());
    assert!(env.store.get_all(USER, TROPHY).await.unwrap().is_empty());

    let conn = get_connection(&env.db).unwrap();
    let sub = submissions::get_submission(&conn, USER, TROPHY).unwrap().unwrap();
    assert_eq!(sub.status, submissions::STATUS_REJECTED);

    let user_notices = env.notifier.user.lock().unwrap();
    assert!(user_notices[0].1.contains("отклонена"));
}

#[tokio::test]
async fn photo_count_limits() {
    let env = WorkflowEnv::new();
    env.create_profile(USER, "TestPSN");

    assert!(matches!(
        env.workflow.submit(USER, TROPHY, "", jpeg_photos(0)).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        env.workflow.submit(USER, TROPHY, "", jpeg_photos(11)).await,
        Err(AppError::Validation(_))
    ));

    assert!(env.workflow.submit(USER, TROPHY, "", jpeg_photos(1)).await.is_ok());
    assert!(env.workflow.submit(USER, "another-one", "", jpeg_photos(10)).await.is_ok());
}

#[tokio::test]
async fn non_image_part_is_rejected() {
    let env = WorkflowEnv::new();
    env.create_profile(USER, "TestPSN");

    let photos = vec![SubmissionPhoto {
        content_type: "video/mp4".to_string(),
        bytes: b"mp4".to_vec(),
    }];
    assert!(matches!(
        env.workflow.submit(USER, TROPHY, "", photos).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn submit_requires_profile_with_psn() {
    let env = WorkflowEnv::new();

    // No profile at all
    assert!(matches!(
        env.workflow.submit(USER, TROPHY, "", jpeg_photos(1)).await,
        Err(AppError::Validation(_))
    ));

    // Profile with empty PSN is not enough either
    env.create_profile(USER, "");
    assert!(matches!(
        env.workflow.submit(USER, TROPHY, "", jpeg_photos(1)).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn unsafe_trophy_id_is_rejected() {
    let env = WorkflowEnv::new();
    env.create_profile(USER, "TestPSN");

    assert!(matches!(
        env.workflow.submit(USER, "../escape", "", jpeg_photos(1)).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn approve_without_submission_is_not_found() {
    let env = WorkflowEnv::new();
    env.create_profile(USER, "TestPSN");

    assert!(matches!(env.workflow.approve(USER, TROPHY).await, Err(AppError::NotFound)));
    assert!(matches!(env.workflow.reject(USER, TROPHY).await, Err(AppError::NotFound)));
}

#[tokio::test]
async fn resubmit_overwrites_evidence_and_resets_status() {
    let env = WorkflowEnv::new();
    env.create_profile(USER, "TestPSN");

    env.workflow.submit(USER, TROPHY, "first try", jpeg_photos(5)).await.unwrap();
    env.workflow.reject(USER, TROPHY).await.unwrap();

    // Fresh submit after a terminal state starts a new pending record
    env.workflow.submit(USER, TROPHY, "second try", jpeg_photos(2)).await.unwrap();

    let conn = get_connection(&env.db).unwrap();
    let sub = submissions::get_submission(&conn, USER, TROPHY).unwrap().unwrap();
    assert_eq!(sub.status, submissions::STATUS_PENDING);
    assert_eq!(sub.comment, "second try");
    assert_eq!(env.store.get_all(USER, TROPHY).await.unwrap().len(), 2);
}

#[tokio::test]
async fn moderators_are_notified_after_submit() {
    let env = WorkflowEnv::new();
    env.create_profile(USER, "TestPSN");

    env.workflow.submit(USER, TROPHY, "see photos", jpeg_photos(2)).await.unwrap();
    wait_for_moderation(&env, 1).await;

    let notices = env.notifier.moderation.lock().unwrap();
    assert_eq!(notices[0].user_id, USER);
    assert_eq!(notices[0].trophy_id, TROPHY);
    assert_eq!(notices[0].psn_id, "TestPSN");
    // Catalog is unreachable in this env — raw id fallback
    assert!(notices[0].trophy.is_none());
    assert_eq!(notices[0].photos.len(), 2);
    assert_eq!(notices[0].comment, "see photos");
}
