// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (`FIRESTORE_EMULATOR_HOST`); they are skipped otherwise.

use community_portal::error::AppError;
use community_portal::models::registration::STATUS_REGISTERED;
use community_portal::models::user::fields;
use community_portal::models::{EventRegistration, UserProfile};

mod common;
use common::test_db;

/// Generate a unique uid for test isolation.
fn unique_uid(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}")
}

fn registration(uid: &str, event_id: &str) -> EventRegistration {
    EventRegistration {
        user_id: uid.to_string(),
        event_id: event_id.to_string(),
        name: Some("Emulator User".to_string()),
        phone: Some("9876543210".to_string()),
        institution: Some("COEP".to_string()),
        email: Some("emu@example.com".to_string()),
        registered_at: Some(community_portal::time_utils::now_rfc3339()),
        status: STATUS_REGISTERED.to_string(),
    }
}

#[tokio::test]
async fn test_user_create_and_merge() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("user");

    assert!(db.get_user(&uid).await.unwrap().is_none());

    let profile = UserProfile {
        uid: uid.clone(),
        name: Some("Emulator User".to_string()),
        email: Some("emu@example.com".to_string()),
        created_at: Some(community_portal::time_utils::now_rfc3339()),
        ..Default::default()
    };
    db.set_user(&profile).await.unwrap();

    let patch = UserProfile {
        phone: Some("9876543210".to_string()),
        institution: Some("COEP".to_string()),
        ..Default::default()
    };
    db.merge_user(&uid, &patch, &[fields::PHONE, fields::INSTITUTION])
        .await
        .unwrap();

    let merged = db.get_user(&uid).await.unwrap().unwrap();
    assert_eq!(merged.name.as_deref(), Some("Emulator User"));
    assert_eq!(merged.institution.as_deref(), Some("COEP"));
    assert!(merged.is_complete());
}

#[tokio::test]
async fn test_registration_is_unique_per_pair() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("reg");

    db.create_registration(&registration(&uid, "event-a"))
        .await
        .unwrap();

    let err = db
        .create_registration(&registration(&uid, "event-a"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    db.create_registration(&registration(&uid, "event-b"))
        .await
        .unwrap();

    let found = db.find_registration(&uid, "event-a").await.unwrap();
    assert_eq!(found.unwrap().institution.as_deref(), Some("COEP"));

    let all = db.list_registrations_for_user(&uid).await.unwrap();
    assert_eq!(all.len(), 2);
}
