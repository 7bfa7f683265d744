// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, field-masked merges)
//! - Event registrations (create-only writes, equality queries)
//! - Approximate collection counts

use crate::db::collections;
use crate::error::AppError;
use crate::models::{EventRegistration, UserProfile};
use serde::Deserialize;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

/// Result row of a count aggregation.
#[derive(Debug, Deserialize)]
struct CountResult {
    #[serde(default)]
    count: u64,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user profile by uid.
    pub async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write a complete user profile, replacing any existing document.
    pub async fn set_user(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Merge only `fields` from `patch` into the user document.
    ///
    /// Other stored fields are left untouched; the document is created if absent.
    pub async fn merge_user(
        &self,
        uid: &str,
        patch: &UserProfile,
        fields: &[&str],
    ) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .fields(fields.iter().copied())
            .in_col(collections::USERS)
            .document_id(uid)
            .object(patch)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Approximate number of user profiles (server-side aggregation).
    pub async fn count_users(&self) -> Result<u64, AppError> {
        let rows: Vec<CountResult> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .aggregate(|a| a.fields([a.field("count").count()]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    // ─── Registration Operations ─────────────────────────────────

    /// Create a registration; fails with `Conflict` if the document exists.
    pub async fn create_registration(
        &self,
        registration: &EventRegistration,
    ) -> Result<(), AppError> {
        let doc_id =
            EventRegistration::document_id(&registration.user_id, &registration.event_id);

        let result: Result<EventRegistration, _> = self
            .client
            .fluent()
            .insert()
            .into(collections::EVENT_REGISTRATIONS)
            .document_id(&doc_id)
            .object(registration)
            .execute()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(firestore::errors::FirestoreError::DataConflictError(e)) => {
                tracing::info!(
                    uid = %registration.user_id,
                    event_id = %registration.event_id,
                    error = %e,
                    "Registration document already exists"
                );
                Err(AppError::Conflict(AppError::ALREADY_REGISTERED.to_string()))
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Find the registration for a (user, event) pair.
    ///
    /// Queries by field rather than document ID so that registrations written
    /// under generated IDs are found too.
    pub async fn find_registration(
        &self,
        uid: &str,
        event_id: &str,
    ) -> Result<Option<EventRegistration>, AppError> {
        let mut found: Vec<EventRegistration> = self
            .client
            .fluent()
            .select()
            .from(collections::EVENT_REGISTRATIONS)
            .filter(|q| {
                q.for_all([
                    q.field("userId").eq(uid),
                    q.field("eventId").eq(event_id),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(found.pop())
    }

    /// All registrations for a user.
    pub async fn list_registrations_for_user(
        &self,
        uid: &str,
    ) -> Result<Vec<EventRegistration>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::EVENT_REGISTRATIONS)
            .filter(|q| q.for_all([q.field("userId").eq(uid)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
