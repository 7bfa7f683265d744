// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore, or in-memory for development and tests).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{EventRegistration, UserProfile};
use std::sync::Arc;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const EVENT_REGISTRATIONS: &str = "event_registrations";
}

/// Document store handle shared by all flows.
#[derive(Clone)]
pub enum Store {
    Firestore(FirestoreDb),
    Memory(Arc<MemoryStore>),
}

impl Store {
    pub fn memory() -> Self {
        Store::Memory(Arc::new(MemoryStore::new()))
    }

    pub async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        match self {
            Store::Firestore(db) => db.get_user(uid).await,
            Store::Memory(mem) => Ok(mem.get_user(uid)),
        }
    }

    pub async fn set_user(&self, profile: &UserProfile) -> Result<(), AppError> {
        match self {
            Store::Firestore(db) => db.set_user(profile).await,
            Store::Memory(mem) => {
                mem.set_user(profile);
                Ok(())
            }
        }
    }

    /// Merge only the named stored fields of `patch` into the user document.
    pub async fn merge_user(
        &self,
        uid: &str,
        patch: &UserProfile,
        fields: &[&str],
    ) -> Result<(), AppError> {
        match self {
            Store::Firestore(db) => db.merge_user(uid, patch, fields).await,
            Store::Memory(mem) => mem.merge_user(uid, patch, fields),
        }
    }

    pub async fn count_users(&self) -> Result<u64, AppError> {
        match self {
            Store::Firestore(db) => db.count_users().await,
            Store::Memory(mem) => Ok(mem.count_users()),
        }
    }

    /// Create-only write; `AppError::Conflict` if the pair is already registered.
    pub async fn create_registration(
        &self,
        registration: &EventRegistration,
    ) -> Result<(), AppError> {
        match self {
            Store::Firestore(db) => db.create_registration(registration).await,
            Store::Memory(mem) => mem.create_registration(registration),
        }
    }

    pub async fn find_registration(
        &self,
        uid: &str,
        event_id: &str,
    ) -> Result<Option<EventRegistration>, AppError> {
        match self {
            Store::Firestore(db) => db.find_registration(uid, event_id).await,
            Store::Memory(mem) => Ok(mem.find_registration(uid, event_id)),
        }
    }

    pub async fn list_registrations_for_user(
        &self,
        uid: &str,
    ) -> Result<Vec<EventRegistration>, AppError> {
        match self {
            Store::Firestore(db) => db.list_registrations_for_user(uid).await,
            Store::Memory(mem) => Ok(mem.list_registrations_for_user(uid)),
        }
    }
}
