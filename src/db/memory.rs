// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store with the same semantics as the Firestore wrapper.
//!
//! Used for local development (`STORE_BACKEND=memory`) and tests.

use crate::error::AppError;
use crate::models::user::fields;
use crate::models::{EventRegistration, UserProfile};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<String, UserProfile>,
    /// Keyed by `EventRegistration::document_id`
    registrations: DashMap<String, EventRegistration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_user(&self, uid: &str) -> Option<UserProfile> {
        self.users.get(uid).map(|u| u.clone())
    }

    pub fn set_user(&self, profile: &UserProfile) {
        self.users.insert(profile.uid.clone(), profile.clone());
    }

    pub fn merge_user(
        &self,
        uid: &str,
        patch: &UserProfile,
        field_names: &[&str],
    ) -> Result<(), AppError> {
        let mut entry = self.users.entry(uid.to_string()).or_insert_with(|| UserProfile {
            uid: uid.to_string(),
            ..Default::default()
        });
        let target = entry.value_mut();

        for field in field_names {
            match *field {
                fields::UID => target.uid = patch.uid.clone(),
                fields::NAME => target.name = patch.name.clone(),
                fields::EMAIL => target.email = patch.email.clone(),
                fields::PHOTO_URL => target.photo_url = patch.photo_url.clone(),
                fields::PHONE => target.phone = patch.phone.clone(),
                fields::INSTITUTION => target.institution = patch.institution.clone(),
                fields::CREATED_AT => target.created_at = patch.created_at.clone(),
                fields::LAST_LOGIN => target.last_login = patch.last_login.clone(),
                other => {
                    return Err(AppError::Database(format!(
                        "Unknown user field in merge: {other}"
                    )))
                }
            }
        }

        Ok(())
    }

    pub fn count_users(&self) -> u64 {
        self.users.len() as u64
    }

    pub fn create_registration(&self, registration: &EventRegistration) -> Result<(), AppError> {
        let doc_id =
            EventRegistration::document_id(&registration.user_id, &registration.event_id);

        match self.registrations.entry(doc_id) {
            Entry::Occupied(_) => Err(AppError::Conflict(
                AppError::ALREADY_REGISTERED.to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(registration.clone());
                Ok(())
            }
        }
    }

    pub fn find_registration(&self, uid: &str, event_id: &str) -> Option<EventRegistration> {
        self.registrations
            .iter()
            .find(|r| r.user_id == uid && r.event_id == event_id)
            .map(|r| r.value().clone())
    }

    pub fn list_registrations_for_user(&self, uid: &str) -> Vec<EventRegistration> {
        let mut found: Vec<EventRegistration> = self
            .registrations
            .iter()
            .filter(|r| r.user_id == uid)
            .map(|r| r.value().clone())
            .collect();
        found.sort_by(|a, b| a.registered_at.cmp(&b.registered_at));
        found
    }
}
