// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event registration workflow.
//!
//! ```text
//! signed_out ──sign in──▶ profile_incomplete ──complete──▶ open
//! open ──begin──▶ confirmation_pending ──confirm──▶ registered
//!                        │
//!                        └──cancel / expiry──▶ open
//! ```
//!
//! Nothing is written until the user confirms. The existence check before
//! `begin` keeps registered users out of the flow, and the store's create-only
//! write rejects a second registration for the same pair regardless.

use crate::db::Store;
use crate::error::AppError;
use crate::middleware::auth::SessionUser;
use crate::models::registration::STATUS_REGISTERED;
use crate::models::{EventInfo, EventRegistration, UserProfile};
use crate::time_utils::{format_utc_rfc3339, now_rfc3339};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use serde::Serialize;
use subtle::ConstantTimeEq;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// How long a confirmation prompt stays valid.
pub const CONFIRMATION_TTL_MINUTES: i64 = 10;

pub const PROFILE_INCOMPLETE: &str = "Please complete your profile first.";
pub const NOTHING_TO_CONFIRM: &str = "No registration is awaiting confirmation.";

/// Details shown to the user and copied into the registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RegistrationDetails {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub institution: Option<String>,
    pub email: Option<String>,
}

impl RegistrationDetails {
    fn from_profile(profile: &UserProfile, user: &SessionUser) -> Self {
        Self {
            name: profile
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .or_else(|| user.display_name.clone()),
            phone: profile.phone.clone(),
            institution: profile.institution.clone(),
            email: user.email.clone().or_else(|| profile.email.clone()),
        }
    }
}

/// A registration awaiting explicit confirmation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingConfirmation {
    pub confirmation_id: String,
    pub event_id: String,
    pub details: RegistrationDetails,
    pub expires_at: String,
    #[serde(skip)]
    expires: DateTime<Utc>,
}

impl PendingConfirmation {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }
}

/// Where a user stands with respect to one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RegistrationState {
    SignedOut,
    ProfileIncomplete,
    Open { details: RegistrationDetails },
    ConfirmationPending { confirmation: PendingConfirmation },
    Registered { registration: EventRegistration },
}

/// Pending confirmations keyed by (uid, event id).
pub struct PendingConfirmations {
    pending: DashMap<(String, String), PendingConfirmation>,
    rng: SystemRandom,
}

impl Default for PendingConfirmations {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingConfirmations {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            rng: SystemRandom::new(),
        }
    }

    fn key(uid: &str, event_id: &str) -> (String, String) {
        (uid.to_string(), event_id.to_string())
    }

    fn new_confirmation_id(&self) -> Result<String, AppError> {
        let mut bytes = [0u8; 16];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("system RNG failure")))?;
        Ok(hex::encode(bytes))
    }

    fn insert(
        &self,
        uid: &str,
        event_id: &str,
        details: RegistrationDetails,
    ) -> Result<PendingConfirmation, AppError> {
        let now = Utc::now();
        self.sweep(now);

        let expires = now + Duration::minutes(CONFIRMATION_TTL_MINUTES);
        let confirmation = PendingConfirmation {
            confirmation_id: self.new_confirmation_id()?,
            event_id: event_id.to_string(),
            details,
            expires_at: format_utc_rfc3339(expires),
            expires,
        };
        self.pending
            .insert(Self::key(uid, event_id), confirmation.clone());
        Ok(confirmation)
    }

    /// Forget every prompt that has run out, whoever opened it.
    fn sweep(&self, now: DateTime<Utc>) {
        let before = self.pending.len();
        self.pending.retain(|_, p| !p.is_expired(now));
        let swept = before.saturating_sub(self.pending.len());
        if swept > 0 {
            tracing::debug!(swept, "Dropped expired confirmations");
        }
    }

    /// The live pending confirmation, dropping it if expired.
    fn live(&self, uid: &str, event_id: &str) -> Option<PendingConfirmation> {
        let key = Self::key(uid, event_id);
        let now = Utc::now();
        self.pending.remove_if(&key, |_, p| p.is_expired(now));
        self.pending.get(&key).map(|p| p.clone())
    }

    /// Remove and return the confirmation if `confirmation_id` matches and it is live.
    fn take(
        &self,
        uid: &str,
        event_id: &str,
        confirmation_id: &str,
    ) -> Option<PendingConfirmation> {
        let now = Utc::now();
        let (_, pending) = self.pending.remove_if(&Self::key(uid, event_id), |_, p| {
            bool::from(
                p.confirmation_id
                    .as_bytes()
                    .ct_eq(confirmation_id.as_bytes()),
            )
        })?;
        (!pending.is_expired(now)).then_some(pending)
    }

    fn cancel(&self, uid: &str, event_id: &str) -> bool {
        self.pending.remove(&Self::key(uid, event_id)).is_some()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Drives the registration state machine for one event.
pub struct RegistrationFlow<'a> {
    store: &'a Store,
    pending: &'a PendingConfirmations,
    event: &'static EventInfo,
}

impl<'a> RegistrationFlow<'a> {
    pub fn new(
        store: &'a Store,
        pending: &'a PendingConfirmations,
        event: &'static EventInfo,
    ) -> Self {
        Self {
            store,
            pending,
            event,
        }
    }

    /// Current state for the caller.
    pub async fn status(&self, user: Option<&SessionUser>) -> Result<RegistrationState, AppError> {
        let Some(user) = user else {
            return Ok(RegistrationState::SignedOut);
        };

        if let Some(registration) = self.store.find_registration(&user.uid, self.event.id).await? {
            return Ok(RegistrationState::Registered { registration });
        }

        let profile = match self.store.get_user(&user.uid).await? {
            Some(profile) if profile.is_complete() => profile,
            _ => return Ok(RegistrationState::ProfileIncomplete),
        };

        if let Some(confirmation) = self.pending.live(&user.uid, self.event.id) {
            return Ok(RegistrationState::ConfirmationPending { confirmation });
        }

        Ok(RegistrationState::Open {
            details: RegistrationDetails::from_profile(&profile, user),
        })
    }

    /// Ask for confirmation. Writes nothing.
    pub async fn begin(&self, user: &SessionUser) -> Result<RegistrationState, AppError> {
        let profile = self
            .store
            .get_user(&user.uid)
            .await?
            .filter(UserProfile::is_complete)
            .ok_or_else(|| AppError::BadRequest(PROFILE_INCOMPLETE.to_string()))?;

        if self
            .store
            .find_registration(&user.uid, self.event.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(AppError::ALREADY_REGISTERED.to_string()));
        }

        let details = RegistrationDetails::from_profile(&profile, user);
        let confirmation = self.pending.insert(&user.uid, self.event.id, details)?;

        tracing::info!(
            uid = %user.uid,
            event_id = self.event.id,
            "Registration awaiting confirmation"
        );

        Ok(RegistrationState::ConfirmationPending { confirmation })
    }

    /// Write the registration captured by `begin`.
    pub async fn confirm(
        &self,
        user: &SessionUser,
        confirmation_id: &str,
    ) -> Result<RegistrationState, AppError> {
        let pending = self
            .pending
            .take(&user.uid, self.event.id, confirmation_id)
            .ok_or_else(|| AppError::BadRequest(NOTHING_TO_CONFIRM.to_string()))?;

        let details = pending.details;
        let registration = EventRegistration {
            user_id: user.uid.clone(),
            event_id: self.event.id.to_string(),
            name: details.name,
            phone: details.phone,
            institution: details.institution,
            email: details.email,
            registered_at: Some(now_rfc3339()),
            status: STATUS_REGISTERED.to_string(),
        };

        self.store.create_registration(&registration).await?;

        tracing::info!(
            uid = %user.uid,
            event_id = self.event.id,
            "Registration created"
        );

        Ok(RegistrationState::Registered { registration })
    }

    /// Abandon a pending confirmation and return to the pre-confirmation state.
    pub async fn cancel(&self, user: &SessionUser) -> Result<RegistrationState, AppError> {
        if self.pending.cancel(&user.uid, self.event.id) {
            tracing::debug!(uid = %user.uid, event_id = self.event.id, "Registration cancelled");
        }
        self.status(Some(user)).await
    }
}
