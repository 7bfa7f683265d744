// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile creation on sign-in and profile completion.

use crate::db::Store;
use crate::error::AppError;
use crate::middleware::auth::SessionUser;
use crate::models::user::fields;
use crate::models::{ProfileCompletion, UserProfile};
use crate::services::validation::{ProfileCompletionRequest, EMAIL_INVALID};
use crate::time_utils::now_rfc3339;
use validator::ValidateEmail;

/// Create the profile on first sign-in, otherwise bump `lastLogin` only.
pub async fn record_sign_in(store: &Store, user: &SessionUser) -> Result<(), AppError> {
    let now = now_rfc3339();

    match store.get_user(&user.uid).await? {
        None => {
            let profile = UserProfile {
                uid: user.uid.clone(),
                name: user.display_name.clone(),
                email: user.email.clone(),
                photo_url: user.photo_url.clone(),
                created_at: Some(now.clone()),
                last_login: Some(now),
                ..Default::default()
            };
            store.set_user(&profile).await?;
            tracing::info!(uid = %user.uid, "Created user profile");
        }
        Some(_) => {
            let patch = UserProfile {
                last_login: Some(now),
                ..Default::default()
            };
            store
                .merge_user(&user.uid, &patch, &[fields::LAST_LOGIN])
                .await?;
            tracing::debug!(uid = %user.uid, "Updated last login");
        }
    }

    Ok(())
}

/// Check a completion form against the signed-in user without touching the store.
///
/// The session's email wins; the stored profile's email is the fallback.
pub fn validate_completion(
    user: &SessionUser,
    stored: Option<&UserProfile>,
    request: ProfileCompletionRequest,
) -> Result<ProfileCompletion, AppError> {
    let request = request.trimmed();
    let phone = request.check().map_err(AppError::Validation)?;

    let email = user
        .email
        .iter()
        .chain(stored.and_then(|p| p.email.as_ref()))
        .find(|e| e.validate_email())
        .cloned()
        .ok_or_else(|| AppError::Validation(EMAIL_INVALID.to_string()))?;

    Ok(ProfileCompletion {
        phone: phone.into_inner(),
        institution: request.institution,
        email,
    })
}

/// Merge phone, institution and email into the profile and return the result.
pub async fn complete_profile(
    store: &Store,
    uid: &str,
    completion: ProfileCompletion,
) -> Result<UserProfile, AppError> {
    let patch = UserProfile {
        phone: Some(completion.phone),
        institution: Some(completion.institution),
        email: Some(completion.email),
        ..Default::default()
    };

    store
        .merge_user(
            uid,
            &patch,
            &[fields::PHONE, fields::INSTITUTION, fields::EMAIL],
        )
        .await?;

    tracing::info!(uid, "Profile completed");

    store.get_user(uid).await?.ok_or_else(|| {
        AppError::Database(format!("profile {uid} missing after completion"))
    })
}
