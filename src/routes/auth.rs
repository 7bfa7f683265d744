// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in and sign-out routes.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, session_user, SessionUser, SESSION_COOKIE};
use crate::services::identity::IdentityError;
use crate::services::profile::record_sign_in;
use crate::services::AuthSnapshot;
use crate::session::NOT_CONFIGURED_MESSAGE;
use crate::AppState;

const SESSION_COOKIE_DAYS: i64 = 30;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google", post(sign_in))
        .route("/auth/logout", post(logout))
}

/// Session cookie with the attributes shared by creation and removal.
fn session_cookie(value: String, secure: bool, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub id_token: String,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub snapshot: AuthSnapshot,
}

/// Exchange an identity-provider ID token for a session cookie.
async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SignInRequest>,
) -> Result<(CookieJar, Json<SignInResponse>)> {
    let verifier = state
        .identity
        .as_ref()
        .ok_or_else(|| AppError::NotConfigured(NOT_CONFIGURED_MESSAGE.to_string()))?;

    let identity = verifier
        .verify_id_token(&body.id_token)
        .await
        .map_err(|e| match e {
            IdentityError::Rejected(reason) => {
                tracing::warn!(reason = %reason, "Rejected ID token");
                AppError::InvalidToken
            }
            IdentityError::Transient(reason) => AppError::Identity(reason),
        })?;

    let user = SessionUser {
        uid: identity.uid,
        email: identity.email,
        display_name: identity.display_name,
        photo_url: identity.photo_url,
    };

    // Profile bookkeeping must not block sign-in.
    let profile = match state.store.get().await {
        Ok(store) => {
            if let Err(e) = record_sign_in(&store, &user).await {
                tracing::warn!(uid = %user.uid, error = %e, "Failed to record sign-in");
            }
            store.get_user(&user.uid).await.unwrap_or_else(|e| {
                tracing::warn!(uid = %user.uid, error = %e, "Failed to load profile");
                None
            })
        }
        Err(e) => {
            tracing::warn!(uid = %user.uid, error = %e, "Store unavailable during sign-in");
            None
        }
    };

    let token = create_jwt(&user, &state.config.session_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let uid = user.uid.clone();
    let snapshot = AuthSnapshot::for_user(user, profile.as_ref());
    state.auth_state.publish(&uid, snapshot.clone());

    tracing::info!(uid = %uid, view = ?snapshot.view, "User signed in");

    let jar = jar.add(session_cookie(
        token.clone(),
        state.config.cookie_secure,
        time::Duration::days(SESSION_COOKIE_DAYS),
    ));

    Ok((jar, Json(SignInResponse { token, snapshot })))
}

/// Clear the session cookie and tell the other pages of this session.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, StatusCode) {
    if let Some((user, session_id)) =
        session_user(&jar, &headers, &state.config.session_signing_key)
    {
        state.auth_state.sign_out(&user.uid, &session_id.0);
        tracing::info!(uid = %user.uid, "User signed out");
    }

    let jar = jar.add(session_cookie(
        String::new(),
        state.config.cookie_secure,
        time::Duration::ZERO,
    ));

    (jar, StatusCode::NO_CONTENT)
}
