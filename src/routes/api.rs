// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON API routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::{MaybeUser, SessionId, SessionUser};
use crate::models::{EventInfo, UserProfile};
use crate::services::community::{community_stats, CommunityStats};
use crate::services::navigation::{render_navigation, NavModel};
use crate::services::profile::{complete_profile, validate_completion};
use crate::services::profile_view::{load_profile_view, ProfileView};
use crate::services::auth_state::select_view;
use crate::services::{
    AuthSnapshot, ProfileCompletionRequest, RegistrationFlow, RegistrationState, View,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Name of the server-sent event carrying auth snapshots.
pub const AUTH_STATE_EVENT: &str = "auth_state";

/// Routes open to everyone.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/stats/community", get(get_community_stats))
        .route("/api/events", get(list_events))
}

/// Routes that adapt to the caller but never require a session.
/// `optional_auth` is applied in routes/mod.rs.
pub fn optional_auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/nav", get(get_nav))
        .route("/api/events/{event_id}/registration", get(get_registration))
}

/// API routes (require a session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/session/stream", get(stream_session))
        .route("/api/me", get(get_me))
        .route("/api/profile", put(put_profile))
        .route("/api/profile/view", get(get_profile_view))
        .route(
            "/api/events/{event_id}/registration",
            post(begin_registration),
        )
        .route(
            "/api/events/{event_id}/registration/confirm",
            post(confirm_registration),
        )
        .route(
            "/api/events/{event_id}/registration/pending",
            delete(cancel_registration),
        )
}

fn find_event(state: &AppState, event_id: &str) -> Result<&'static EventInfo> {
    state
        .catalog
        .get(event_id)
        .ok_or_else(|| AppError::NotFound("Event not found.".to_string()))
}

// ─── Session ─────────────────────────────────────────────────

/// Snapshot derived from the stored profile.
async fn fresh_snapshot(state: &AppState, user: SessionUser) -> Result<AuthSnapshot> {
    let store = state.store.get().await?;
    let profile = store.get_user(&user.uid).await?;
    Ok(AuthSnapshot::for_user(user, profile.as_ref()))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<AuthSnapshot>> {
    Ok(Json(fresh_snapshot(&state, user).await?))
}

/// Push auth state changes for the caller's session.
///
/// The first event is the current snapshot; later events follow profile
/// completion on any of the user's sessions and sign-out of this one. The
/// stream ends after the signed-out event.
async fn stream_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let uid = user.uid.clone();
    let initial = fresh_snapshot(&state, user).await?;
    let subscription = state.auth_state.subscribe(&uid, &session_id, initial);

    tracing::debug!(uid = %uid, "Auth state stream opened");

    let events = stream::unfold(
        (subscription, true, false),
        |(mut subscription, first, ended)| async move {
            if ended || (!first && subscription.changed().await.is_err()) {
                return None;
            }
            let snapshot = subscription.latest();
            let signed_out = snapshot.user.is_none();
            let event = Event::default().event(AUTH_STATE_EVENT).json_data(&snapshot);
            Some((event, (subscription, false, signed_out)))
        },
    );

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

// ─── User Profile ────────────────────────────────────────────

#[derive(Serialize)]
pub struct MeResponse {
    pub user: SessionUser,
    pub profile: Option<UserProfile>,
    pub view: View,
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<MeResponse>> {
    let store = state.store.get().await?;
    let profile = store.get_user(&user.uid).await?;
    let view = select_view(Some(&user), profile.as_ref());

    Ok(Json(MeResponse {
        user,
        profile,
        view,
    }))
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub profile: UserProfile,
    pub view: View,
}

/// Complete the profile with phone and institution.
async fn put_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(request): Json<ProfileCompletionRequest>,
) -> Result<Json<ProfileResponse>> {
    let store = state.store.get().await?;
    let stored = store.get_user(&user.uid).await?;
    let completion = validate_completion(&user, stored.as_ref(), request)?;
    let profile = complete_profile(&store, &user.uid, completion).await?;

    let snapshot = AuthSnapshot::for_user(user.clone(), Some(&profile));
    let view = snapshot.view;
    state.auth_state.publish(&user.uid, snapshot);

    Ok(Json(ProfileResponse { profile, view }))
}

async fn get_profile_view(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ProfileView>> {
    let store = state.store.get().await?;
    Ok(Json(
        load_profile_view(&store, &state.catalog, &user).await?,
    ))
}

// ─── Registration ────────────────────────────────────────────

async fn get_registration(
    State(state): State<Arc<AppState>>,
    Extension(MaybeUser(user)): Extension<MaybeUser>,
    Path(event_id): Path<String>,
) -> Result<Json<RegistrationState>> {
    let event = find_event(&state, &event_id)?;
    if user.is_none() {
        return Ok(Json(RegistrationState::SignedOut));
    }

    let store = state.store.get().await?;
    let flow = RegistrationFlow::new(&store, &state.pending, event);
    Ok(Json(flow.status(user.as_ref()).await?))
}

async fn begin_registration(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(event_id): Path<String>,
) -> Result<Json<RegistrationState>> {
    let event = find_event(&state, &event_id)?;
    let store = state.store.get().await?;
    let flow = RegistrationFlow::new(&store, &state.pending, event);
    Ok(Json(flow.begin(&user).await?))
}

#[derive(Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ConfirmRequest {
    pub confirmation_id: String,
}

async fn confirm_registration(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(event_id): Path<String>,
    Json(body): Json<ConfirmRequest>,
) -> Result<Json<RegistrationState>> {
    let event = find_event(&state, &event_id)?;
    let store = state.store.get().await?;
    let flow = RegistrationFlow::new(&store, &state.pending, event);
    Ok(Json(flow.confirm(&user, &body.confirmation_id).await?))
}

async fn cancel_registration(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(event_id): Path<String>,
) -> Result<Json<RegistrationState>> {
    let event = find_event(&state, &event_id)?;
    let store = state.store.get().await?;
    let flow = RegistrationFlow::new(&store, &state.pending, event);
    Ok(Json(flow.cancel(&user).await?))
}

// ─── Navigation, stats, catalog ──────────────────────────────

async fn get_nav(
    State(state): State<Arc<AppState>>,
    Extension(MaybeUser(user)): Extension<MaybeUser>,
) -> Json<NavModel> {
    let featured_registered = match &user {
        Some(user) => featured_registered(&state, &user.uid).await,
        None => false,
    };
    Json(render_navigation(user.as_ref(), featured_registered))
}

/// Whether `uid` is registered for the featured event; lookup failures count as no.
async fn featured_registered(state: &AppState, uid: &str) -> bool {
    let featured = state.catalog.featured();
    let lookup = async {
        let store = state.store.get().await?;
        store.find_registration(uid, featured.id).await
    };
    match lookup.await {
        Ok(found) => found.is_some(),
        Err(e) => {
            tracing::warn!(uid, event_id = featured.id, error = %e, "Featured registration lookup failed");
            false
        }
    }
}

async fn get_community_stats(State(state): State<Arc<AppState>>) -> Result<Json<CommunityStats>> {
    let store = state.store.get().await?;
    Ok(Json(community_stats(&store).await?))
}

async fn list_events(State(state): State<Arc<AppState>>) -> Json<&'static [EventInfo]> {
    Json(state.catalog.all())
}
