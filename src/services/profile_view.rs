// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only profile page: profile fields plus registered events.

use crate::db::Store;
use crate::error::AppError;
use crate::middleware::auth::SessionUser;
use crate::models::{EventCatalog, EventRegistration, UserProfile};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const NO_REGISTRATIONS: &str = "You haven't registered for any events yet.";

/// One registered event joined with its catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RegisteredEventView {
    pub event_id: String,
    pub title: String,
    pub image: String,
    pub date: String,
    pub time: String,
    pub link: String,
    pub status: String,
    pub registered_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileView {
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub phone: Option<String>,
    pub institution: Option<String>,
    pub registrations: Vec<RegisteredEventView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

fn join_catalog(catalog: &EventCatalog, registrations: Vec<EventRegistration>) -> Vec<RegisteredEventView> {
    registrations
        .into_iter()
        .filter_map(|reg| {
            let Some(event) = catalog.get(&reg.event_id) else {
                tracing::debug!(event_id = %reg.event_id, "Skipping registration for unknown event");
                return None;
            };
            Some(RegisteredEventView {
                event_id: reg.event_id,
                title: event.title.to_string(),
                image: event.image.to_string(),
                date: event.date.to_string(),
                time: event.time.to_string(),
                link: event.link.to_string(),
                status: reg.status,
                registered_at: reg.registered_at,
            })
        })
        .collect()
}

/// Assemble the profile page for `user`.
///
/// Fields absent from the stored profile fall back to the session, then to `None`.
pub async fn load_profile_view(
    store: &Store,
    catalog: &EventCatalog,
    user: &SessionUser,
) -> Result<ProfileView, AppError> {
    let profile = store.get_user(&user.uid).await?.unwrap_or_else(|| UserProfile {
        uid: user.uid.clone(),
        ..Default::default()
    });
    let registrations = store.list_registrations_for_user(&user.uid).await?;
    let registrations = join_catalog(catalog, registrations);

    let empty_message = registrations
        .is_empty()
        .then(|| NO_REGISTRATIONS.to_string());

    Ok(ProfileView {
        name: profile.name.or_else(|| user.display_name.clone()),
        email: profile.email.or_else(|| user.email.clone()),
        photo_url: profile.photo_url.or_else(|| user.photo_url.clone()),
        phone: profile.phone,
        institution: profile.institution,
        registrations,
        empty_message,
    })
}
