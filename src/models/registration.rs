// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event registration model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Status tag written on new registrations.
pub const STATUS_REGISTERED: &str = "registered";

/// A user's registration for one event.
///
/// Name, phone, institution and email are copied from the profile at the
/// moment of registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistration {
    pub user_id: String,
    pub event_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, rename = "college")]
    pub institution: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub registered_at: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    STATUS_REGISTERED.to_string()
}

impl EventRegistration {
    /// Document ID enforcing one registration per (user, event).
    pub fn document_id(user_id: &str, event_id: &str) -> String {
        format!(
            "{}_{}",
            urlencoding::encode(user_id),
            urlencoding::encode(event_id)
        )
    }
}
