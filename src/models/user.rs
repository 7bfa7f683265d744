// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Stored field names, used for field-masked merges.
pub mod fields {
    pub const UID: &str = "uid";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PHOTO_URL: &str = "photoURL";
    pub const PHONE: &str = "phone";
    pub const INSTITUTION: &str = "college";
    pub const CREATED_AT: &str = "createdAt";
    pub const LAST_LOGIN: &str = "lastLogin";
}

/// User profile stored in Firestore, keyed by identity-provider uid.
///
/// Field names match documents already written by the site, which is why the
/// institution is stored as `college`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Identity-provider uid (also used as document ID)
    #[serde(default)]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Normalized phone number (separators stripped)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, rename = "college", skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

impl UserProfile {
    /// True iff both phone and institution are recorded.
    pub fn is_complete(&self) -> bool {
        has_text(&self.phone) && has_text(&self.institution)
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Fields written by profile completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCompletion {
    pub phone: String,
    pub institution: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completeness_requires_both_fields() {
        let mut profile = UserProfile {
            uid: "u1".to_string(),
            ..Default::default()
        };
        assert!(!profile.is_complete());

        profile.phone = Some("9876543210".to_string());
        assert!(!profile.is_complete());

        profile.institution = Some(String::new());
        assert!(!profile.is_complete());

        profile.institution = Some("IIT Bombay".to_string());
        assert!(profile.is_complete());

        profile.phone = None;
        assert!(!profile.is_complete());
    }

    #[test]
    fn deserializes_legacy_document() {
        let doc = serde_json::json!({
            "uid": "abc",
            "name": "Asha",
            "email": "asha@example.com",
            "photoURL": "https://example.com/a.png",
            "phone": "9876543210",
            "college": "COEP",
            "createdAt": "2025-10-01T10:00:00.000Z",
            "lastLogin": "2025-10-02T10:00:00.000Z"
        });

        let profile: UserProfile = serde_json::from_value(doc).unwrap();
        assert_eq!(profile.institution.as_deref(), Some("COEP"));
        assert_eq!(profile.photo_url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(
            profile.last_login.as_deref(),
            Some("2025-10-02T10:00:00.000Z")
        );
        assert!(profile.is_complete());
    }

    #[test]
    fn omits_missing_fields_when_serializing() {
        let profile = UserProfile {
            uid: "abc".to_string(),
            last_login: Some("2025-10-02T10:00:00.000Z".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&profile).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(object.contains_key(fields::LAST_LOGIN));
    }
}
