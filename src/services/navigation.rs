// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Navigation bar and call-to-action state.

use crate::middleware::auth::SessionUser;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const JOIN_HREF: &str = "join.html";
pub const PROFILE_HREF: &str = "profile.html";
pub const LOGOUT_ACTION: &str = "/auth/logout";
pub const FEATURED_EVENT_HREF: &str = "event-gsoc.html";

const GO_TO_PROFILE: &str = "Go to Profile";

/// Slot name and signed-out label of each join-style CTA.
const JOIN_CTAS: &[(&str, &str)] = &[
    ("hero-primary", "Join Now"),
    ("hero-card", "Join Now"),
    ("join-team", "Join a Team"),
    ("get-started", "Get Started →"),
];

pub const FEATURED_SLOT: &str = "featured-event";

/// Right-hand side of the navigation bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavAuth {
    Join {
        href: String,
    },
    UserMenu {
        display_name: String,
        profile_href: String,
        logout_action: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Cta {
    pub slot: String,
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NavModel {
    pub auth: NavAuth,
    pub ctas: Vec<Cta>,
    pub show_cta_hints: bool,
}

fn cta(slot: &str, label: &str, href: &str) -> Cta {
    Cta {
        slot: slot.to_string(),
        label: label.to_string(),
        href: href.to_string(),
    }
}

/// Derive the navigation model from the current user and whether they are
/// registered for the featured event. Pure; the same inputs give the same model.
pub fn render_navigation(user: Option<&SessionUser>, featured_registered: bool) -> NavModel {
    let auth = match user {
        Some(user) => NavAuth::UserMenu {
            display_name: user.label(),
            profile_href: PROFILE_HREF.to_string(),
            logout_action: LOGOUT_ACTION.to_string(),
        },
        None => NavAuth::Join {
            href: JOIN_HREF.to_string(),
        },
    };

    let mut ctas: Vec<Cta> = JOIN_CTAS
        .iter()
        .map(|(slot, label)| match user {
            Some(_) => cta(slot, GO_TO_PROFILE, PROFILE_HREF),
            None => cta(slot, label, JOIN_HREF),
        })
        .collect();

    ctas.push(if featured_registered {
        cta(FEATURED_SLOT, "View My Registration", PROFILE_HREF)
    } else {
        cta(FEATURED_SLOT, "Register Now", FEATURED_EVENT_HREF)
    });

    NavModel {
        auth,
        ctas,
        show_cta_hints: user.is_none() && !featured_registered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            uid: "u".to_string(),
            email: Some("kiran@example.com".to_string()),
            display_name: None,
            photo_url: None,
        }
    }

    fn slot<'a>(model: &'a NavModel, name: &str) -> &'a Cta {
        model.ctas.iter().find(|c| c.slot == name).unwrap()
    }

    #[test]
    fn signed_out_shows_join() {
        let model = render_navigation(None, false);
        assert_eq!(
            model.auth,
            NavAuth::Join {
                href: JOIN_HREF.to_string()
            }
        );
        assert_eq!(slot(&model, "hero-primary").label, "Join Now");
        assert_eq!(slot(&model, "get-started").label, "Get Started →");
        assert_eq!(slot(&model, "join-team").href, JOIN_HREF);
        assert_eq!(slot(&model, FEATURED_SLOT).label, "Register Now");
        assert!(model.show_cta_hints);
    }

    #[test]
    fn signed_in_points_at_profile() {
        let model = render_navigation(Some(&user()), false);
        let NavAuth::UserMenu { display_name, .. } = &model.auth else {
            panic!("expected user menu");
        };
        assert_eq!(display_name, "kiran");
        for (name, _) in JOIN_CTAS {
            let c = slot(&model, name);
            assert_eq!(c.label, GO_TO_PROFILE);
            assert_eq!(c.href, PROFILE_HREF);
        }
        assert!(!model.show_cta_hints);
    }

    #[test]
    fn registered_user_sees_registration_link() {
        let model = render_navigation(Some(&user()), true);
        let featured = slot(&model, FEATURED_SLOT);
        assert_eq!(featured.label, "View My Registration");
        assert_eq!(featured.href, PROFILE_HREF);
    }

    #[test]
    fn rendering_is_idempotent() {
        let u = user();
        for (who, registered) in [(None, false), (Some(&u), false), (Some(&u), true)] {
            assert_eq!(
                render_navigation(who, registered),
                render_navigation(who, registered)
            );
        }
    }
}
