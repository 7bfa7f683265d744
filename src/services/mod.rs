// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth_state;
pub mod community;
pub mod identity;
pub mod navigation;
pub mod profile;
pub mod profile_view;
pub mod registration;
pub mod validation;

pub use auth_state::{AuthSnapshot, AuthStateNotifier, View};
pub use identity::{IdentityError, IdentityVerifier, VerifiedIdentity};
pub use navigation::{render_navigation, NavModel};
pub use registration::{PendingConfirmations, RegistrationFlow, RegistrationState};
pub use validation::{PhoneNumber, ProfileCompletionRequest};
