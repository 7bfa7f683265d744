// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Community Portal: sign-in, profiles and event registration
//!
//! This crate provides the backend API behind the community site's static
//! pages: identity-provider sign-in, profile completion, event registration
//! with explicit confirmation, and the navigation and profile views.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod time_utils;

use config::Config;
use models::EventCatalog;
use services::{AuthStateNotifier, IdentityVerifier, PendingConfirmations};
use session::StoreHandle;
use std::sync::Arc;

/// Shared application state, constructed once at startup.
pub struct AppState {
    pub config: Config,
    pub store: StoreHandle,
    /// `None` when no identity provider is configured; sign-in then answers 503.
    pub identity: Option<Arc<IdentityVerifier>>,
    pub auth_state: AuthStateNotifier,
    pub pending: PendingConfirmations,
    pub catalog: EventCatalog,
}

impl AppState {
    pub fn new(config: Config, store: StoreHandle, identity: Option<Arc<IdentityVerifier>>) -> Self {
        Self {
            config,
            store,
            identity,
            auth_state: AuthStateNotifier::new(),
            pending: PendingConfirmations::new(),
            catalog: EventCatalog,
        }
    }
}
