// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod event;
pub mod registration;
pub mod user;

pub use event::{EventCatalog, EventInfo, FEATURED_EVENT_ID};
pub use registration::EventRegistration;
pub use user::{ProfileCompletion, UserProfile};
