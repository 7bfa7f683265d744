// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (session authentication, security headers).

pub mod auth;
pub mod security;

pub use auth::{optional_auth, require_auth, MaybeUser, SessionUser};
