// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every error body carries a user-facing `message` meant for the transient
//! banner on the site, plus how long the banner stays up.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Seconds the client keeps an error banner on screen.
pub const BANNER_DISMISS_SECS: u64 = 5;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Form input rejected before any store access.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend configuration is absent; the feature is disabled.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub const ALREADY_REGISTERED: &'static str = "You are already registered for this event.";

    /// Text shown to the user in the banner.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthorized | AppError::InvalidToken => "Please sign in first.".to_string(),
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::NotConfigured(msg) => msg.clone(),
            AppError::Unavailable(_) => {
                "The service is starting up. Please try again in a moment.".to_string()
            }
            AppError::Identity(_) => "Failed to sign in. Please try again.".to_string(),
            AppError::Database(_) | AppError::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    dismiss_after_secs: u64,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            AppError::NotConfigured(msg) => {
                tracing::warn!(reason = %msg, "Request to unconfigured backend");
                (StatusCode::SERVICE_UNAVAILABLE, "not_configured", None)
            }
            AppError::Unavailable(msg) => {
                tracing::warn!(reason = %msg, "Backend not ready");
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable", None)
            }
            AppError::Identity(msg) => {
                tracing::error!(error = %msg, "Identity provider error");
                (StatusCode::BAD_GATEWAY, "identity_error", None)
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message: self.user_message(),
            details,
            dismiss_after_secs: BANNER_DISMISS_SECS,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
