// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A missing Firebase project is not fatal: the server starts with sign-in and
//! the document store disabled so the static pages still render.

use std::env;

/// Which document store backend to connect at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

impl StoreBackend {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", raw.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase/GCP project; identity token audience and Firestore project.
    pub firebase_project_id: Option<String>,
    pub store_backend: StoreBackend,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
    /// HMAC key for session tokens (raw bytes)
    pub session_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5500".to_string());

        let cookie_secure = match env::var("COOKIE_SECURE") {
            Ok(v) => matches!(v.trim(), "1" | "true" | "yes"),
            Err(_) => frontend_url.starts_with("https://"),
        };

        let firebase_project_id = env::var("FIREBASE_PROJECT_ID")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => StoreBackend::parse(&raw)?,
            Err(_) => StoreBackend::Firestore,
        };

        let session_signing_key = env::var("SESSION_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
            .trim()
            .as_bytes()
            .to_vec();
        if session_signing_key.len() < 32 {
            return Err(ConfigError::Invalid(
                "SESSION_SIGNING_KEY",
                "must be at least 32 bytes".to_string(),
            ));
        }

        Ok(Self {
            firebase_project_id,
            store_backend,
            frontend_url,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            cookie_secure,
            session_signing_key,
        })
    }

    /// Config for tests: in-memory store, known signing key.
    pub fn test_default() -> Self {
        Self {
            firebase_project_id: Some("test-project".to_string()),
            store_backend: StoreBackend::Memory,
            frontend_url: "http://localhost:5500".to_string(),
            port: 8080,
            cookie_secure: false,
            session_signing_key: b"test_session_key_32_bytes_long!!".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
