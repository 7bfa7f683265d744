// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use community_portal::config::Config;
use community_portal::db::{FirestoreDb, Store};
use community_portal::middleware::auth::{create_jwt, SessionUser};
use community_portal::routes::create_router;
use community_portal::services::IdentityVerifier;
use community_portal::session::StoreHandle;
use community_portal::AppState;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const TEST_KID: &str = "test-kid";
pub const ID_TOKEN_SECRET: &[u8] = b"identity_provider_test_secret_32b";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

#[allow(dead_code)]
pub fn test_verifier(project_id: &str) -> Arc<IdentityVerifier> {
    Arc::new(
        IdentityVerifier::new_with_static_key(
            project_id,
            TEST_KID,
            Algorithm::HS256,
            DecodingKey::from_secret(ID_TOKEN_SECRET),
        )
        .expect("static verifier"),
    )
}

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let store = StoreHandle::ready(Store::memory());
    create_test_app_with(config, store, true)
}

#[allow(dead_code)]
pub fn create_test_app_with(
    config: Config,
    store: StoreHandle,
    sign_in_enabled: bool,
) -> (axum::Router, Arc<AppState>) {
    let identity = sign_in_enabled
        .then(|| test_verifier(config.firebase_project_id.as_deref().unwrap_or("test-project")));
    let state = Arc::new(AppState::new(config, store, identity));
    (create_router(state.clone()), state)
}

#[derive(Serialize)]
struct TestIdTokenClaims<'a> {
    iss: String,
    aud: &'a str,
    sub: &'a str,
    iat: u64,
    exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

/// Mint an ID token the static test verifier accepts.
#[allow(dead_code)]
pub fn id_token(uid: &str, email: Option<&str>, name: Option<&str>) -> String {
    mint_id_token(uid, email, None, name)
}

/// ID token whose email the provider marks as unverified.
#[allow(dead_code)]
pub fn unverified_id_token(uid: &str, email: &str) -> String {
    mint_id_token(uid, Some(email), Some(false), None)
}

#[allow(dead_code)]
fn mint_id_token(
    uid: &str,
    email: Option<&str>,
    email_verified: Option<bool>,
    name: Option<&str>,
) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let claims = TestIdTokenClaims {
        iss: "https://securetoken.google.com/test-project".to_string(),
        aud: "test-project",
        sub: uid,
        iat: now,
        exp: now + 3600,
        email,
        email_verified,
        name,
    };
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(TEST_KID.to_string());
    encode(&header, &claims, &EncodingKey::from_secret(ID_TOKEN_SECRET)).unwrap()
}

/// Session token for `uid` signed with the test config key.
#[allow(dead_code)]
pub fn session_token(uid: &str, email: Option<&str>) -> String {
    let user = SessionUser {
        uid: uid.to_string(),
        email: email.map(str::to_string),
        display_name: Some("Test User".to_string()),
        photo_url: None,
    };
    create_jwt(&user, &Config::test_default().session_signing_key).unwrap()
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[allow(dead_code)]
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
