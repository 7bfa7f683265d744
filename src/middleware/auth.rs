// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session JWT authentication middleware.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the HttpOnly session cookie.
pub const SESSION_COOKIE: &str = "portal_session";

/// Session lifetime in seconds (30 days).
pub const SESSION_TTL_SECS: usize = 30 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity-provider uid)
    pub sub: String,
    /// Session id, fresh for every sign-in
    pub sid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Signed-in user extracted from the session token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl SessionUser {
    /// Display name, then email local part, then "User".
    pub fn label(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        self.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or("User")
            .to_string()
    }
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            uid: claims.sub,
            email: claims.email,
            display_name: claims.name,
            photo_url: claims.picture,
        }
    }
}

/// Browser session the request belongs to; inserted by [`require_auth`].
///
/// One uid can hold several sessions (devices); tabs of one browser share one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

/// Session of the caller, if any; inserted by [`optional_auth`].
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<SessionUser>);

/// Pull the session token from the cookie or the Authorization header.
fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Decode and validate a session token.
pub fn decode_session(token: &str, signing_key: &[u8]) -> Option<(SessionUser, SessionId)> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).ok()?;
    let claims = token_data.claims;
    if claims.sub.is_empty() || claims.sid.is_empty() {
        return None;
    }
    let session_id = SessionId(claims.sid.clone());
    Some((claims.into(), session_id))
}

/// Resolve the session from request headers, if a valid token is present.
pub fn session_user(
    jar: &CookieJar,
    headers: &HeaderMap,
    signing_key: &[u8],
) -> Option<(SessionUser, SessionId)> {
    session_token(jar, headers).and_then(|token| decode_session(&token, signing_key))
}

/// Middleware that requires valid session authentication.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (user, session_id) =
        session_user(&jar, request.headers(), &state.config.session_signing_key)
            .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(session_id);

    Ok(next.run(request).await)
}

/// Middleware that attaches the session user when present, never rejecting.
pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let user = session_user(&jar, request.headers(), &state.config.session_signing_key)
        .map(|(user, _)| user);
    request.extensions_mut().insert(MaybeUser(user));
    next.run(request).await
}

fn new_session_id() -> anyhow::Result<String> {
    use ring::rand::{SecureRandom, SystemRandom};

    let mut bytes = [0u8; 16];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| anyhow::anyhow!("system RNG failure"))?;
    Ok(hex::encode(bytes))
}

/// Create a JWT for a new user session.
pub fn create_jwt(user: &SessionUser, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user.uid.clone(),
        sid: new_session_id()?,
        email: user.email.clone(),
        name: user.display_name.clone(),
        picture: user.photo_url.clone(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            uid: "uid-123".to_string(),
            email: Some("asha@example.com".to_string()),
            display_name: Some("Asha".to_string()),
            photo_url: None,
        }
    }

    #[test]
    fn session_roundtrip() {
        let key = b"test_session_key_32_bytes_long!!";
        let token = create_jwt(&user(), key).unwrap();
        let (decoded, session_id) = decode_session(&token, key).unwrap();
        assert_eq!(decoded, user());
        assert_eq!(session_id.0.len(), 32);
        assert_eq!(decode_session(&token, b"another_key_that_is_32_bytes!!!!"), None);

        // Every sign-in starts a distinct session.
        let again = create_jwt(&user(), key).unwrap();
        assert_ne!(decode_session(&again, key).unwrap().1, session_id);
    }

    #[test]
    fn label_falls_back_to_email_then_default() {
        let mut u = user();
        assert_eq!(u.label(), "Asha");

        u.display_name = None;
        assert_eq!(u.label(), "asha");

        u.email = None;
        assert_eq!(u.label(), "User");
    }

    #[test]
    fn cookie_takes_precedence_over_header() {
        let key = b"test_session_key_32_bytes_long!!";
        let token = create_jwt(&user(), key).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer garbage".parse().unwrap());
        headers.insert(
            header::COOKIE,
            format!("{SESSION_COOKIE}={token}").parse().unwrap(),
        );
        let jar = CookieJar::from_headers(&headers);

        assert_eq!(session_user(&jar, &headers, key).map(|(u, _)| u), Some(user()));
    }
}
