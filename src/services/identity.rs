// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase ID token verification for Google sign-in.
//!
//! The browser signs in with the identity provider's popup and posts the
//! resulting ID token here. Tokens are RS256 JWTs signed with Google's
//! `securetoken` keys; the key set is cached for as long as its
//! `Cache-Control: max-age` allows.

use anyhow::Context;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

const JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// Identity asserted by a valid ID token.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
    /// Whether the provider vouches for `email`; `None` when it does not say.
    pub email_verified: Option<bool>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Verification error categories.
#[derive(Debug, Clone)]
pub enum IdentityError {
    /// The token is missing/invalid or claims do not match expectations.
    Rejected(String),
    /// Fetching signing keys failed; the user may retry.
    Transient(String),
}

#[derive(Clone)]
enum VerifierMode {
    Google,
    StaticKey {
        kid: String,
        algorithm: Algorithm,
        decoding_key: Arc<DecodingKey>,
    },
}

#[derive(Clone)]
struct JwksCacheEntry {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

/// Verifier for identity-provider ID tokens.
pub struct IdentityVerifier {
    http_client: reqwest::Client,
    project_id: String,
    mode: VerifierMode,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl IdentityVerifier {
    /// Create a production verifier that fetches and caches Google's keys.
    pub fn new(project_id: &str) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building identity HTTP client")?;

        tracing::info!(project = %project_id, "Initialized ID token verifier");

        Ok(Self {
            http_client,
            project_id: project_id.to_string(),
            mode: VerifierMode::Google,
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Create a verifier with a single static key.
    ///
    /// This is intended for deterministic local/integration tests.
    pub fn new_with_static_key(
        project_id: &str,
        kid: impl Into<String>,
        algorithm: Algorithm,
        decoding_key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static key kid must not be empty");
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building identity HTTP client")?;

        Ok(Self {
            http_client,
            project_id: project_id.to_string(),
            mode: VerifierMode::StaticKey {
                kid,
                algorithm,
                decoding_key: Arc::new(decoding_key),
            },
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    /// Verify an ID token and return the identity it asserts.
    pub async fn verify_id_token(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(IdentityError::Rejected("ID token is empty".to_string()));
        }

        let header = decode_header(token)
            .map_err(|e| IdentityError::Rejected(format!("invalid JWT header: {e}")))?;

        let expected_alg = match &self.mode {
            VerifierMode::Google => Algorithm::RS256,
            VerifierMode::StaticKey { algorithm, .. } => *algorithm,
        };
        if header.alg != expected_alg {
            return Err(IdentityError::Rejected(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| IdentityError::Rejected("missing JWT kid".to_string()))?;

        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let issuer = self.issuer();
        let mut validation = Validation::new(expected_alg);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        let token_data = decode::<IdTokenClaims>(token, decoding_key.as_ref(), &validation)
            .map_err(|e| IdentityError::Rejected(format!("JWT validation failed: {e}")))?;

        let claims = token_data.claims;

        validate_iat(claims.iat)?;

        if claims.sub.trim().is_empty() {
            return Err(IdentityError::Rejected("empty sub claim".to_string()));
        }

        // The email is contact data, never identity; keep it either way.
        if claims.email.is_some() && claims.email_verified == Some(false) {
            tracing::info!(uid = %claims.sub, "ID token carries an unverified email");
        }

        tracing::debug!(
            uid = %claims.sub,
            has_email = claims.email.is_some(),
            "ID token verified"
        );

        Ok(VerifiedIdentity {
            uid: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified,
            display_name: claims.name.filter(|n| !n.trim().is_empty()),
            photo_url: claims.picture,
        })
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, IdentityError> {
        match &self.mode {
            VerifierMode::StaticKey {
                kid: static_kid,
                decoding_key,
                ..
            } => {
                if kid == static_kid {
                    return Ok(decoding_key.clone());
                }

                return Err(IdentityError::Rejected(format!(
                    "unknown JWT kid for static verifier: {kid}"
                )));
            }
            VerifierMode::Google => {}
        }

        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        for force_refresh in [false, true] {
            self.refresh_jwks(force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(IdentityError::Rejected(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, force_refresh: bool) -> Result<(), IdentityError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if cache
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
            {
                return Ok(());
            }
        }

        tracing::debug!(jwks_uri = JWKS_URL, "Refreshing identity JWKS cache");

        let response = self
            .http_client
            .get(JWKS_URL)
            .send()
            .await
            .map_err(|e| IdentityError::Transient(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(IdentityError::Transient(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| IdentityError::Transient(format!("invalid JWKS JSON: {e}")))?;

        let keys_by_kid = usable_keys(jwks);

        if keys_by_kid.is_empty() {
            return Err(IdentityError::Transient(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        *self.jwks_cache.write().await = Some(JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "Identity JWKS cache refreshed");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    iat: Option<usize>,
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

fn usable_keys(jwks: Jwks) -> HashMap<String, Arc<DecodingKey>> {
    let mut keys_by_kid = HashMap::new();

    for jwk in jwks.keys {
        if jwk.kty != "RSA" || jwk.kid.trim().is_empty() {
            continue;
        }

        if jwk.alg.as_deref().is_some_and(|alg| alg != "RS256") {
            continue;
        }

        if jwk.use_.as_deref().is_some_and(|use_| use_ != "sig") {
            continue;
        }

        match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
            Ok(key) => {
                keys_by_kid.insert(jwk.kid, Arc::new(key));
            }
            Err(e) => {
                tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
            }
        }
    }

    keys_by_kid
}

fn validate_iat(iat: Option<usize>) -> Result<(), IdentityError> {
    let now = now_unix_secs();

    let Some(iat) = iat else {
        return Err(IdentityError::Rejected("missing iat claim".to_string()));
    };

    if iat as u64 > now + CLOCK_SKEW_SECS {
        return Err(IdentityError::Rejected(
            "iat claim is in the future".to_string(),
        ));
    }

    Ok(())
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    value.split(',').find_map(|directive| {
        directive
            .trim()
            .strip_prefix("max-age=")
            .and_then(|raw| raw.trim_matches('"').parse::<u64>().ok())
    })
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cache_control_max_age_valid() {
        assert_eq!(
            parse_cache_control_max_age("public, max-age=19842, must-revalidate, no-transform"),
            Some(19842)
        );
        assert_eq!(parse_cache_control_max_age("max-age=60"), Some(60));
        assert_eq!(parse_cache_control_max_age("max-age=\"120\""), Some(120));
    }

    #[test]
    fn parse_cache_control_max_age_invalid() {
        assert_eq!(parse_cache_control_max_age("public, immutable"), None);
        assert_eq!(parse_cache_control_max_age("max-age=abc"), None);
        assert_eq!(parse_cache_control_max_age(""), None);
    }

    #[test]
    fn usable_keys_filters_non_signing_keys() {
        let jwks: Jwks = serde_json::from_value(serde_json::json!({
            "keys": [
                { "kid": "ec", "kty": "EC", "n": "AQAB", "e": "AQAB" },
                { "kid": "enc", "kty": "RSA", "use": "enc", "n": "AQAB", "e": "AQAB" },
                { "kid": "ps", "kty": "RSA", "alg": "PS256", "n": "AQAB", "e": "AQAB" },
                { "kid": "", "kty": "RSA", "n": "AQAB", "e": "AQAB" },
                { "kid": "ok", "kty": "RSA", "alg": "RS256", "use": "sig", "n": "AQAB", "e": "AQAB" }
            ]
        }))
        .unwrap();

        let keys = usable_keys(jwks);
        assert_eq!(keys.len(), 1);
        assert!(keys.contains_key("ok"));
    }

    #[test]
    fn validate_iat_rejects_future_and_missing() {
        assert!(validate_iat(None).is_err());
        assert!(validate_iat(Some((now_unix_secs() + 3600) as usize)).is_err());
        assert!(validate_iat(Some(now_unix_secs() as usize)).is_ok());
    }
}
