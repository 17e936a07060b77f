// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Verification of Google sign-in ID tokens.
//!
//! The browser hands us the ID token it got from Google sign-in; everything
//! hinges on checking that token properly: RS256 signature against Google's
//! published signing keys, audience equal to our OAuth client ID, one of the
//! two issuer spellings, and sane timestamps. Signing keys are fetched from
//! the JWKS endpoint (located via OIDC discovery) and cached for the
//! Cache-Control lifetime of the response, so steady-state verification
//! costs no network round trips.

use crate::config::Config;
use anyhow::Context;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::{HeaderMap, CACHE_CONTROL};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

const DISCOVERY_URL: &str = "https://accounts.google.com/.well-known/openid-configuration";
/// Google's documented JWKS location, used when discovery is unreachable.
const FALLBACK_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const FALLBACK_TTL: Duration = Duration::from_secs(300);
const MIN_TTL: Duration = Duration::from_secs(60);
const MAX_TTL: Duration = Duration::from_secs(86_400);
const CLOCK_SKEW_SECS: u64 = 60;

/// The signed-in person described by a valid ID token.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Google subject claim; the stable per-user key
    pub subject: String,
    /// Display name, if the token carries one
    pub name: Option<String>,
    pub email: Option<String>,
    /// Profile picture URL
    pub picture: Option<String>,
}

/// Why a token could not be verified.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OidcError {
    /// The token itself is bad: malformed, forged, expired, or minted for
    /// someone else.
    #[error("token rejected: {0}")]
    Rejected(String),
    /// We could not get what we need to judge the token (JWKS outage etc.).
    #[error("verification unavailable: {0}")]
    Unavailable(String),
}

#[derive(Clone)]
enum VerifierMode {
    /// Fetch and cache Google's published signing keys.
    Google,
    /// Trust exactly one pinned key; used by the test suites.
    StaticKey { kid: String, key: Arc<DecodingKey> },
}

/// One fetched generation of Google's signing keys.
struct KeySet {
    by_kid: HashMap<String, Arc<DecodingKey>>,
    fresh_until: Instant,
}

impl KeySet {
    /// A set that is already stale, forcing a fetch on first use.
    fn empty() -> Self {
        Self {
            by_kid: HashMap::new(),
            fresh_until: Instant::now(),
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() < self.fresh_until
    }

    /// Look up a key, treating a stale set as having none.
    fn get(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        if !self.is_fresh() {
            return None;
        }
        self.by_kid.get(kid).cloned()
    }

    fn from_document(doc: JwksDocument, ttl: Duration) -> Self {
        let mut by_kid = HashMap::new();
        for jwk in doc.keys {
            if !jwk.usable_for_rs256() {
                continue;
            }
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    by_kid.insert(jwk.kid, Arc::new(key));
                }
                Err(e) => {
                    tracing::warn!(error = %e, kid = %jwk.kid, "Ignoring malformed JWKS key");
                }
            }
        }
        Self {
            by_kid,
            fresh_until: Instant::now() + ttl,
        }
    }
}

struct DiscoveredUri {
    uri: String,
    fresh_until: Instant,
}

/// Verifier for Google sign-in ID tokens.
///
/// Clone-free; share it behind an `Arc`.
pub struct GoogleOidcVerifier {
    http: reqwest::Client,
    /// Audience, issuer, expiry and algorithm checks, fixed at construction.
    validation: Validation,
    mode: VerifierMode,
    discovered: RwLock<Option<DiscoveredUri>>,
    keys: RwLock<KeySet>,
    /// Serializes key reloads so a kid miss fans out to one fetch.
    refresh_gate: Mutex<()>,
}

impl GoogleOidcVerifier {
    /// Production verifier backed by Google's live JWKS.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let verifier = Self::with_mode(config, VerifierMode::Google)?;
        tracing::info!(
            audience = %config.google_client_id,
            "Google sign-in verifier ready"
        );
        Ok(verifier)
    }

    /// Verifier pinned to a single RSA public key, for deterministic tests.
    pub fn new_with_static_key(
        config: &Config,
        kid: impl Into<String>,
        key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static verifier kid must not be empty");
        }
        Self::with_mode(
            config,
            VerifierMode::StaticKey {
                kid,
                key: Arc::new(key),
            },
        )
    }

    fn with_mode(config: &Config, mode: VerifierMode) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed building OIDC HTTP client")?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[config.google_client_id.as_str()]);
        // Google mints tokens under both issuer spellings.
        validation.set_issuer(&["https://accounts.google.com", "accounts.google.com"]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = CLOCK_SKEW_SECS;

        Ok(Self {
            http,
            validation,
            mode,
            discovered: RwLock::new(None),
            keys: RwLock::new(KeySet::empty()),
            refresh_gate: Mutex::new(()),
        })
    }

    /// Verify an ID token and extract the identity it attests to.
    pub async fn verify_id_token(&self, token: &str) -> Result<VerifiedIdentity, OidcError> {
        if token.is_empty() {
            return Err(OidcError::Rejected("empty ID token".to_string()));
        }

        let header = decode_header(token)
            .map_err(|e| OidcError::Rejected(format!("malformed JWT header: {e}")))?;
        let kid = header
            .kid
            .ok_or_else(|| OidcError::Rejected("ID token has no kid".to_string()))?;

        let key = self.key_for(&kid).await?;

        // decode() enforces signature, algorithm, audience, issuer and expiry
        // per the Validation built at construction.
        let data = decode::<IdTokenClaims>(token, key.as_ref(), &self.validation)
            .map_err(|e| OidcError::Rejected(format!("ID token failed validation: {e}")))?;
        let claims = data.claims;

        reject_future_iat(claims.iat)?;

        tracing::debug!(
            subject = %claims.sub,
            issuer = %claims.iss,
            audience = %claims.aud,
            email = claims.email.as_deref().unwrap_or("<none>"),
            email_verified = ?claims.email_verified,
            exp = claims.exp,
            "Verified Google ID token"
        );

        Ok(VerifiedIdentity {
            subject: claims.sub,
            name: claims.name,
            email: claims.email,
            picture: claims.picture,
        })
    }

    /// Resolve a kid to a decoding key, reloading the key set on a miss.
    ///
    /// A miss against a fresh set still reloads once: Google rotates keys
    /// and a just-minted token may reference a kid we have not seen.
    async fn key_for(&self, kid: &str) -> Result<Arc<DecodingKey>, OidcError> {
        if let VerifierMode::StaticKey { kid: pinned, key } = &self.mode {
            if kid == pinned {
                return Ok(key.clone());
            }
            return Err(OidcError::Rejected(format!(
                "kid {kid} does not match the pinned test key"
            )));
        }

        if let Some(key) = self.keys.read().await.get(kid) {
            return Ok(key);
        }

        let _flight = self.refresh_gate.lock().await;
        // Another request may have reloaded while we waited for the gate.
        if let Some(key) = self.keys.read().await.get(kid) {
            return Ok(key);
        }

        self.reload_keys().await?;
        self.keys.read().await.get(kid).ok_or_else(|| {
            OidcError::Rejected(format!("no Google signing key matches kid {kid}"))
        })
    }

    async fn reload_keys(&self) -> Result<(), OidcError> {
        let uri = self.jwks_uri().await;

        let response = self
            .http
            .get(&uri)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| OidcError::Unavailable(format!("JWKS fetch failed: {e}")))?;

        let ttl = response_ttl(response.headers());
        let doc: JwksDocument = response
            .json()
            .await
            .map_err(|e| OidcError::Unavailable(format!("JWKS body unreadable: {e}")))?;

        let set = KeySet::from_document(doc, ttl);
        if set.by_kid.is_empty() {
            return Err(OidcError::Unavailable(
                "JWKS held no usable RSA signing keys".to_string(),
            ));
        }

        tracing::debug!(
            keys = set.by_kid.len(),
            ttl_secs = ttl.as_secs(),
            "Reloaded Google signing keys"
        );
        *self.keys.write().await = set;
        Ok(())
    }

    /// The JWKS endpoint, via cached OIDC discovery with a constant fallback.
    async fn jwks_uri(&self) -> String {
        if let Some(d) = self.discovered.read().await.as_ref() {
            if Instant::now() < d.fresh_until {
                return d.uri.clone();
            }
        }

        match self.discover().await {
            Ok(uri) => uri,
            Err(e) => {
                tracing::debug!(error = %e, "OIDC discovery unavailable; using published JWKS URL");
                FALLBACK_JWKS_URL.to_string()
            }
        }
    }

    async fn discover(&self) -> Result<String, OidcError> {
        let response = self
            .http
            .get(DISCOVERY_URL)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| OidcError::Unavailable(format!("discovery fetch failed: {e}")))?;

        let ttl = response_ttl(response.headers());
        let doc: DiscoveryDocument = response
            .json()
            .await
            .map_err(|e| OidcError::Unavailable(format!("discovery body unreadable: {e}")))?;

        *self.discovered.write().await = Some(DiscoveredUri {
            uri: doc.jwks_uri.clone(),
            fresh_until: Instant::now() + ttl,
        });

        Ok(doc.jwks_uri)
    }
}

#[derive(Debug, Deserialize)]
struct DiscoveryDocument {
    jwks_uri: String,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<JsonWebKey>,
}

#[derive(Debug, Deserialize)]
struct JsonWebKey {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

impl JsonWebKey {
    /// RS256 signature keys are the only kind Google publishes for ID tokens;
    /// skip anything else rather than choke on it.
    fn usable_for_rs256(&self) -> bool {
        self.kty == "RSA"
            && !self.kid.trim().is_empty()
            && self.alg.as_deref().is_none_or(|a| a == "RS256")
            && self.use_.as_deref().is_none_or(|u| u == "sig")
    }
}

/// Claims we read off a Google ID token. Profile claims are optional; the
/// token is still valid without them.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    iss: String,
    aud: String,
    sub: String,
    exp: i64,
    iat: Option<i64>,
    name: Option<String>,
    email: Option<String>,
    email_verified: Option<bool>,
    picture: Option<String>,
}

/// An issued-at in the future (beyond clock skew) means a bad clock or a
/// forged token; neither should sign in.
fn reject_future_iat(iat: Option<i64>) -> Result<(), OidcError> {
    let Some(iat) = iat else {
        return Err(OidcError::Rejected("ID token has no iat claim".to_string()));
    };
    if iat > unix_now() as i64 + CLOCK_SKEW_SECS as i64 {
        return Err(OidcError::Rejected(
            "ID token iat is in the future".to_string(),
        ));
    }
    Ok(())
}

/// Cache lifetime for a JWKS or discovery response: the Cache-Control
/// max-age clamped to sane bounds, or a fixed fallback.
fn response_ttl(headers: &HeaderMap) -> Duration {
    headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(max_age_secs)
        .map(|secs| Duration::from_secs(secs).clamp(MIN_TTL, MAX_TTL))
        .unwrap_or(FALLBACK_TTL)
}

fn max_age_secs(cache_control: &str) -> Option<u64> {
    cache_control
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|value| value.trim_matches('"').parse().ok())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
