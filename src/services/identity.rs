// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity bridge: ID token in, local user out.
//!
//! Exchanges the opaque bearer token from the Authorization header for a
//! local user record, creating the record on first sign-in. Every failure
//! mode (missing/expired/forged token, JWKS outage, database error) resolves
//! to an anonymous request rather than a request failure; mutations that
//! need a user reject later with UNAUTHENTICATED.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::User;
use crate::services::google_oidc::{GoogleOidcVerifier, VerifiedIdentity};
use std::sync::Arc;

/// Resolves bearer tokens to local users.
#[derive(Clone)]
pub struct IdentityService {
    verifier: Arc<GoogleOidcVerifier>,
    db: FirestoreDb,
}

impl IdentityService {
    pub fn new(verifier: Arc<GoogleOidcVerifier>, db: FirestoreDb) -> Self {
        Self { verifier, db }
    }

    /// Resolve an Authorization header value to a local user.
    ///
    /// Accepts the raw ID token or a `Bearer `-prefixed one. Returns `None`
    /// for anonymous requests and for every failure mode.
    pub async fn resolve_header(&self, auth_header: Option<&str>) -> Option<User> {
        let token = match auth_header.map(extract_id_token) {
            Some(token) if !token.is_empty() => token,
            _ => {
                tracing::debug!("No bearer token; anonymous request");
                return None;
            }
        };

        let identity = match self.verifier.verify_id_token(token).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "ID token verification failed; continuing anonymously");
                return None;
            }
        };

        match self.find_or_create_user(identity).await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "User lookup failed; continuing anonymously");
                None
            }
        }
    }

    /// Find the user for a verified identity, creating the record on first
    /// sign-in.
    async fn find_or_create_user(&self, identity: VerifiedIdentity) -> Result<User, AppError> {
        if let Some(user) = self.db.get_user(&identity.subject).await? {
            return Ok(user);
        }

        let user = User {
            id: identity.subject,
            name: identity.name.unwrap_or_else(|| "Unknown".to_string()),
            email: identity.email,
            picture: identity.picture,
            created_at: chrono::Utc::now(),
        };

        self.db.upsert_user(&user).await?;

        tracing::info!(subject = %user.id, "Created user on first sign-in");

        Ok(user)
    }
}

/// Strip an optional `Bearer ` prefix from an Authorization header value.
fn extract_id_token(header: &str) -> &str {
    header.strip_prefix("Bearer ").unwrap_or(header).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_id_token_handles_both_forms() {
        assert_eq!(extract_id_token("abc.def.ghi"), "abc.def.ghi");
        assert_eq!(extract_id_token("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(extract_id_token("Bearer "), "");
        assert_eq!(extract_id_token(""), "");
    }
}
