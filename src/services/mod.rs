// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod google_oidc;
pub mod identity;

pub use google_oidc::{GoogleOidcVerifier, OidcError, VerifiedIdentity};
pub use identity::IdentityService;
