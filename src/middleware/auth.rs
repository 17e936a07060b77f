// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity resolution middleware.
//!
//! Resolves the Authorization header once per request and stashes the
//! result as a `CurrentUser` extension. Requests without a usable token
//! continue anonymously; mutations reject later at the resolver level.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// The user resolved from the request's bearer token, if any.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<crate::models::User>);

/// Middleware that resolves the bearer token to a local user.
///
/// Never rejects a request; a failed resolution yields `CurrentUser(None)`.
pub async fn resolve_identity(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    let user = state.identity.resolve_header(auth_header.as_deref()).await;

    request.extensions_mut().insert(CurrentUser(user));

    next.run(request).await
}
