// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and route-authorization middleware for Axum.
//!
//! Two layers run in front of every handler, in this order:
//!
//! 1. [`authenticate`] reads `Authorization: Bearer <token>`, verifies it and
//!    inserts a fresh [`SecurityContext`] into the request extensions. A
//!    request without a bearer header continues anonymously; a request with
//!    a bad token stops here with `403`.
//! 2. [`authorize`] applies the [`RoutePolicy`](super::RoutePolicy): an
//!    anonymous request for a protected route stops here with `403`.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/user/{id}", put(update_user))
//!     .layer(from_fn_with_state(state.clone(), authorize))
//!     .layer(from_fn_with_state(state.clone(), authenticate))
//!     .with_state(state);
//! ```

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthError, SecurityContext};
use crate::state::AppState;

/// Exact, case-sensitive scheme prefix.
pub const BEARER_PREFIX: &str = "Bearer ";

/// The token following `"Bearer "`, if the header is present and well formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

/// Per-request authenticator.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut ctx = SecurityContext::anonymous();

    if let Some(token) = bearer_token(request.headers()) {
        match state.tokens.verify(token) {
            Ok(claims) => {
                let identity = claims.identity();
                tracing::debug!(identity = %identity, "Bearer token accepted");
                if let Err(e) = ctx.set(identity) {
                    tracing::error!(error = %e, "Security context set twice");
                    return AuthError::Forbidden.into_response();
                }
            }
            Err(e) => {
                tracing::warn!(
                    reason = ?e.rejection(),
                    path = %request.uri().path(),
                    "Rejected bearer token"
                );
                return e.into_response();
            }
        }
    }

    // Replaces any context a caller could have smuggled in upstream.
    request.extensions_mut().insert(ctx);
    next.run(request).await
}

/// Route-classification gate. Must run after [`authenticate`].
pub async fn authorize(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let ctx = request
        .extensions()
        .get::<SecurityContext>()
        .cloned()
        .unwrap_or_default();

    if let Err(e) = state.policy.check(request.uri().path(), &ctx) {
        tracing::debug!(
            path = %request.uri().path(),
            method = %request.method(),
            "Anonymous request to protected route"
        );
        return e.into_response();
    }

    next.run(request).await
}
