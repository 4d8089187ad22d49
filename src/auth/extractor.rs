// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the request's security context.
//!
//! Both read what [`authenticate`](super::middleware::authenticate) left in
//! the request extensions; neither re-verifies the token.
//!
//! ```rust,ignore
//! async fn me(Auth(identity): Auth) -> impl IntoResponse { /* ... */ }
//! async fn update(ctx: SecurityContext, /* ... */) -> impl IntoResponse { /* ... */ }
//! ```

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, Identity, SecurityContext};

/// The request's security context, anonymous if none was attached.
impl<S> FromRequestParts<S> for SecurityContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Extractor that requires an authenticated identity.
///
/// Rejects with `403` when the context is anonymous.
pub struct Auth(pub Identity);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(ctx) = SecurityContext::from_request_parts(parts, state).await;
        ctx.identity().cloned().map(Auth).ok_or(AuthError::Forbidden)
    }
}
