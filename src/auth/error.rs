// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! Every variant surfaces as `403 Forbidden`. The specific reason a token
//! was rejected is kept on the error for logging and is never written to the
//! response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Why a token failed verification. Internal only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenRejection {
    /// Not three base64url segments, bad JSON, or unexpected claim shapes
    #[error("malformed token")]
    Malformed,
    /// Signature does not match the recomputed HMAC, or the algorithm is not HS256
    #[error("signature mismatch")]
    BadSignature,
    /// `now >= exp`
    #[error("token expired")]
    Expired,
    /// A required registered claim (`sub`, `exp`) is absent
    #[error("missing required claim")]
    MissingClaims,
}

/// Authentication error type.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token presented but failed verification
    #[error("invalid token: {0}")]
    InvalidToken(TokenRejection),
    /// No identity where one is required
    #[error("authentication required")]
    Forbidden,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::Forbidden => "forbidden",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::FORBIDDEN
    }

    /// Message safe to return to a caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidToken(_) => "Invalid or expired authentication token",
            AuthError::Forbidden => "Access denied",
        }
    }

    /// The underlying token rejection, if any.
    pub fn rejection(&self) -> Option<TokenRejection> {
        match self {
            AuthError::InvalidToken(reason) => Some(*reason),
            AuthError::Forbidden => None,
        }
    }
}

impl From<TokenRejection> for AuthError {
    fn from(reason: TokenRejection) -> Self {
        AuthError::InvalidToken(reason)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.public_message().to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
