// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless bearer-token authentication for the Pet Registry API.
//!
//! ## Auth Flow
//!
//! 1. `POST /login` checks email + password against the user store
//! 2. [`TokenCodec`] issues an HS256 token `{sub: email, iat, exp}`
//! 3. Client sends `Authorization: Bearer <token>` on later requests
//! 4. [`middleware::authenticate`] verifies it and attaches a per-request
//!    [`SecurityContext`]
//! 5. [`middleware::authorize`] rejects anonymous requests to protected
//!    routes per the [`RoutePolicy`]
//! 6. Per-resource mutations additionally pass the ownership guard in
//!    [`crate::storage::ownership`]
//!
//! ## Security
//!
//! - Tokens are never stored; revocation is not supported
//! - Any verification failure is `403` with a generic body; the reason is
//!   only logged
//! - No clock-skew leeway

pub mod claims;
pub mod context;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod token;

pub use claims::{Claims, Identity};
pub use context::SecurityContext;
pub use error::{AuthError, TokenRejection};
pub use extractor::Auth;
pub use policy::{RouteClassification, RoutePolicy};
pub use token::{IssuedToken, TokenCodec, TokenError};
