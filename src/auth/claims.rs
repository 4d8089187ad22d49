// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the identity they carry.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Who a request claims to be: the registered email of an account.
///
/// There are no roles or scopes; an identity is only ever compared against
/// the owner of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Ownership comparison. Emails match regardless of ASCII case.
    pub fn matches(&self, owner: &str) -> bool {
        self.0.eq_ignore_ascii_case(owner)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Claims embedded in (and protected by) a session token.
///
/// Timestamps are Unix seconds, as JWT `NumericDate` requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the identity the token was issued to
    pub sub: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub.clone())
    }

    /// A token is live strictly before its expiry second.
    pub fn is_live_at(&self, now: i64) -> bool {
        now < self.exp
    }
}
