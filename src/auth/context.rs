// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request security context.
//!
//! A [`SecurityContext`] is allocated by the authentication middleware for
//! every request and travels in that request's extensions. It is never
//! stored anywhere that outlives the request, so a reused worker thread
//! cannot observe a previous caller's identity.

use thiserror::Error;

use super::claims::Identity;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("security context already holds an identity")]
pub struct AlreadyAuthenticated;

/// Holder of the authenticated identity for one request, or anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    identity: Option<Identity>,
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Record the authenticated identity. Allowed once per request.
    ///
    /// # Errors
    /// [`AlreadyAuthenticated`] if an identity was set before; the existing
    /// identity is left untouched.
    pub fn set(&mut self, identity: Identity) -> Result<(), AlreadyAuthenticated> {
        if self.identity.is_some() {
            return Err(AlreadyAuthenticated);
        }
        self.identity = Some(identity);
        Ok(())
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
