// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for per-resource mutations.
//!
//! Route classification only says *someone* is signed in. Endpoints that
//! act on one resource by id additionally run [`guard_owned`], which binds
//! the caller's identity to that specific resource so a valid token cannot
//! be used against somebody else's id.
//!
//! Order of checks:
//!
//! 1. anonymous context → [`OwnershipError::Unauthenticated`], store untouched
//! 2. resource missing → [`OwnershipError::NotFound`]
//! 3. owner differs (ASCII case-insensitive) → [`OwnershipError::NotOwner`]
//! 4. otherwise the loaded resource is handed back for mutation

use thiserror::Error;

use crate::auth::{Identity, SecurityContext};
use crate::store::StoreError;

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Identity (email) of the owning account.
    fn owner_identity(&self) -> &str;
}

#[derive(Debug, Error)]
pub enum OwnershipError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: u64 },
    #[error("{identity} does not own {resource} {id}")]
    NotOwner {
        identity: String,
        resource: &'static str,
        id: u64,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Trait for enforcing ownership on a loaded resource.
pub trait OwnershipEnforcer {
    /// Verify that `identity` owns this resource.
    fn is_owned_by(&self, identity: &Identity) -> bool;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn is_owned_by(&self, identity: &Identity) -> bool {
        identity.matches(self.owner_identity())
    }
}

/// Load resource `id` and confirm the request's identity owns it.
///
/// `load` is only called for an authenticated context. Hold whatever lock
/// `load` reads under until the mutation is written, so the check and the
/// write see the same record.
///
/// # Errors
/// See the module docs for the order in which failures are reported.
pub fn guard_owned<T, F>(
    ctx: &SecurityContext,
    resource: &'static str,
    id: u64,
    load: F,
) -> Result<T, OwnershipError>
where
    T: OwnedResource,
    F: FnOnce() -> Result<Option<T>, StoreError>,
{
    let identity = ctx.identity().ok_or(OwnershipError::Unauthenticated)?;
    let loaded = load()?.ok_or(OwnershipError::NotFound { resource, id })?;

    if !loaded.is_owned_by(identity) {
        return Err(OwnershipError::NotOwner {
            identity: identity.to_string(),
            resource,
            id,
        });
    }
    Ok(loaded)
}
