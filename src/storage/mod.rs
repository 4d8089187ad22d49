// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resource-level access control over the store.

pub mod ownership;

pub use ownership::{guard_owned, OwnedResource, OwnershipEnforcer, OwnershipError};
