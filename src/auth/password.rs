// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Salted one-way password hashing (Argon2id, PHC string format).
//!
//! Hashing is CPU-bound. Request handlers use [`hash_in_background`] and
//! [`verify_in_background`], which run it on tokio's blocking pool, and
//! never hold the store lock while waiting on them.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;
use tokio::task::{spawn_blocking, JoinError};

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),
    #[error("password worker failed: {0}")]
    Worker(#[from] JoinError),
}

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_in_background(password: String) -> Result<String, PasswordError> {
    spawn_blocking(move || hash_password(&password)).await?
}

/// Check `password` against `stored_hash` on the blocking pool.
///
/// With no stored hash (unknown account) the password is checked against a
/// throwaway hash so the call costs the same, and the result is `false`.
pub async fn verify_in_background(
    password: String,
    stored_hash: Option<String>,
) -> Result<bool, PasswordError> {
    let verified = spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            if let Some(dummy) = dummy_hash() {
                verify_password(&password, dummy);
            }
            false
        }
    })
    .await?;
    Ok(verified)
}

/// Hash of a random value nobody knows, computed once with the same
/// parameters as real hashes.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| {
            let unknowable = SaltString::generate(&mut OsRng);
            hash_password(unknowable.as_str()).ok()
        })
        .as_deref()
}

/// Compare `password` against a stored PHC hash. An unparseable hash never
/// matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
