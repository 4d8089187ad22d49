// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.
//!
//! `/user/{id}` routes are owner-only: the ownership guard runs before the
//! request body is looked at, so a caller acting on another account's id
//! gets `403` whatever they send.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::{
    auth::{password::hash_in_background, Auth, SecurityContext},
    error::ApiError,
    models::{UpdateUserRequest, UserId, UserResponse, UserWithPetsResponse},
    state::AppState,
    storage::guard_owned,
};

/// Get a user and their pets.
#[utoipa::path(
    get,
    path = "/user/{id}",
    tag = "Users",
    params(("id" = u64, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User with pets", body = UserWithPetsResponse),
        (status = 403, description = "Missing token or not the owner"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    ctx: SecurityContext,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<UserWithPetsResponse>, ApiError> {
    let Path(id) = path?;
    let store = state.store.read().await;
    let user = guard_owned(&ctx, "user", id, || Ok(store.user(id).cloned()))?;

    Ok(Json(UserWithPetsResponse {
        pets: store.pets_of(id),
        user: user.into(),
    }))
}

/// Update the caller's own account.
///
/// Absent fields stay as they are. An empty `password` leaves the password
/// unchanged.
#[utoipa::path(
    put,
    path = "/user/{id}",
    tag = "Users",
    params(("id" = u64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid fields or email already registered"),
        (status = 403, description = "Missing token or not the owner"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    ctx: SecurityContext,
    path: Result<Path<UserId>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Path(id) = path?;
    {
        let store = state.store.read().await;
        guard_owned(&ctx, "user", id, || Ok(store.user(id).cloned()))?;
    }

    let Json(request) = payload?;
    request.validate()?;
    let password_hash = match request.new_password() {
        Some(password) => Some(hash_in_background(password.to_string()).await?),
        None => None,
    };

    // The record may have changed while hashing; check again under the
    // lock that covers the write.
    let mut store = state.store.write().await;
    guard_owned(&ctx, "user", id, || Ok(store.user(id).cloned()))?;
    let updated = store.update_user(id, |user| request.apply(user, password_hash))?;
    tracing::info!(user_id = id, "User updated");
    Ok(Json(updated.into()))
}

/// The caller's own account.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user with pets", body = UserWithPetsResponse),
        (status = 403, description = "Missing or invalid token"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn current_user(
    State(state): State<AppState>,
    Auth(identity): Auth,
) -> Result<Json<UserWithPetsResponse>, ApiError> {
    let store = state.store.read().await;
    let user = store
        .user_by_email(identity.as_str())
        .cloned()
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserWithPetsResponse {
        pets: store.pets_of(user.id),
        user: user.into(),
    }))
}
