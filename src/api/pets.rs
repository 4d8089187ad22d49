// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pet endpoints, nested under the owning user.
//!
//! Ownership is checked on the user in the path. A pet id that exists but
//! belongs to a different user is reported as not found.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};

use crate::{
    auth::SecurityContext,
    error::ApiError,
    models::{CreatePetRequest, Pet, PetId, UpdatePetRequest, UserId},
    state::AppState,
    storage::guard_owned,
    store::InMemoryStore,
};

/// The pet only if it belongs to `owner_id`.
fn owned_pet(store: &InMemoryStore, owner_id: UserId, pet_id: PetId) -> Result<&Pet, ApiError> {
    store
        .pet(pet_id)
        .filter(|pet| pet.owner_id == owner_id)
        .ok_or_else(|| ApiError::not_found("Pet not found"))
}

/// Add a pet to the caller's account.
#[utoipa::path(
    post,
    path = "/user/{id}/pets",
    tag = "Pets",
    params(("id" = u64, Path, description = "Owner user id")),
    request_body = CreatePetRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Pet created", body = Pet),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Missing token or not the owner"),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_pet(
    State(state): State<AppState>,
    ctx: SecurityContext,
    path: Result<Path<UserId>, PathRejection>,
    payload: Result<Json<CreatePetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Pet>), ApiError> {
    let Path(id) = path?;
    let mut store = state.store.write().await;
    guard_owned(&ctx, "user", id, || Ok(store.user(id).cloned()))?;

    let Json(request) = payload?;
    request.validate()?;

    let pet = store.insert_pet(id, request)?;
    tracing::info!(user_id = id, pet_id = pet.id, "Pet created");
    Ok((StatusCode::CREATED, Json(pet)))
}

/// Update one of the caller's pets. Absent fields are unchanged.
#[utoipa::path(
    put,
    path = "/user/{id}/pets/{pet_id}",
    tag = "Pets",
    params(
        ("id" = u64, Path, description = "Owner user id"),
        ("pet_id" = u64, Path, description = "Pet id")
    ),
    request_body = UpdatePetRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated pet", body = Pet),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Missing token or not the owner"),
        (status = 404, description = "User or pet not found")
    )
)]
pub async fn update_pet(
    State(state): State<AppState>,
    ctx: SecurityContext,
    path: Result<Path<(UserId, PetId)>, PathRejection>,
    payload: Result<Json<UpdatePetRequest>, JsonRejection>,
) -> Result<Json<Pet>, ApiError> {
    let Path((id, pet_id)) = path?;
    let mut store = state.store.write().await;
    guard_owned(&ctx, "user", id, || Ok(store.user(id).cloned()))?;
    owned_pet(&store, id, pet_id)?;

    let Json(request) = payload?;
    request.validate()?;

    let pet = store.update_pet(pet_id, |pet| request.apply(pet))?;
    tracing::info!(user_id = id, pet_id, "Pet updated");
    Ok(Json(pet))
}

/// Remove one of the caller's pets.
#[utoipa::path(
    delete,
    path = "/user/{id}/pets/{pet_id}",
    tag = "Pets",
    params(
        ("id" = u64, Path, description = "Owner user id"),
        ("pet_id" = u64, Path, description = "Pet id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Pet deleted"),
        (status = 403, description = "Missing token or not the owner"),
        (status = 404, description = "User or pet not found")
    )
)]
pub async fn delete_pet(
    State(state): State<AppState>,
    ctx: SecurityContext,
    path: Result<Path<(UserId, PetId)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((id, pet_id)) = path?;
    let mut store = state.store.write().await;
    guard_owned(&ctx, "user", id, || Ok(store.user(id).cloned()))?;
    owned_pet(&store, id, pet_id)?;

    store.delete_pet(pet_id)?;
    tracing::info!(user_id = id, pet_id, "Pet deleted");
    Ok(StatusCode::NO_CONTENT)
}
