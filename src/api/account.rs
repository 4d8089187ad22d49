// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login. Both routes are public.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::{
    auth::{
        password::{hash_in_background, verify_in_background},
        Identity,
    },
    error::ApiError,
    models::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest},
    state::AppState,
    store::NewUser,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Register a new account.
#[utoipa::path(
    post,
    path = "/register",
    tag = "Accounts",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = MessageResponse),
        (status = 400, description = "Invalid fields or email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let password_hash = hash_in_background(request.password.clone()).await?;
    let user = state.store.write().await.insert_user(NewUser {
        name: request.name,
        surname: request.surname,
        email: request.email,
        password_hash,
        telephone: request.telephone,
        whatsapp: request.whatsapp,
        address: request.address,
    })?;

    tracing::info!(user_id = user.id, "User registered");
    Ok(Json(MessageResponse::new("User registered successfully")))
}

/// Exchange email and password for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed bearer token", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;

    // Copy out what we need so the hash check runs without the lock.
    let candidate = state
        .store
        .read()
        .await
        .user_by_email(&request.email)
        .map(|user| (user.id, user.email.clone(), user.password_hash.clone()));

    // Unknown accounts go through a hash check too, so both failures take
    // the same time.
    let stored_hash = candidate.as_ref().map(|(_, _, hash)| hash.clone());
    let verified = verify_in_background(request.password, stored_hash).await?;

    let Some((user_id, email, _)) = candidate else {
        tracing::info!("Login rejected: unknown account");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };
    if !verified {
        tracing::info!(user_id, "Login rejected: wrong password");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let issued = state.tokens.issue(&Identity::new(email))?;
    tracing::info!(user_id, expires_at = %issued.expires_at, "Token issued");

    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
        expires_at: issued.expires_at,
    }))
}
