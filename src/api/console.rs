// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Developer console. Mounted only with `DEBUG_ROUTES=true`.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ConsoleSummary {
    pub users: usize,
    pub pets: usize,
}

/// Record counts in the store.
#[utoipa::path(
    get,
    path = "/h2-console",
    tag = "Debug",
    responses(
        (status = 200, description = "Store summary", body = ConsoleSummary)
    )
)]
pub async fn summary(State(state): State<AppState>) -> Json<ConsoleSummary> {
    let store = state.store.read().await;
    Json(ConsoleSummary {
        users: store.user_count(),
        pets: store.pet_count(),
    })
}
