// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::middleware::{authenticate, authorize},
    error::ApiError,
    models::{
        CreatePetRequest, LoginRequest, LoginResponse, MessageResponse, Pet, RegisterRequest,
        UpdatePetRequest, UpdateUserRequest, UserResponse, UserWithPetsResponse,
    },
    state::AppState,
};

pub mod account;
pub mod console;
pub mod health;
pub mod pets;
pub mod users;

pub fn router(state: AppState) -> Router {
    let mut routes = Router::new()
        .route("/register", post(account::register))
        .route("/login", post(account::login))
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/users/me", get(users::current_user))
        .route("/user/{id}", get(users::get_user).put(users::update_user))
        .route("/user/{id}/pets", post(pets::create_pet))
        .route(
            "/user/{id}/pets/{pet_id}",
            put(pets::update_pet).delete(pets::delete_pet),
        );

    if state.debug_routes {
        tracing::warn!("Debug routes enabled: /h2-console and /docs are public");
        routes = routes
            .route("/h2-console", get(console::summary))
            .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));
    }

    routes
        .fallback(not_found)
        // Runs after `authenticate`; layers listed later wrap earlier ones.
        .layer(from_fn_with_state(state.clone(), authorize))
        .layer(from_fn_with_state(state.clone(), authenticate))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        account::register,
        account::login,
        users::get_user,
        users::update_user,
        users::current_user,
        pets::create_pet,
        pets::update_pet,
        pets::delete_pet,
        health::liveness,
        health::readiness,
        console::summary
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            MessageResponse,
            UpdateUserRequest,
            UserResponse,
            UserWithPetsResponse,
            CreatePetRequest,
            UpdatePetRequest,
            Pet,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks,
            console::ConsoleSummary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Accounts", description = "Registration and login"),
        (name = "Users", description = "Account records"),
        (name = "Pets", description = "Pet records owned by an account"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Debug", description = "Developer console")
    )
)]
pub struct ApiDoc;

/// Declares the `bearer_auth` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
