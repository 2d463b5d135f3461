// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use tower::Layer;
use tower_http::{
    cors::CorsLayer,
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    api::health::{HealthChecks, HealthResponse},
    auth::require_authentication,
    models::{StatusResponse, UserResponse},
    state::AppState,
};

pub mod health;
pub mod status;
pub mod users;

/// The routed application.
///
/// Trailing slashes are trimmed before routing, so `/api/v1/status/` reaches
/// the same handler (and the same exemption) as `/api/v1/status`.
pub type App = NormalizePath<Router>;

pub fn router(state: AppState) -> App {
    let v1_routes = Router::new()
        .route("/status", get(status::status))
        .route("/unauthorized", get(status::unauthorized))
        .route("/forbidden", get(status::forbidden))
        .route("/users/me", get(users::get_current_user));

    let app = Router::new()
        .nest("/api/v1", v1_routes)
        .route("/health", get(health::health))
        .route("/api-doc/openapi.json", get(openapi_json))
        .layer(from_fn_with_state(state.clone(), require_authentication))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    NormalizePathLayer::trim_trailing_slash().layer(app)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        status::status,
        status::unauthorized,
        status::forbidden,
        users::get_current_user,
        health::health
    ),
    components(
        schemas(
            StatusResponse,
            UserResponse,
            HealthResponse,
            HealthChecks
        )
    ),
    tags(
        (name = "Status", description = "Fixed status responses"),
        (name = "Users", description = "Authenticated user information"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;
