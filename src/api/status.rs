// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed-response endpoints used by clients to check the gate.

use axum::Json;

use crate::error::ApiError;
use crate::models::StatusResponse;

#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "Status",
    responses(
        (status = 200, description = "Service is up", body = StatusResponse)
    )
)]
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "OK".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/unauthorized",
    tag = "Status",
    responses(
        (status = 401, description = "Always unauthorized")
    )
)]
pub async fn unauthorized() -> ApiError {
    ApiError::unauthorized()
}

#[utoipa::path(
    get,
    path = "/api/v1/forbidden",
    tag = "Status",
    responses(
        (status = 403, description = "Always forbidden")
    )
)]
pub async fn forbidden() -> ApiError {
    ApiError::forbidden()
}
