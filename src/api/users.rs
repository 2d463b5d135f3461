// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::Json;

use crate::auth::CurrentUser;
use crate::models::UserResponse;

/// Get the current authenticated user's information.
///
/// The stored secret hash is never part of the response.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "User information", body = UserResponse),
        (status = 401, description = "Unauthorized - missing or invalid credentials"),
        (status = 503, description = "Credential store unavailable"),
    )
)]
pub async fn get_current_user(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}
