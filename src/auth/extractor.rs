// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Use the `CurrentUser` extractor in handlers that need a caller:
//!
//! ```rust,ignore
//! async fn my_handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
//!     // user is models::User
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, Rejection};
use crate::models::User;
use crate::state::AppState;

/// Extractor for the authenticated user.
///
/// Normally the middleware has already resolved the user. On exempt paths
/// the extractor runs the configured authenticator itself, so a handler
/// that asks for a user always gets one or a 401.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the user
        if let Some(user) = parts.extensions.get::<User>().cloned() {
            return Ok(CurrentUser(user));
        }

        let Some(authenticator) = state.authenticator.clone() else {
            return Err(Rejection::NoScheme.into());
        };

        let headers = parts.headers.clone();
        let outcome = tokio::task::spawn_blocking(move || authenticator.resolve(&headers))
            .await
            .map_err(|e| AuthError::Internal(format!("authentication task failed: {e}")))?;
        let user = outcome??;

        parts.extensions.insert(user.clone());
        Ok(CurrentUser(user))
    }
}
