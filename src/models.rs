// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Data Models
//!
//! [`User`] is the stored record owned by the credential store.
//! [`UserResponse`] is its HTTP projection and never carries the hashed
//! secret.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Stored User
// =============================================================================

/// A user record as persisted by a [`CredentialStore`](crate::storage::CredentialStore).
///
/// `email` is unique across the store and compared case-sensitively.
/// `hashed_secret` is an argon2 PHC string, never the plaintext secret.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Store-assigned identifier (UUID v4)
    pub id: String,
    /// Login identifier
    pub email: String,
    /// Opaque verifier for the user's secret
    pub hashed_secret: String,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh record with a new id and the current timestamp.
    pub fn new(email: impl Into<String>, hashed_secret: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            hashed_secret: hashed_secret.into(),
            created_at: Utc::now(),
        }
    }
}

// The verifier stays out of logs.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("hashed_secret", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Response for GET /api/v1/users/me
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserResponse {
    /// User's unique ID
    pub id: String,
    /// User's email
    pub email: String,
    /// When the user was created
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Response for GET /api/v1/status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}
