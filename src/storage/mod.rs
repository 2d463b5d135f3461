// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Store
//!
//! Persistent collection of [`User`] records with create and filtered
//! lookup. The authentication pipeline only ever reads through this trait.
//!
//! ## Backends
//!
//! - [`UserDatabase`] - embedded redb file, one lazily opened handle per
//!   store instance, released exactly once on [`UserDatabase::close`] or drop
//! - [`InMemoryStore`] - `HashMap` behind a `RwLock`, for tests and local runs
//!
//! ## Lookup Contract
//!
//! [`CredentialStore::find_by`] returns exactly one user or fails:
//!
//! | Matches | Result |
//! |---------|--------|
//! | 0 | [`StoreError::NotFound`] |
//! | 1 | `Ok(user)` |
//! | >1 | [`StoreError::AmbiguousResult`] |

pub mod error;
pub mod memory;
pub mod query;
pub mod user_database;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use query::{UserField, UserQuery};
pub use user_database::UserDatabase;

use crate::auth::password;
use crate::models::User;

/// Storage operations for user credentials.
pub trait CredentialStore: Send + Sync {
    /// Persist a new user.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidEmail`] if `email` is not well-formed
    /// - [`StoreError::DuplicateIdentity`] if `email` is already taken
    /// - [`StoreError::Unavailable`] on backend failure
    fn create_user(&self, email: &str, hashed_secret: &str) -> StoreResult<User>;

    /// Find the single user matching every criterion in `query`.
    fn find_by(&self, query: &UserQuery) -> StoreResult<User>;

    /// Check a plaintext secret against a stored verifier.
    ///
    /// A verifier that cannot be parsed never matches.
    fn verify_secret(&self, plain: &str, hashed: &str) -> bool {
        match password::verify_secret(plain, hashed) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Stored secret verifier is unusable");
                false
            }
        }
    }

    /// Check that the backend is reachable.
    fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Validate an email before it is stored.
///
/// Only the shape the authentication pipeline depends on is enforced: the
/// value must be non-empty, free of whitespace and control characters, and
/// must not contain `:` (Basic credentials split on the first colon, so such
/// an identity could never log in).
pub fn validate_email(email: &str) -> StoreResult<()> {
    let well_formed = !email.is_empty()
        && !email
            .chars()
            .any(|c| c == ':' || c.is_whitespace() || c.is_control());

    if well_formed {
        Ok(())
    } else {
        Err(StoreError::InvalidEmail(email.to_string()))
    }
}
