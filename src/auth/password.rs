// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Secret hashing (argon2id).
//!
//! Stored verifiers are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so parameters travel with the hash and verification needs no
//! configuration.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Errors from hashing or parsing a verifier.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash secret: {0}")]
    Hash(argon2::password_hash::Error),

    #[error("malformed secret verifier: {0}")]
    MalformedHash(argon2::password_hash::Error),

    #[error("secret verification error: {0}")]
    Verify(argon2::password_hash::Error),
}

/// Hash a secret with argon2id and a fresh random salt.
pub fn hash_secret(secret: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(PasswordError::Hash)?;
    Ok(hash.to_string())
}

/// Verify a secret against a PHC-format verifier.
///
/// Returns `Ok(false)` on mismatch and `Err` only when the verifier itself
/// is unusable.
pub fn verify_secret(secret: &str, hashed: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hashed).map_err(PasswordError::MalformedHash)?;

    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e)),
    }
}
