// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Basic credential decoding.
//!
//! `Authorization: Basic <base64(identifier:secret)>` is taken apart in four
//! stages. Each stage either hands its output to the next or stops with the
//! [`Rejection`] that names it:
//!
//! 1. [`extract_encoded_part`] - strip the `Basic ` prefix
//! 2. [`decode_to_text`] - base64 (standard alphabet) then UTF-8
//! 3. [`split_credential`] - split on the first `:`
//! 4. [`resolve_identity`] - store lookup and secret verification
//!
//! Stages 1–3 are pure. Stage 4 only reads from the store.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::models::User;
use crate::storage::{CredentialStore, StoreError, UserQuery};

use super::{AuthError, Rejection};

/// Scheme prefix, exact and case-sensitive with a single space.
pub const BASIC_PREFIX: &str = "Basic ";

/// Identifier and secret decoded from a header. Never persisted or logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub identifier: String,
    pub secret: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Stage 1: return the part of the header after `Basic `.
pub fn extract_encoded_part(header: Option<&str>) -> Result<&str, Rejection> {
    header
        .and_then(|value| value.strip_prefix(BASIC_PREFIX))
        .ok_or(Rejection::InvalidHeader)
}

/// Stage 2: decode standard base64 and interpret the bytes as UTF-8.
pub fn decode_to_text(encoded: &str) -> Result<String, Rejection> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| Rejection::DecodeFailure)?;
    String::from_utf8(bytes).map_err(|_| Rejection::DecodeFailure)
}

/// Stage 3: split `identifier:secret` on the first colon.
///
/// The secret keeps any further colons.
pub fn split_credential(decoded: &str) -> Result<Credential, Rejection> {
    let (identifier, secret) = decoded
        .split_once(':')
        .ok_or(Rejection::MalformedCredential)?;

    Ok(Credential {
        identifier: identifier.to_string(),
        secret: secret.to_string(),
    })
}

/// Stages 1–3 in order.
pub fn parse_basic_header(header: Option<&str>) -> Result<Credential, Rejection> {
    let encoded = extract_encoded_part(header)?;
    let decoded = decode_to_text(encoded)?;
    split_credential(&decoded)
}

/// Stage 4: look the identifier up and verify the secret.
///
/// Unknown, ambiguous, or mismatched credentials are rejections. A store
/// outage is returned as [`AuthError::StoreUnavailable`] so it is not
/// mistaken for bad credentials.
pub fn resolve_identity(
    identifier: &str,
    secret: &str,
    store: &dyn CredentialStore,
) -> Result<User, AuthError> {
    let user = match store.find_by(&UserQuery::by_email(identifier)) {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(Rejection::IdentityNotFound.into()),
        Err(StoreError::AmbiguousResult(count)) => {
            tracing::warn!(matches = count, "Identity lookup matched several users");
            return Err(Rejection::AmbiguousIdentity.into());
        }
        Err(StoreError::Unavailable(msg)) => return Err(AuthError::StoreUnavailable(msg)),
        Err(other) => return Err(AuthError::Internal(other.to_string())),
    };

    if store.verify_secret(secret, &user.hashed_secret) {
        Ok(user)
    } else {
        Err(Rejection::SecretMismatch.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_secret;
    use crate::storage::InMemoryStore;

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn extract_requires_exact_prefix() {
        assert_eq!(extract_encoded_part(Some("Basic abc")), Ok("abc"));
        assert_eq!(extract_encoded_part(Some("Basic ")), Ok(""));

        for bad in ["basic abc", "BASIC abc", "Basic\tabc", "Basicabc", "Bearer abc", " Basic abc", ""] {
            assert_eq!(extract_encoded_part(Some(bad)), Err(Rejection::InvalidHeader), "{bad:?}");
        }
        assert_eq!(extract_encoded_part(None), Err(Rejection::InvalidHeader));
    }

    #[test]
    fn extract_keeps_everything_after_the_prefix() {
        // A second space belongs to the payload, which later fails decoding.
        assert_eq!(extract_encoded_part(Some("Basic  abc")), Ok(" abc"));
    }

    #[test]
    fn decode_handles_base64_and_utf8() {
        assert_eq!(decode_to_text("SGVsbG8sIFdvcmxkIQ=="), Ok("Hello, World!".to_string()));
        assert_eq!(decode_to_text(&STANDARD.encode("héllo:wörld")), Ok("héllo:wörld".to_string()));
        assert_eq!(decode_to_text(""), Ok(String::new()));
    }

    #[test]
    fn decode_rejects_bad_alphabet_padding_and_utf8() {
        assert_eq!(decode_to_text("!!!invalid!!!"), Err(Rejection::DecodeFailure));
        assert_eq!(decode_to_text("SGVsbG8"), Err(Rejection::DecodeFailure));
        assert_eq!(decode_to_text(" SGVsbG8="), Err(Rejection::DecodeFailure));
        // URL-safe alphabet is not accepted.
        assert_eq!(decode_to_text("_-8="), Err(Rejection::DecodeFailure));
        assert_eq!(decode_to_text(&STANDARD.encode([0xffu8, 0xfe, 0x3a])), Err(Rejection::DecodeFailure));
    }

    #[test]
    fn split_uses_first_colon_only() {
        let credential = split_credential("alice@example.com:pa:ss").unwrap();
        assert_eq!(credential.identifier, "alice@example.com");
        assert_eq!(credential.secret, "pa:ss");

        let empty = split_credential(":").unwrap();
        assert_eq!(empty.identifier, "");
        assert_eq!(empty.secret, "");

        assert_eq!(split_credential("no-colon-here"), Err(Rejection::MalformedCredential));
    }

    #[test]
    fn parse_basic_header_stops_at_first_failing_stage() {
        assert_eq!(parse_basic_header(Some("Bearer x")), Err(Rejection::InvalidHeader));
        assert_eq!(parse_basic_header(Some("Basic ***")), Err(Rejection::DecodeFailure));
        assert_eq!(
            parse_basic_header(Some(basic("nocolon").as_str())),
            Err(Rejection::MalformedCredential)
        );

        let credential = parse_basic_header(Some(basic("bob@x.com:s3cret").as_str())).unwrap();
        assert_eq!(credential.identifier, "bob@x.com");
        assert_eq!(credential.secret, "s3cret");
    }

    #[test]
    fn credential_debug_hides_secret() {
        let credential = split_credential("bob@x.com:hunter2").unwrap();
        assert!(!format!("{credential:?}").contains("hunter2"));
    }

    #[test]
    fn resolve_identity_outcomes() {
        let store = InMemoryStore::new();
        let bob = store
            .create_user("bob@x.com", &hash_secret("right").unwrap())
            .unwrap();

        let found = resolve_identity("bob@x.com", "right", &store).unwrap();
        assert_eq!(found, bob);

        assert!(matches!(
            resolve_identity("bob@x.com", "wrong", &store),
            Err(AuthError::Rejected(Rejection::SecretMismatch))
        ));
        assert!(matches!(
            resolve_identity("BOB@x.com", "right", &store),
            Err(AuthError::Rejected(Rejection::IdentityNotFound))
        ));
    }

    #[test]
    fn resolve_identity_rejects_ambiguous_matches() {
        let store = InMemoryStore::new();
        let hash = hash_secret("pw").unwrap();
        store.insert_unchecked(User::new("twin@x.com", hash.clone()));
        store.insert_unchecked(User::new("twin@x.com", hash));

        assert!(matches!(
            resolve_identity("twin@x.com", "pw", &store),
            Err(AuthError::Rejected(Rejection::AmbiguousIdentity))
        ));
    }

    #[test]
    fn resolve_identity_propagates_store_outage() {
        let dir = tempfile::tempdir().unwrap();
        let db = crate::storage::UserDatabase::new(dir.path().join("users.redb"));
        db.close();

        assert!(matches!(
            resolve_identity("bob@x.com", "pw", &db),
            Err(AuthError::StoreUnavailable(_))
        ));
    }
}
