// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! HTTP Basic authentication in front of every route that is not exempt.
//!
//! ## Auth Flow
//!
//! 1. Client sends `Authorization: Basic <base64(email:secret)>`
//! 2. The middleware checks the request path against the exemption list
//! 3. For protected paths the [`BasicAuth`] authenticator:
//!    - strips the `Basic ` prefix
//!    - decodes base64 to UTF-8 text
//!    - splits on the first `:`
//!    - looks the email up in the credential store and verifies the secret
//! 4. The resolved user is stored in request extensions for [`CurrentUser`]
//!
//! ## Security
//!
//! - Every refusal renders the same 401 with a `WWW-Authenticate` challenge
//! - Secrets are stored as salted argon2id hashes, never in clear
//! - A store outage is a 503, never a 401
//! - Exemptions match exactly (modulo one trailing slash), no prefixes

pub mod authenticator;
pub mod basic;
pub mod error;
pub mod exemption;
pub mod extractor;
pub mod middleware;
pub mod password;

pub use authenticator::{AuthDecision, AuthScheme, Authenticator, BaseAuth, BasicAuth, HeaderSource};
pub use error::{AuthError, Rejection};
pub use exemption::{requires_auth, ExemptionList};
pub use extractor::CurrentUser;
pub use middleware::require_authentication;
pub use password::{hash_secret, verify_secret, PasswordError};
