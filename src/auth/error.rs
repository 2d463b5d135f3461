// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Internally every refused credential carries a [`Rejection`] naming the
//! pipeline stage that refused it. Externally all rejections render the same
//! 401 response, so a caller cannot tell an unknown email from a wrong
//! secret. Store outages are a different class of failure and render as 503.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Challenge sent with every 401.
pub const BASIC_CHALLENGE: &str = r#"Basic realm="relational-auth-gate", charset="UTF-8""#;

/// Why a request's credentials were refused. Diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// Authorization header missing, not UTF-8, or not `Basic `-prefixed
    #[error("missing or malformed authorization header")]
    InvalidHeader,
    /// Bad base64 or non-UTF-8 payload
    #[error("credential payload is not valid base64 UTF-8")]
    DecodeFailure,
    /// Decoded payload has no `:` separator
    #[error("credential has no separator")]
    MalformedCredential,
    /// No user with that identifier
    #[error("unknown identity")]
    IdentityNotFound,
    /// More than one user with that identifier
    #[error("ambiguous identity")]
    AmbiguousIdentity,
    /// Secret does not match the stored verifier
    #[error("secret mismatch")]
    SecretMismatch,
    /// The authenticator has no credential scheme
    #[error("no credential scheme configured")]
    NoScheme,
}

impl Rejection {
    /// Name of the pipeline stage that produced this rejection.
    pub fn stage(&self) -> &'static str {
        match self {
            Rejection::InvalidHeader => "extract_encoded_part",
            Rejection::DecodeFailure => "decode_to_text",
            Rejection::MalformedCredential => "split_credential",
            Rejection::IdentityNotFound
            | Rejection::AmbiguousIdentity
            | Rejection::SecretMismatch => "resolve_identity",
            Rejection::NoScheme => "authorization_header",
        }
    }
}

/// Authentication error type.
#[derive(Debug)]
pub enum AuthError {
    /// Credentials refused; the reason never leaves the process
    Rejected(Rejection),
    /// The credential store could not be queried
    StoreUnavailable(String),
    /// Unexpected failure inside the gate
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Rejected(_) => "unauthorized",
            AuthError::StoreUnavailable(_) => "store_unavailable",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Rejected(_) => StatusCode::UNAUTHORIZED,
            AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients.
    fn public_message(&self) -> &'static str {
        match self {
            AuthError::Rejected(_) => "Unauthorized",
            AuthError::StoreUnavailable(_) => "Credential store unavailable",
            AuthError::Internal(_) => "Internal authentication error",
        }
    }
}

impl From<Rejection> for AuthError {
    fn from(rejection: Rejection) -> Self {
        AuthError::Rejected(rejection)
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Rejected(reason) => write!(f, "Credentials rejected: {reason}"),
            AuthError::StoreUnavailable(msg) => write!(f, "Credential store unavailable: {msg}"),
            AuthError::Internal(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Rejected(_) => {}
            AuthError::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "Credential store unavailable during authentication")
            }
            AuthError::Internal(msg) => tracing::error!(error = %msg, "Authentication failed internally"),
        }

        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.public_message().to_string(),
            error_code: self.error_code().to_string(),
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_CHALLENGE));
        }
        response
    }
}
