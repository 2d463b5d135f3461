// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticators: the per-request decision.
//!
//! [`Authenticator`] is the extension point for credential schemes. Every
//! implementor shares the path exemption rule and the way rejections are
//! folded into "no user"; a scheme only decides how to read its header and
//! how to turn it into a [`User`].
//!
//! | Scheme | Header | Resolution |
//! |--------|--------|------------|
//! | [`BaseAuth`] | none | always rejected once required |
//! | [`BasicAuth`] | `Authorization` | Basic decode + store lookup |

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap, Request};

use crate::models::User;
use crate::storage::CredentialStore;

use super::basic::{parse_basic_header, resolve_identity};
use super::{AuthError, ExemptionList, Rejection};

// =============================================================================
// Request Abstraction
// =============================================================================

/// Header lookup, the only thing an authenticator reads from a request.
///
/// Names are matched case-insensitively. Values that are not visible ASCII
/// are treated as absent.
pub trait HeaderSource {
    fn header(&self, name: &str) -> Option<&str>;
}

impl HeaderSource for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|value| value.to_str().ok())
    }
}

impl HeaderSource for Parts {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.header(name)
    }
}

impl<B> HeaderSource for Request<B> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().header(name)
    }
}

// =============================================================================
// Decision
// =============================================================================

/// Outcome of authenticating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// The path is exempt
    NotRequired,
    /// Credentials resolved to this user
    Authenticated(User),
    /// Credentials were required and refused
    Rejected(Rejection),
}

// =============================================================================
// Authenticator
// =============================================================================

/// A credential scheme.
pub trait Authenticator: Send + Sync {
    /// Short scheme name for logs.
    fn scheme(&self) -> &'static str;

    /// Paths that never need credentials.
    fn exemptions(&self) -> &ExemptionList;

    /// Whether a request for `path` must be authenticated.
    fn requires_auth(&self, path: Option<&str>) -> bool {
        self.exemptions().requires_auth(path)
    }

    /// Raw credential header for this scheme, if present.
    fn authorization_header<'r>(&self, _request: &'r dyn HeaderSource) -> Option<&'r str> {
        None
    }

    /// Resolve the request's credentials to a user.
    fn authenticate(&self, _request: &dyn HeaderSource) -> Result<User, AuthError> {
        Err(Rejection::NoScheme.into())
    }

    /// Run [`Authenticator::authenticate`] and separate refused credentials
    /// from infrastructure failures.
    ///
    /// Every other entry point builds on this, so a rejection is logged and
    /// turned into a value in exactly one place.
    fn resolve(&self, request: &dyn HeaderSource) -> Result<Result<User, Rejection>, AuthError> {
        match self.authenticate(request) {
            Ok(user) => Ok(Ok(user)),
            Err(AuthError::Rejected(reason)) => {
                tracing::debug!(
                    scheme = self.scheme(),
                    stage = reason.stage(),
                    %reason,
                    "Credentials rejected"
                );
                Ok(Err(reason))
            }
            Err(e) => Err(e),
        }
    }

    /// The authenticated user, or `None` if the credentials were refused.
    ///
    /// Only infrastructure failures are returned as errors.
    fn current_user(&self, request: &dyn HeaderSource) -> Result<Option<User>, AuthError> {
        Ok(self.resolve(request)?.ok())
    }

    /// Full decision for a request to `path`.
    fn decide(&self, path: Option<&str>, request: &dyn HeaderSource) -> Result<AuthDecision, AuthError> {
        if !self.requires_auth(path) {
            return Ok(AuthDecision::NotRequired);
        }

        Ok(match self.resolve(request)? {
            Ok(user) => AuthDecision::Authenticated(user),
            Err(reason) => AuthDecision::Rejected(reason),
        })
    }
}

/// No credential scheme: exempt paths pass, everything else is refused.
#[derive(Debug, Clone, Default)]
pub struct BaseAuth {
    exemptions: ExemptionList,
}

impl BaseAuth {
    pub fn new(exemptions: ExemptionList) -> Self {
        Self { exemptions }
    }
}

impl Authenticator for BaseAuth {
    fn scheme(&self) -> &'static str {
        "none"
    }

    fn exemptions(&self) -> &ExemptionList {
        &self.exemptions
    }
}

/// HTTP Basic authentication against a [`CredentialStore`].
#[derive(Clone)]
pub struct BasicAuth {
    exemptions: ExemptionList,
    store: Arc<dyn CredentialStore>,
}

impl BasicAuth {
    pub fn new(exemptions: ExemptionList, store: Arc<dyn CredentialStore>) -> Self {
        Self { exemptions, store }
    }
}

impl Authenticator for BasicAuth {
    fn scheme(&self) -> &'static str {
        "basic"
    }

    fn exemptions(&self) -> &ExemptionList {
        &self.exemptions
    }

    fn authorization_header<'r>(&self, request: &'r dyn HeaderSource) -> Option<&'r str> {
        request.header(AUTHORIZATION.as_str())
    }

    fn authenticate(&self, request: &dyn HeaderSource) -> Result<User, AuthError> {
        let credential = parse_basic_header(self.authorization_header(request))?;
        resolve_identity(&credential.identifier, &credential.secret, self.store.as_ref())
    }
}

// =============================================================================
// Scheme Selection
// =============================================================================

/// Which authenticator the server runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// No authentication layer at all
    Disabled,
    /// [`BaseAuth`]
    Base,
    /// [`BasicAuth`]
    Basic,
}

impl AuthScheme {
    /// Parse an `AUTH_TYPE` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "" | "none" => Some(AuthScheme::Disabled),
            "auth" => Some(AuthScheme::Base),
            "basic_auth" | "basic" => Some(AuthScheme::Basic),
            _ => None,
        }
    }

    /// Build the authenticator for this scheme. `Disabled` yields `None`.
    pub fn build(
        self,
        exemptions: ExemptionList,
        store: Arc<dyn CredentialStore>,
    ) -> Option<Arc<dyn Authenticator>> {
        match self {
            AuthScheme::Disabled => None,
            AuthScheme::Base => Some(Arc::new(BaseAuth::new(exemptions))),
            AuthScheme::Basic => Some(Arc::new(BasicAuth::new(exemptions, store))),
        }
    }
}
