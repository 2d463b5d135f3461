// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path-based authentication exemptions.
//!
//! A path is exempt only when it equals a configured pattern after both have
//! been given a trailing `/`. There is no prefix or wildcard matching:
//! exempting `/api/v1/status` does not exempt `/api/v1/status/extra`.

use std::borrow::Cow;

/// Append a trailing `/` unless one is already present.
fn normalize(path: &str) -> Cow<'_, str> {
    if path.ends_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("{path}/"))
    }
}

/// Whether a request for `path` must carry credentials.
///
/// Fails closed: a missing or empty path, or an empty exemption list,
/// always requires authentication.
pub fn requires_auth<S: AsRef<str>>(path: Option<&str>, exemptions: &[S]) -> bool {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return true;
    };
    if exemptions.is_empty() {
        return true;
    }

    let path = normalize(path);
    !exemptions
        .iter()
        .any(|pattern| normalize(pattern.as_ref()) == path)
}

/// Exemption patterns fixed at authenticator construction.
///
/// Patterns are stored normalized, so lookups only normalize the request
/// path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExemptionList {
    patterns: Vec<String>,
}

impl ExemptionList {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| normalize(p.as_ref()).into_owned())
                .collect(),
        }
    }

    /// Parse a comma-separated list, ignoring blank entries.
    pub fn from_csv(value: &str) -> Self {
        Self::new(value.split(',').map(str::trim).filter(|p| !p.is_empty()))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Normalized patterns in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    /// [`requires_auth`] against this list.
    pub fn requires_auth(&self, path: Option<&str>) -> bool {
        requires_auth(path, self.patterns.as_slice())
    }
}
