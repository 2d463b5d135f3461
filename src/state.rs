// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::storage::{CredentialStore, InMemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    /// `None` when authentication is disabled.
    pub authenticator: Option<Arc<dyn Authenticator>>,
}

impl AppState {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            authenticator: None,
        }
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }
}
