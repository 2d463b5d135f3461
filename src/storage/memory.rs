// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory credential store.
//!
//! Same contract as [`UserDatabase`](super::UserDatabase) without
//! persistence. Used by tests and for throwaway local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::User;

use super::{validate_email, CredentialStore, StoreError, StoreResult, UserField, UserQuery};

#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is, bypassing the uniqueness check.
    ///
    /// Only exists so tests can build a store that violates the email
    /// invariant and exercise the ambiguous-lookup path.
    #[cfg(test)]
    pub(crate) fn insert_unchecked(&self, user: User) {
        self.users
            .write()
            .expect("users lock poisoned")
            .insert(user.id.clone(), user);
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("users lock poisoned".to_string())
}

impl CredentialStore for InMemoryStore {
    fn create_user(&self, email: &str, hashed_secret: &str) -> StoreResult<User> {
        validate_email(email)?;

        let mut users = self.users.write().map_err(poisoned)?;
        if users.values().any(|user| user.email == email) {
            return Err(StoreError::DuplicateIdentity(email.to_string()));
        }

        let user = User::new(email, hashed_secret);
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn find_by(&self, query: &UserQuery) -> StoreResult<User> {
        let users = self.users.read().map_err(poisoned)?;

        // Primary-key lookups skip the scan.
        if let Some(id) = query.get(UserField::Id) {
            return users
                .get(id)
                .filter(|user| query.matches(user))
                .cloned()
                .ok_or(StoreError::NotFound);
        }

        let mut matches = users.values().filter(|user| query.matches(user));
        match (matches.next(), matches.count()) {
            (None, _) => Err(StoreError::NotFound),
            (Some(user), 0) => Ok(user.clone()),
            (Some(_), rest) => Err(StoreError::AmbiguousResult(rest + 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_email_on_empty_store_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.find_by(&UserQuery::by_email("x")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn create_then_find_returns_same_user() {
        let store = InMemoryStore::new();
        let created = store.create_user("x", "h").unwrap();

        let found = store.find_by(&UserQuery::by_email("x")).unwrap();
        assert_eq!(found, created);

        let by_id = store.find_by(&UserQuery::new([("id", created.id.as_str())]).unwrap()).unwrap();
        assert_eq!(by_id, created);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        store.create_user("dup@example.com", "h1").unwrap();
        let err = store.create_user("dup@example.com", "h2").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIdentity(email) if email == "dup@example.com"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn emails_differing_in_case_are_distinct() {
        let store = InMemoryStore::new();
        store.create_user("Bob@example.com", "h1").unwrap();
        store.create_user("bob@example.com", "h2").unwrap();
        assert_eq!(store.len(), 2);

        let found = store.find_by(&UserQuery::by_email("bob@example.com")).unwrap();
        assert_eq!(found.hashed_secret, "h2");
    }

    #[test]
    fn multiple_matches_are_ambiguous() {
        let store = InMemoryStore::new();
        store.insert_unchecked(User::new("twin@example.com", "h1"));
        store.insert_unchecked(User::new("twin@example.com", "h2"));

        let err = store.find_by(&UserQuery::by_email("twin@example.com")).unwrap_err();
        assert!(matches!(err, StoreError::AmbiguousResult(2)));
    }

    #[test]
    fn id_lookup_still_applies_other_criteria() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@example.com", "h").unwrap();

        let query = UserQuery::new([("id", user.id.as_str()), ("email", "someone-else")]).unwrap();
        assert!(matches!(store.find_by(&query), Err(StoreError::NotFound)));
    }
}
