// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Validated lookup criteria for [`CredentialStore::find_by`](super::CredentialStore::find_by).

use std::collections::BTreeMap;

use crate::models::User;

use super::{StoreError, StoreResult};

/// A queryable column of the user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UserField {
    Id,
    Email,
    HashedSecret,
}

impl UserField {
    /// Parse a field name. `hashed_password` is accepted as an alias.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(UserField::Id),
            "email" => Some(UserField::Email),
            "hashed_secret" | "hashed_password" => Some(UserField::HashedSecret),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserField::Id => "id",
            UserField::Email => "email",
            UserField::HashedSecret => "hashed_secret",
        }
    }

    fn value_of<'u>(&self, user: &'u User) -> &'u str {
        match self {
            UserField::Id => &user.id,
            UserField::Email => &user.email,
            UserField::HashedSecret => &user.hashed_secret,
        }
    }
}

/// Conjunction of `field == value` criteria.
///
/// Construction fails with [`StoreError::InvalidQuery`] when the criteria
/// are empty, name an unknown field, or give one field two different
/// values. A successfully built query therefore only ever references known
/// fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    criteria: BTreeMap<UserField, String>,
}

impl UserQuery {
    /// Build a query from `(field, value)` pairs.
    pub fn new<I, K, V>(criteria: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut parsed = BTreeMap::new();
        for (name, value) in criteria {
            let name = name.as_ref();
            let field = UserField::parse(name)
                .ok_or_else(|| StoreError::InvalidQuery(format!("unknown field {name:?}")))?;
            let value = value.into();
            match parsed.get(&field) {
                Some(existing) if existing != &value => {
                    return Err(StoreError::InvalidQuery(format!(
                        "conflicting values for field {:?}",
                        field.as_str()
                    )));
                }
                _ => {
                    parsed.insert(field, value);
                }
            }
        }

        if parsed.is_empty() {
            return Err(StoreError::InvalidQuery("empty criteria".to_string()));
        }

        Ok(Self { criteria: parsed })
    }

    /// Shorthand for the lookup the authentication pipeline performs.
    pub fn by_email(email: impl Into<String>) -> Self {
        let mut criteria = BTreeMap::new();
        criteria.insert(UserField::Email, email.into());
        Self { criteria }
    }

    /// The value constrained for `field`, if any.
    pub fn get(&self, field: UserField) -> Option<&str> {
        self.criteria.get(&field).map(String::as_str)
    }

    /// Whether `user` satisfies every criterion. Comparison is exact and
    /// case-sensitive.
    pub fn matches(&self, user: &User) -> bool {
        self.criteria
            .iter()
            .all(|(field, value)| field.value_of(user) == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_fields() {
        let err = UserQuery::new([("nickname", "bob")]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery(msg) if msg.contains("nickname")));
    }

    #[test]
    fn rejects_empty_criteria() {
        let err = UserQuery::new(Vec::<(&str, &str)>::new()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery(_)));
    }

    #[test]
    fn rejects_conflicting_values() {
        let err = UserQuery::new([("email", "a@x.com"), ("email", "b@x.com")]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery(_)));

        // Repeating the same value is harmless.
        let query = UserQuery::new([("email", "a@x.com"), ("email", "a@x.com")]).unwrap();
        assert_eq!(query.get(UserField::Email), Some("a@x.com"));
    }

    #[test]
    fn accepts_hashed_password_alias() {
        let query = UserQuery::new([("hashed_password", "h")]).unwrap();
        assert_eq!(query.get(UserField::HashedSecret), Some("h"));
    }

    #[test]
    fn matches_is_exact_and_case_sensitive() {
        let user = User::new("Alice@example.com", "h");
        assert!(UserQuery::by_email("Alice@example.com").matches(&user));
        assert!(!UserQuery::by_email("alice@example.com").matches(&user));

        let both = UserQuery::new([("email", "Alice@example.com"), ("hashed_secret", "other")]).unwrap();
        assert!(!both.matches(&user));
    }
}
