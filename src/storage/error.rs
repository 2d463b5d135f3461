// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential store errors.

/// Error type for credential store operations.
///
/// Backend failures of every kind (redb, serialization, lock poisoning,
/// closed connection) collapse into [`StoreError::Unavailable`]: callers
/// only need to tell "bad input / no such user" apart from "the store is
/// broken".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no user matches the query")]
    NotFound,

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("query matched {0} users, expected exactly one")]
    AmbiguousResult(usize),

    #[error("a user with email {0} already exists")]
    DuplicateIdentity(String),

    #[error("malformed email: {0:?}")]
    InvalidEmail(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

macro_rules! unavailable_from {
    ($($source:ty => $label:literal),* $(,)?) => {
        $(
            impl From<$source> for StoreError {
                fn from(e: $source) -> Self {
                    StoreError::Unavailable(format!(concat!($label, ": {}"), e))
                }
            }
        )*
    };
}

unavailable_from! {
    redb::Error => "redb error",
    redb::DatabaseError => "redb database error",
    redb::TransactionError => "redb transaction error",
    redb::TableError => "redb table error",
    redb::StorageError => "redb storage error",
    redb::CommitError => "redb commit error",
    serde_json::Error => "serialization error",
}
