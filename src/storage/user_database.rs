// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded user database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user id → serialized [`User`] (JSON bytes)
//! - `users_by_email`: email → user id (uniqueness index)
//!
//! ## Connection Lifecycle
//!
//! The `redb::Database` handle is opened on first use, not in
//! [`UserDatabase::new`], and reused for every later operation. It sits
//! behind a mutex so one handle never serves two operations at once.
//! [`UserDatabase::close`] releases it; `Drop` calls `close`, which is a
//! no-op the second time.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::models::User;

use super::{validate_email, CredentialStore, StoreError, StoreResult, UserField, UserQuery};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: user id → serialized User (JSON bytes).
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Index: email → user id. One entry per email.
const USERS_BY_EMAIL: TableDefinition<&str, &str> = TableDefinition::new("users_by_email");

// =============================================================================
// UserDatabase
// =============================================================================

#[derive(Default)]
struct Connection {
    handle: Option<Database>,
    closed: bool,
}

/// Credential store persisted in a single redb file.
pub struct UserDatabase {
    path: PathBuf,
    connection: Mutex<Connection>,
}

impl UserDatabase {
    /// Describe a database at `path`. Nothing is opened until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            connection: Mutex::new(Connection::default()),
        }
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a live handle is currently held.
    pub fn is_open(&self) -> bool {
        self.lock_connection().handle.is_some()
    }

    /// Release the database handle.
    ///
    /// Returns `true` if a live handle was released by this call. After
    /// closing, every operation fails with [`StoreError::Unavailable`].
    pub fn close(&self) -> bool {
        let mut connection = self.lock_connection();
        connection.closed = true;
        match connection.handle.take() {
            Some(db) => {
                drop(db);
                tracing::info!(path = %self.path.display(), "User database closed");
                true
            }
            None => false,
        }
    }

    // Closing must still work after a panicked operation poisoned the lock.
    fn lock_connection(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open (or create) the database file and make sure all tables exist.
    fn connect(path: &Path) -> StoreResult<Database> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERS_BY_EMAIL)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "User database opened");
        Ok(db)
    }

    /// Run `op` against the memoized handle, opening it first if needed.
    fn with_connection<T>(&self, op: impl FnOnce(&Database) -> StoreResult<T>) -> StoreResult<T> {
        let mut connection = self
            .connection
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;

        if connection.closed {
            return Err(StoreError::Unavailable("user database is closed".to_string()));
        }

        let db = match connection.handle.take() {
            Some(db) => db,
            None => Self::connect(&self.path)?,
        };
        let db = connection.handle.insert(db);
        op(db)
    }
}

impl Drop for UserDatabase {
    fn drop(&mut self) {
        self.close();
    }
}

fn load_user<T>(users: &T, id: &str) -> StoreResult<Option<User>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    match users.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

impl CredentialStore for UserDatabase {
    fn create_user(&self, email: &str, hashed_secret: &str) -> StoreResult<User> {
        validate_email(email)?;

        self.with_connection(|db| {
            let user = User::new(email, hashed_secret);
            let json = serde_json::to_vec(&user)?;

            let write_txn = db.begin_write()?;
            {
                let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;
                if by_email.get(email)?.is_some() {
                    return Err(StoreError::DuplicateIdentity(email.to_string()));
                }
                by_email.insert(email, user.id.as_str())?;

                let mut users = write_txn.open_table(USERS)?;
                users.insert(user.id.as_str(), json.as_slice())?;
            }
            write_txn.commit()?;

            tracing::debug!(user_id = %user.id, "User created");
            Ok(user)
        })
    }

    fn find_by(&self, query: &UserQuery) -> StoreResult<User> {
        self.with_connection(|db| {
            let read_txn = db.begin_read()?;
            let users = read_txn.open_table(USERS)?;

            // Indexed lookups: id is the primary key, email has its own index.
            let indexed_id = match (query.get(UserField::Id), query.get(UserField::Email)) {
                (Some(id), _) => Some(id.to_string()),
                (None, Some(email)) => {
                    let by_email = read_txn.open_table(USERS_BY_EMAIL)?;
                    let id = by_email.get(email)?.map(|value| value.value().to_string());
                    match id {
                        Some(id) => Some(id),
                        None => return Err(StoreError::NotFound),
                    }
                }
                (None, None) => None,
            };

            if let Some(id) = indexed_id {
                return match load_user(&users, &id)? {
                    Some(user) if query.matches(&user) => Ok(user),
                    Some(_) => Err(StoreError::NotFound),
                    None if query.get(UserField::Id).is_some() => Err(StoreError::NotFound),
                    None => Err(StoreError::Unavailable(format!(
                        "email index points at missing user {id}"
                    ))),
                };
            }

            let mut found = None;
            let mut count = 0usize;
            for entry in users.iter()? {
                let (_, value) = entry?;
                let user: User = serde_json::from_slice(value.value())?;
                if query.matches(&user) {
                    count += 1;
                    found.get_or_insert(user);
                }
            }

            match found {
                None => Err(StoreError::NotFound),
                Some(user) if count == 1 => Ok(user),
                Some(_) => Err(StoreError::AmbiguousResult(count)),
            }
        })
    }

    fn health_check(&self) -> StoreResult<()> {
        self.with_connection(|db| {
            let read_txn = db.begin_read()?;
            let _ = read_txn.open_table(USERS)?;
            Ok(())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
