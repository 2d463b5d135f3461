// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Server startup and shutdown.
//!
//! [`run`] owns the user database for the whole lifetime of the process and
//! closes it before returning, whether startup failed or the server stopped.

use std::{future::Future, sync::Arc};

use crate::{
    api::router,
    auth::{hash_secret, PasswordError},
    config::{SeedUser, Settings},
    state::AppState,
    storage::{CredentialStore, StoreError, UserDatabase, UserQuery},
};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to seed user: {0}")]
    Store(#[from] StoreError),

    #[error("failed to hash seed secret: {0}")]
    Password(#[from] PasswordError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Serve until SIGINT or SIGTERM.
pub async fn run(settings: Settings) -> Result<(), ServerError> {
    run_until(settings, shutdown_signal()).await
}

/// Serve until `shutdown` resolves. The user database is closed on every path.
pub async fn run_until(
    settings: Settings,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let database = Arc::new(UserDatabase::new(settings.user_db_path.clone()));
    tracing::info!(path = %settings.user_db_path.display(), "Using user database");

    let result = serve(&settings, database.clone(), shutdown).await;
    database.close();
    result
}

async fn serve(
    settings: &Settings,
    database: Arc<UserDatabase>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    if let Some(seed) = &settings.seed_user {
        seed_user(database.as_ref(), seed)?;
    }

    let store: Arc<dyn CredentialStore> = database;
    let mut state = AppState::new(store.clone());
    match settings.auth_scheme.build(settings.exemptions.clone(), store) {
        Some(authenticator) => {
            tracing::info!(
                scheme = authenticator.scheme(),
                exempt_paths = settings.exemptions.len(),
                "Authentication enabled"
            );
            state = state.with_authenticator(authenticator);
        }
        None => tracing::warn!("Authentication disabled, all routes are public"),
    }

    let app = router(state);
    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    tracing::info!(%addr, "Relational Auth Gate listening (OpenAPI at /api-doc/openapi.json)");

    axum::serve(
        listener,
        axum::ServiceExt::<axum::extract::Request>::into_make_service(app),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(ServerError::Serve)
}

/// Create the configured seed user unless that email already exists.
pub fn seed_user(store: &dyn CredentialStore, seed: &SeedUser) -> Result<(), ServerError> {
    match store.find_by(&UserQuery::by_email(seed.email.as_str())) {
        Ok(_) => {
            tracing::info!(email = %seed.email, "Seed user already present");
            return Ok(());
        }
        Err(StoreError::NotFound) => {}
        Err(e) => return Err(e.into()),
    }

    let hashed = hash_secret(&seed.password)?;
    let user = store.create_user(&seed.email, &hashed)?;
    tracing::info!(user_id = %user.id, email = %user.email, "Seed user created");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::auth::verify_secret;
    use crate::storage::InMemoryStore;

    fn settings(db_path: &Path, port: u16, seed_email: &str) -> Settings {
        let db_path = db_path.to_string_lossy().into_owned();
        let port = port.to_string();
        let seed_email = seed_email.to_string();
        Settings::from_lookup(move |name| match name {
            "HOST" => Some("127.0.0.1".to_string()),
            "PORT" => Some(port.clone()),
            "AUTH_TYPE" => Some("basic_auth".to_string()),
            "USER_DB_PATH" => Some(db_path.clone()),
            "SEED_USER_EMAIL" => Some(seed_email.clone()),
            "SEED_USER_PASSWORD" => Some("pw".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn seed(email: &str) -> SeedUser {
        SeedUser {
            email: email.to_string(),
            password: "pw".to_string(),
        }
    }

    #[test]
    fn seed_user_creates_once() {
        let store = InMemoryStore::new();
        seed_user(&store, &seed("erin@x.com")).unwrap();
        seed_user(&store, &seed("erin@x.com")).unwrap();

        let user = store.find_by(&UserQuery::by_email("erin@x.com")).unwrap();
        assert!(verify_secret("pw", &user.hashed_secret).unwrap());
    }

    #[test]
    fn seed_user_rejects_malformed_email() {
        let store = InMemoryStore::new();
        let result = seed_user(&store, &seed("bad email"));
        assert!(matches!(result, Err(ServerError::Store(StoreError::InvalidEmail(_)))));
    }

    #[tokio::test]
    async fn seed_failure_still_releases_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.redb");

        let result = run_until(settings(&path, 0, "bad email"), std::future::pending()).await;
        assert!(matches!(result, Err(ServerError::Store(_))));

        let reopened = UserDatabase::new(&path);
        assert!(matches!(
            reopened.find_by(&UserQuery::by_email("bad email")),
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn bind_failure_still_releases_the_database() {
        let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.redb");

        let result = run_until(settings(&path, port, "frank@x.com"), std::future::pending()).await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));

        let reopened = UserDatabase::new(&path);
        let user = reopened.find_by(&UserQuery::by_email("frank@x.com")).unwrap();
        assert_eq!(user.email, "frank@x.com");
    }

    #[tokio::test]
    async fn graceful_shutdown_releases_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.redb");

        run_until(settings(&path, 0, "gina@x.com"), async {}).await.unwrap();

        let reopened = UserDatabase::new(&path);
        assert!(reopened.find_by(&UserQuery::by_email("gina@x.com")).is_ok());
    }
}
