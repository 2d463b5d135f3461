// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Runs the configured [`Authenticator`](super::Authenticator) for every
//! request before routing. Authenticated users are stored in request
//! extensions, where the [`CurrentUser`](super::CurrentUser) extractor finds
//! them.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .layer(axum::middleware::from_fn_with_state(
//!         state.clone(),
//!         require_authentication,
//!     ))
//!     .with_state(state);
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthDecision, AuthError};
use crate::state::AppState;

/// Authentication middleware function.
///
/// Exempt paths are decided inline. For everything else, store lookups and
/// argon2 verification block, so the decision runs on the blocking pool.
pub async fn require_authentication(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(authenticator) = state.authenticator.clone() else {
        return next.run(request).await;
    };

    if !authenticator.requires_auth(Some(request.uri().path())) {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let headers = request.headers().clone();
    let decision =
        tokio::task::spawn_blocking(move || authenticator.decide(Some(path.as_str()), &headers)).await;

    match decision {
        Ok(Ok(AuthDecision::NotRequired)) => next.run(request).await,
        Ok(Ok(AuthDecision::Authenticated(user))) => {
            tracing::debug!(user_id = %user.id, path = %request.uri().path(), "Request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(Ok(AuthDecision::Rejected(reason))) => {
            tracing::debug!(
                stage = reason.stage(),
                path = %request.uri().path(),
                "Request rejected"
            );
            AuthError::Rejected(reason).into_response()
        }
        Ok(Err(e)) => e.into_response(),
        Err(e) => AuthError::Internal(format!("authentication task failed: {e}")).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread::ThreadId;

    use axum::{body::Body, http::StatusCode, routing::get, Extension, Router};
    use base64::{engine::general_purpose::STANDARD, Engine};
    use tower::ServiceExt;

    use crate::auth::{hash_secret, Authenticator, BaseAuth, BasicAuth, ExemptionList};
    use crate::models::User;
    use crate::storage::{CredentialStore, InMemoryStore, UserDatabase};

    async fn whoami(user: Option<Extension<User>>) -> String {
        user.map(|Extension(user)| user.email)
            .unwrap_or_else(|| "anonymous".to_string())
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/open", get(whoami))
            .route("/closed", get(whoami))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                require_authentication,
            ))
            .with_state(state)
    }

    fn basic_state() -> AppState {
        let store = Arc::new(InMemoryStore::new());
        store
            .create_user("bob@x.com", &hash_secret("pw").unwrap())
            .unwrap();
        let auth = BasicAuth::new(ExemptionList::new(["/open"]), store.clone());
        AppState::new(store).with_authenticator(Arc::new(auth))
    }

    async fn call(app: Router, path: &str, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri(path);
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[tokio::test]
    async fn disabled_authentication_passes_everything_through() {
        let (status, body) = call(app(AppState::default()), "/closed", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn exempt_path_needs_no_credentials() {
        let (status, body) = call(app(basic_state()), "/open", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn valid_credentials_attach_the_user() {
        let (status, body) = call(app(basic_state()), "/closed", Some(&basic("bob@x.com:pw"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "bob@x.com");
    }

    #[tokio::test]
    async fn bad_credentials_all_look_the_same() {
        let missing = call(app(basic_state()), "/closed", None).await;
        let wrong = call(app(basic_state()), "/closed", Some(&basic("bob@x.com:nope"))).await;
        let unknown = call(app(basic_state()), "/closed", Some(&basic("eve@x.com:pw"))).await;
        let garbage = call(app(basic_state()), "/closed", Some("Basic !!!")).await;

        assert_eq!(missing.0, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong, missing);
        assert_eq!(unknown, missing);
        assert_eq!(garbage, missing);
    }

    #[tokio::test]
    async fn base_scheme_rejects_protected_paths() {
        let state = AppState::default()
            .with_authenticator(Arc::new(BaseAuth::new(ExemptionList::new(["/open"]))));

        assert_eq!(call(app(state.clone()), "/open", None).await.0, StatusCode::OK);
        assert_eq!(
            call(app(state), "/closed", Some(&basic("bob@x.com:pw"))).await.0,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn store_outage_is_503() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(UserDatabase::new(dir.path().join("users.redb")));
        db.close();
        let store: Arc<dyn CredentialStore> = db;
        let auth = BasicAuth::new(ExemptionList::new(["/open"]), store.clone());
        let state = AppState::new(store).with_authenticator(Arc::new(auth));

        let (status, _) = call(app(state), "/closed", Some(&basic("bob@x.com:pw"))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    /// Scheme-less authenticator that records which thread asked whether a
    /// path needs credentials.
    struct ThreadRecording {
        exemptions: ExemptionList,
        seen: Mutex<Vec<ThreadId>>,
    }

    impl Authenticator for ThreadRecording {
        fn scheme(&self) -> &'static str {
            "recording"
        }

        fn exemptions(&self) -> &ExemptionList {
            &self.exemptions
        }

        fn requires_auth(&self, path: Option<&str>) -> bool {
            self.seen.lock().unwrap().push(std::thread::current().id());
            self.exemptions.requires_auth(path)
        }
    }

    #[tokio::test]
    async fn exempt_paths_stay_off_the_blocking_pool() {
        let recorder = Arc::new(ThreadRecording {
            exemptions: ExemptionList::new(["/open"]),
            seen: Mutex::new(Vec::new()),
        });
        let state = AppState::default().with_authenticator(recorder.clone());
        let test_thread = std::thread::current().id();

        let (status, _) = call(app(state.clone()), "/open", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(*recorder.seen.lock().unwrap(), vec![test_thread]);

        let (status, _) = call(app(state), "/closed", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1], test_thread);
        assert_ne!(seen[2], test_thread);
    }
}
