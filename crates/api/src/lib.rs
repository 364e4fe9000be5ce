//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - The `/api/auth` routes and `/health`
//! - Bearer token middleware and the [`middleware::AuthUser`] extractor
//! - [`error::ApiError`], mapping application errors to JSON responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::AUTHORIZATION;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use vouch_core::account::{AccountService, CredentialStore};
use vouch_core::storage::StorageService;
use vouch_shared::JwtService;
use vouch_shared::config::LOCAL_MEDIA_PATH;

/// Room for multipart framing and the text fields around a file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across handlers.
pub struct AppState<S: CredentialStore> {
    /// Signup, signin, and avatar operations.
    pub accounts: Arc<AccountService<S>>,
    /// JWT service for validating bearer tokens.
    pub jwt_service: Arc<JwtService>,
    /// Object storage backing the avatars.
    pub storage: Arc<StorageService>,
}

impl<S: CredentialStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            jwt_service: Arc::clone(&self.jwt_service),
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: CredentialStore> AppState<S> {
    /// Largest request body accepted, derived from the upload limit.
    #[must_use]
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.storage.config().max_file_size)
            .unwrap_or(usize::MAX)
            .saturating_add(MULTIPART_OVERHEAD)
    }
}

/// Creates the main application router.
///
/// With `local_fs` storage the root directory is also served under
/// `/media`, so the avatar URLs handed out resolve against this server.
pub fn create_router<S: CredentialStore + 'static>(state: AppState<S>) -> Router {
    let body_limit = state.body_limit();

    let mut router = Router::new()
        .merge(routes::health::routes::<S>())
        .nest("/api/auth", routes::auth::routes(state.clone()));

    if let Some(root) = state.storage.local_root() {
        router = router.nest_service(LOCAL_MEDIA_PATH, ServeDir::new(root));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION]))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
