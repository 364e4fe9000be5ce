//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use vouch_core::account::CredentialStore;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Configured object storage backend.
    pub storage: &'static str,
}

/// Health check handler.
async fn health_check<S: CredentialStore>(State(state): State<AppState<S>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage.provider_name(),
    })
}

/// Creates health check routes.
pub fn routes<S: CredentialStore + 'static>() -> Router<AppState<S>> {
    Router::new().route("/health", get(health_check::<S>))
}
