//! Vouch API Server
//!
//! Main entry point: loads configuration, wires the credential store,
//! object storage, and token issuer, and serves the HTTP API.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vouch_api::{AppState, create_router};
use vouch_core::account::AccountService;
use vouch_core::storage::{StorageConfig, StorageService};
use vouch_db::{UserRepository, connect_with};
use vouch_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vouch=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load and check configuration before touching any collaborator
    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate()?;

    // Connect to database
    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let jwt_service = Arc::new(JwtService::new(&config.jwt)?);
    info!(issuer = %jwt_service.issuer(), "Token issuer configured");

    let storage = Arc::new(StorageService::from_config(StorageConfig::from(
        &config.storage,
    ))?);
    storage.ensure_container(&config.avatar.container).await?;
    info!(
        provider = storage.provider_name(),
        container = %config.avatar.container,
        "Object storage configured"
    );

    let accounts = Arc::new(AccountService::new(
        Arc::new(UserRepository::new(db)),
        Arc::clone(&storage),
        Arc::clone(&jwt_service),
        &config.avatar,
    ));

    // Create application state
    let state = AppState {
        accounts,
        jwt_service,
        storage,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
