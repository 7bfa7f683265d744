// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Community Portal API Server
//!
//! Serves sign-in, profile completion and event registration for the
//! community site's static pages.

use community_portal::{
    config::Config, services::IdentityVerifier, session::StoreHandle, AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.store_backend,
        "Starting Community Portal API"
    );

    // Connect the document store in the background; requests wait for it briefly
    let store = StoreHandle::connect_in_background(&config);

    let identity = match &config.firebase_project_id {
        Some(project_id) => {
            let verifier = IdentityVerifier::new(project_id)?;
            tracing::info!(project = %project_id, "Identity verifier initialized");
            Some(Arc::new(verifier))
        }
        None => {
            tracing::warn!("FIREBASE_PROJECT_ID not set, sign-in disabled");
            None
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store, identity));

    // Build router
    let app = community_portal::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("community_portal=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
