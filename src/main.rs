// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FitQuest local API server
//!
//! Loads the character and workout log from on-device storage and serves
//! them to the front end over a localhost JSON API.

use anyhow::Context;
use fitquest::{
    config::{Config, StorageKind},
    db::LocalStorage,
    services::{Clock, ProgressionStore, SystemClock, WorkoutLogStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(port = config.port, storage = ?config.storage, "Starting FitQuest API");

    // Open storage
    let storage = match config.storage {
        StorageKind::File => LocalStorage::open(&config.data_dir)
            .await
            .context("Failed to open data directory")?,
        StorageKind::Memory => {
            tracing::warn!("Using in-memory storage; progress is lost on exit");
            LocalStorage::new_memory()
        }
    };

    // Load both stores before serving so the front end never sees defaults
    // standing in for real data
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let progression = ProgressionStore::new(storage.clone(), clock.clone());
    let workouts = WorkoutLogStore::new(storage, clock);
    tokio::join!(progression.initialize(), workouts.initialize());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        progression,
        workouts,
    });

    // Build router
    let app = fitquest::routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fitquest=debug".parse().expect("valid directive"))
                .add_directive("info".parse().expect("valid directive")),
        )
        .with(format)
        .init();
}
