// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{TimeZone, Utc};
use fitquest::config::Config;
use fitquest::db::LocalStorage;
use fitquest::routes::create_router;
use fitquest::services::{ManualClock, ProgressionStore, WorkoutLogStore};
use fitquest::AppState;
use std::sync::Arc;

/// Fixed starting point for tests: 2024-05-01 09:00 UTC.
#[allow(dead_code)]
pub fn test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    ))
}

/// Create an initialized progression store over `storage`.
#[allow(dead_code)]
pub async fn progression_store(
    storage: &LocalStorage,
    clock: &Arc<ManualClock>,
) -> ProgressionStore {
    let store = ProgressionStore::new(storage.clone(), clock.clone());
    store.initialize().await;
    store
}

/// Create an initialized workout log over `storage`.
#[allow(dead_code)]
pub async fn workout_store(storage: &LocalStorage, clock: &Arc<ManualClock>) -> WorkoutLogStore {
    let store = WorkoutLogStore::new(storage.clone(), clock.clone());
    store.initialize().await;
    store
}

/// Create a test app over in-memory storage with both stores loaded.
/// Returns the router, the shared state and the clock driving it.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<ManualClock>) {
    let storage = LocalStorage::new_memory();
    let clock = test_clock();

    let state = Arc::new(AppState {
        config: Config::default(),
        progression: progression_store(&storage, &clock).await,
        workouts: workout_store(&storage, &clock).await,
    });

    (create_router(state.clone()), state, clock)
}

/// Create a test app whose stores were never initialized.
#[allow(dead_code)]
pub fn create_unready_test_app() -> axum::Router {
    let storage = LocalStorage::new_memory();
    let clock = test_clock();

    let state = Arc::new(AppState {
        config: Config::default(),
        progression: ProgressionStore::new(storage.clone(), clock.clone()),
        workouts: WorkoutLogStore::new(storage, clock),
    });

    create_router(state)
}
