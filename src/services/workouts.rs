// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout log store.

use crate::db::LocalStorage;
use crate::error::{AppError, Result};
use crate::models::{NewWorkout, WorkoutRecord};
use crate::services::clock::Clock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

const STORE_NAME: &str = "workouts";

/// Newest-first workout log, persisted as a whole after every change.
pub struct WorkoutLogStore {
    storage: LocalStorage,
    clock: Arc<dyn Clock>,
    ready: AtomicBool,
    write_lock: Mutex<()>,
    snapshot: watch::Sender<Vec<WorkoutRecord>>,
}

impl WorkoutLogStore {
    pub fn new(storage: LocalStorage, clock: Arc<dyn Clock>) -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        Self {
            storage,
            clock,
            ready: AtomicBool::new(false),
            write_lock: Mutex::new(()),
            snapshot,
        }
    }

    /// Load the persisted log and mark the store ready.
    ///
    /// Missing or corrupt data starts an empty log (logged, not returned).
    pub async fn initialize(&self) -> usize {
        let _guard = self.write_lock.lock().await;
        if self.is_ready() {
            return self.snapshot.borrow().len();
        }

        let mut workouts = match self.storage.get_workouts().await {
            Ok(Some(workouts)) => workouts,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load workouts, starting empty");
                Vec::new()
            }
        };

        let assigned = workouts
            .iter_mut()
            .map(WorkoutRecord::assign_missing_id)
            .filter(|&assigned| assigned)
            .count();

        let count = workouts.len();
        self.snapshot.send_replace(workouts.clone());
        self.ready.store(true, Ordering::Release);
        tracing::info!(count, "Workout log loaded");

        // Persist new IDs once so they stay the same across launches
        if assigned > 0 {
            tracing::info!(assigned, "Assigned IDs to legacy workouts");
            if let Err(e) = self.storage.set_workouts(&workouts).await {
                tracing::error!(error = %e, "Failed to persist assigned workout IDs");
            }
        }

        count
    }

    /// Whether the initial load has finished.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(AppError::NotInitialized(STORE_NAME))
        }
    }

    /// All workouts, newest first.
    pub fn get_workouts(&self) -> Result<Vec<WorkoutRecord>> {
        self.ensure_ready()?;
        Ok(self.snapshot.borrow().clone())
    }

    /// Receive every committed workout list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<WorkoutRecord>> {
        self.snapshot.subscribe()
    }

    /// Stamp and prepend a workout, returning once the full list is persisted.
    pub async fn add_workout(&self, workout: NewWorkout) -> Result<WorkoutRecord> {
        self.ensure_ready()?;
        let _guard = self.write_lock.lock().await;

        let record = workout.into_record(self.clock.now().timestamp_millis());
        let mut next = Vec::with_capacity(self.snapshot.borrow().len() + 1);
        next.push(record.clone());
        next.extend(self.snapshot.borrow().iter().cloned());
        self.snapshot.send_replace(next.clone());

        tracing::info!(id = %record.id, name = %record.name, "Workout logged");

        if let Err(e) = self.storage.set_workouts(&next).await {
            tracing::error!(error = %e, "Failed to persist workouts");
            return Err(e);
        }

        Ok(record)
    }

    /// Empty the log and remove it from storage.
    pub async fn clear_workouts(&self) -> Result<()> {
        self.ensure_ready()?;
        let _guard = self.write_lock.lock().await;

        let cleared = self.snapshot.send_replace(Vec::new()).len();
        tracing::info!(cleared, "Workout log cleared");

        if let Err(e) = self.storage.delete_workouts().await {
            tracing::error!(error = %e, "Failed to remove persisted workouts");
            return Err(e);
        }

        Ok(())
    }
}
