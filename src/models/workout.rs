// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout log model for storage and API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One logged exercise, stored newest first under the `workouts` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct WorkoutRecord {
    /// Unique record ID; nil in records written before IDs existed, until
    /// the store assigns one on load
    #[serde(default)]
    pub id: Uuid,
    /// Exercise name
    pub name: String,
    /// Sets, reps and weight are free text, stored exactly as entered
    pub sets: String,
    pub reps: String,
    pub weight: String,
    /// Creation time in milliseconds since the Unix epoch
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub timestamp: i64,
}

impl WorkoutRecord {
    /// Give a record loaded without an ID a fresh one. Returns whether it did.
    pub fn assign_missing_id(&mut self) -> bool {
        if self.id.is_nil() {
            self.id = Uuid::new_v4();
            true
        } else {
            false
        }
    }
}

/// Caller-supplied fields for a new workout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewWorkout {
    pub name: String,
    pub sets: String,
    pub reps: String,
    pub weight: String,
}

impl NewWorkout {
    pub fn new(
        name: impl Into<String>,
        sets: impl Into<String>,
        reps: impl Into<String>,
        weight: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sets: sets.into(),
            reps: reps.into(),
            weight: weight.into(),
        }
    }

    /// Stamp the workout with a fresh ID and creation time.
    pub fn into_record(self, timestamp: i64) -> WorkoutRecord {
        WorkoutRecord {
            id: Uuid::new_v4(),
            name: self.name,
            sets: self.sets,
            reps: self.reps,
            weight: self.weight,
            timestamp,
        }
    }
}
