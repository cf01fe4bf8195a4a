// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - progression and workout log stores.

pub mod clock;
pub mod progression;
pub mod workouts;

pub use clock::{Clock, ManualClock, SystemClock};
pub use progression::ProgressionStore;
pub use workouts::WorkoutLogStore;
