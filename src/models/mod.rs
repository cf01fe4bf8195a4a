// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod character;
pub mod workout;

pub use character::{xp_to_next_level, Character, CharacterUpdate, Gender};
pub use workout::{NewWorkout, WorkoutRecord};
