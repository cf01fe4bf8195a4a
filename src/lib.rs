// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! FitQuest: gamified fitness tracking core
//!
//! This crate provides the character progression engine (XP, levels,
//! streaks, quests) and the workout log, both persisted to on-device
//! key-value storage, plus the local API the mobile front end talks to.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{ProgressionStore, WorkoutLogStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub progression: ProgressionStore,
    pub workouts: WorkoutLogStore,
}
