// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for the progression engine and workout log.

use crate::error::{AppError, Result};
use crate::models::{Character, CharacterUpdate, NewWorkout, WorkoutRecord};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_QUEST_ID_LEN: usize = 64;

/// API routes consumed by the front end.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/character",
            get(get_character)
                .patch(update_character)
                .delete(reset_character),
        )
        .route("/api/character/xp", post(increment_xp))
        .route("/api/quests/{quest_id}/complete", post(complete_quest))
        .route(
            "/api/workouts",
            get(get_workouts).post(add_workout).delete(clear_workouts),
        )
}

// ─── Character ───────────────────────────────────────────────

/// Character plus values derived from it for display.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct CharacterResponse {
    #[serde(flatten)]
    pub character: Character,
    /// Fraction of the current level completed
    pub level_progress: f64,
    pub bmi: Option<f64>,
}

impl From<Character> for CharacterResponse {
    fn from(character: Character) -> Self {
        Self {
            level_progress: character.level_progress(),
            bmi: character.bmi(),
            character,
        }
    }
}

async fn get_character(State(state): State<Arc<AppState>>) -> Result<Json<CharacterResponse>> {
    let character = state.progression.get_character()?;
    Ok(Json(character.into()))
}

async fn update_character(
    State(state): State<Arc<AppState>>,
    Json(update): Json<CharacterUpdate>,
) -> Result<Json<CharacterResponse>> {
    let character = state.progression.update_character(update).await?;
    Ok(Json(character.into()))
}

async fn reset_character(State(state): State<Arc<AppState>>) -> Result<Json<CharacterResponse>> {
    let character = state.progression.reset_character().await?;
    Ok(Json(character.into()))
}

#[derive(Deserialize)]
struct XpRequest {
    amount: u64,
}

async fn increment_xp(
    State(state): State<Arc<AppState>>,
    Json(request): Json<XpRequest>,
) -> Result<Json<CharacterResponse>> {
    let character = state.progression.increment_xp(request.amount).await?;
    Ok(Json(character.into()))
}

// ─── Quests ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestCompletionRequest {
    xp_reward: u64,
}

/// Complete a quest for today.
///
/// The front end is responsible for not completing the same quest twice.
async fn complete_quest(
    State(state): State<Arc<AppState>>,
    Path(quest_id): Path<String>,
    Json(request): Json<QuestCompletionRequest>,
) -> Result<Json<CharacterResponse>> {
    if quest_id.trim().is_empty() || quest_id.len() > MAX_QUEST_ID_LEN {
        return Err(AppError::BadRequest(format!(
            "Quest ID must be 1-{} characters",
            MAX_QUEST_ID_LEN
        )));
    }

    let character = state
        .progression
        .complete_quest(&quest_id, request.xp_reward)
        .await?;
    Ok(Json(character.into()))
}

// ─── Workouts ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct AddWorkoutRequest {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    sets: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    reps: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    weight: String,
}

async fn get_workouts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<WorkoutRecord>>> {
    Ok(Json(state.workouts.get_workouts()?))
}

async fn add_workout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddWorkoutRequest>,
) -> Result<(StatusCode, Json<WorkoutRecord>)> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let record = state
        .workouts
        .add_workout(NewWorkout::new(
            request.name,
            request.sets,
            request.reps,
            request.weight,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

async fn clear_workouts(State(state): State<Arc<AppState>>) -> Result<StatusCode> {
    state.workouts.clear_workouts().await?;
    Ok(StatusCode::NO_CONTENT)
}
