// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Character progression model.
//!
//! Holds the leveling and streak rules as pure functions of the current
//! state and a calendar day. Persistence lives in the progression store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::days_between;

/// Display name given to a fresh character.
pub const DEFAULT_NAME: &str = "Adventurer";

/// XP needed to leave level 1.
const BASE_XP_TO_NEXT_LEVEL: u64 = 100;

/// Cosmetic only; selects avatar imagery in the front end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

/// The player's character, stored under the `character` key.
///
/// Field names follow the camelCase layout the mobile app already writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
#[serde(rename_all = "camelCase", default)]
pub struct Character {
    pub name: String,
    pub level: u32,
    /// Progress within the current level, always below `xp_to_next_level`
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub xp: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub xp_to_next_level: u64,
    /// Lifetime XP, never reduced by leveling
    #[serde(rename = "totalXP")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_xp: u64,
    pub streak: u32,
    /// Day of the last activity that advanced the streak
    pub last_workout: Option<NaiveDate>,
    pub quests_completed: u32,
    pub gender: Gender,
    /// Height in centimeters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Weight in kilograms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            level: 1,
            xp: 0,
            xp_to_next_level: BASE_XP_TO_NEXT_LEVEL,
            total_xp: 0,
            streak: 0,
            last_workout: None,
            quests_completed: 0,
            gender: Gender::Male,
            height: None,
            weight: None,
            goal: None,
        }
    }
}

/// Partial character update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterUpdate {
    pub name: Option<String>,
    pub level: Option<u32>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub xp: Option<u64>,
    #[serde(rename = "totalXP")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub total_xp: Option<u64>,
    pub streak: Option<u32>,
    pub last_workout: Option<NaiveDate>,
    pub quests_completed: Option<u32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub goal: Option<String>,
}

/// XP required to advance from `level` to the next one:
/// `floor(100 * 1.2^(level - 1))`.
///
/// Uses exact integer arithmetic (1.2 = 6/5) while it fits in `u128` so the
/// low levels never suffer float rounding, and saturates beyond that.
pub fn xp_to_next_level(level: u32) -> u64 {
    let steps = level.saturating_sub(1);

    let exact = 6u128
        .checked_pow(steps)
        .and_then(|num| num.checked_mul(u128::from(BASE_XP_TO_NEXT_LEVEL)))
        .zip(5u128.checked_pow(steps))
        .map(|(num, den)| num / den);

    match exact {
        Some(value) => u64::try_from(value).unwrap_or(u64::MAX),
        // Float-to-int casts saturate, which is what we want up here.
        None => (BASE_XP_TO_NEXT_LEVEL as f64 * 1.2f64.powf(f64::from(steps))) as u64,
    }
}

impl Character {
    /// Add XP and roll any overflow into level-ups.
    ///
    /// Returns the number of levels gained (possibly several for a large award).
    pub fn add_xp(&mut self, amount: u64) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        self.total_xp = self.total_xp.saturating_add(amount);
        self.roll_over_levels()
    }

    fn roll_over_levels(&mut self) -> u32 {
        let mut gained = 0;
        while self.xp >= self.xp_to_next_level {
            self.xp -= self.xp_to_next_level;
            self.level = self.level.saturating_add(1);
            self.xp_to_next_level = xp_to_next_level(self.level);
            gained += 1;
        }
        gained
    }

    /// Advance the streak for activity on `today`.
    ///
    /// Same day keeps the streak, the next day extends it, a longer gap
    /// starts a new streak at 1. A `last_workout` in the future (clock skew)
    /// is treated like the same day.
    pub fn advance_streak(&mut self, today: NaiveDate) {
        let Some(last) = self.last_workout else {
            self.streak = 1;
            return;
        };

        match days_between(last, today) {
            1 => self.streak = self.streak.saturating_add(1),
            gap if gap > 1 => self.streak = 1,
            _ => {}
        }
    }

    /// Record a completed quest on `today`: streak, XP reward, quest count
    /// and last activity day, applied together.
    ///
    /// Returns the number of levels gained.
    pub fn complete_quest(&mut self, today: NaiveDate, xp_reward: u64) -> u32 {
        self.advance_streak(today);
        let gained = self.add_xp(xp_reward);
        self.quests_completed = self.quests_completed.saturating_add(1);
        self.last_workout = Some(today);
        gained
    }

    /// Passive check run when the app loads.
    ///
    /// Zeroes the streak when more than one day has passed without activity.
    /// Never increases it and leaves `last_workout` alone, so the next quest
    /// still starts a fresh streak at 1. Returns `true` if anything changed.
    pub fn decay_streak(&mut self, today: NaiveDate) -> bool {
        match self.last_workout {
            Some(last) if days_between(last, today) > 1 && self.streak != 0 => {
                self.streak = 0;
                true
            }
            _ => false,
        }
    }

    /// Shallow-merge `update` into this character, then restore the XP invariant.
    pub fn apply_update(&mut self, update: CharacterUpdate) {
        let CharacterUpdate {
            name,
            level,
            xp,
            total_xp,
            streak,
            last_workout,
            quests_completed,
            gender,
            height,
            weight,
            goal,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(level) = level {
            self.level = level;
        }
        if let Some(xp) = xp {
            self.xp = xp;
        }
        if let Some(total_xp) = total_xp {
            self.total_xp = total_xp;
        }
        if let Some(streak) = streak {
            self.streak = streak;
        }
        if last_workout.is_some() {
            self.last_workout = last_workout;
        }
        if let Some(quests_completed) = quests_completed {
            self.quests_completed = quests_completed;
        }
        if let Some(gender) = gender {
            self.gender = gender;
        }
        if height.is_some() {
            self.height = height;
        }
        if weight.is_some() {
            self.weight = weight;
        }
        if goal.is_some() {
            self.goal = goal;
        }

        self.normalize();
    }

    /// Repair a record that may have been edited or written by an older build:
    /// level at least 1, threshold matching the level, XP below the threshold.
    ///
    /// Returns the number of levels gained while restoring the invariant.
    pub fn normalize(&mut self) -> u32 {
        self.level = self.level.max(1);
        self.xp_to_next_level = xp_to_next_level(self.level);
        self.roll_over_levels()
    }

    /// Fraction of the current level completed, in `[0, 1)`.
    pub fn level_progress(&self) -> f64 {
        self.xp as f64 / self.xp_to_next_level as f64
    }

    /// Body mass index from height (cm) and weight (kg), rounded to one decimal.
    pub fn bmi(&self) -> Option<f64> {
        match (self.height, self.weight) {
            (Some(height), Some(weight)) if height > 0.0 && weight > 0.0 => {
                let meters = height / 100.0;
                Some((weight / (meters * meters) * 10.0).round() / 10.0)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assert_invariant(character: &Character) {
        assert!(
            character.xp < character.xp_to_next_level,
            "xp {} must stay below threshold {}",
            character.xp,
            character.xp_to_next_level
        );
        assert_eq!(character.xp_to_next_level, xp_to_next_level(character.level));
    }

    #[test]
    fn test_threshold_curve() {
        assert_eq!(xp_to_next_level(1), 100);
        assert_eq!(xp_to_next_level(2), 120);
        assert_eq!(xp_to_next_level(3), 144);
        assert_eq!(xp_to_next_level(4), 172); // 172.8
        assert_eq!(xp_to_next_level(5), 207); // 207.36
        assert_eq!(xp_to_next_level(11), 619); // 619.17...
    }

    #[test]
    fn test_threshold_level_zero_treated_as_one() {
        assert_eq!(xp_to_next_level(0), 100);
    }

    #[test]
    fn test_threshold_saturates_at_high_levels() {
        assert!(xp_to_next_level(60) > xp_to_next_level(59));
        assert_eq!(xp_to_next_level(u32::MAX), u64::MAX);
    }

    #[test]
    fn test_add_xp_below_threshold() {
        let mut character = Character::default();
        let gained = character.add_xp(99);

        assert_eq!(gained, 0);
        assert_eq!(character.level, 1);
        assert_eq!(character.xp, 99);
        assert_eq!(character.total_xp, 99);
    }

    #[test]
    fn test_add_xp_exact_threshold_levels_up() {
        let mut character = Character::default();
        let gained = character.add_xp(100);

        assert_eq!(gained, 1);
        assert_eq!(character.level, 2);
        assert_eq!(character.xp, 0);
        assert_eq!(character.xp_to_next_level, 120);
    }

    #[test]
    fn test_add_xp_250_rolls_over_twice() {
        // 250 -> level 2 with 150 left, 150 >= 120 -> level 3 with 30 left
        let mut character = Character::default();
        let gained = character.add_xp(250);

        assert_eq!(gained, 2);
        assert_eq!(character.level, 3);
        assert_eq!(character.xp, 30);
        assert_eq!(character.xp_to_next_level, 144);
        assert_eq!(character.total_xp, 250);
        assert_invariant(&character);
    }

    #[test]
    fn test_add_xp_huge_award_many_levels() {
        let mut character = Character::default();
        character.add_xp(1_000_000);

        assert!(character.level > 30);
        assert_eq!(character.total_xp, 1_000_000);
        assert_invariant(&character);
    }

    #[test]
    fn test_first_quest_starts_streak() {
        let mut character = Character::default();
        character.complete_quest(day(2024, 5, 1), 50);

        assert_eq!(character.streak, 1);
        assert_eq!(character.last_workout, Some(day(2024, 5, 1)));
        assert_eq!(character.quests_completed, 1);
        assert_eq!(character.xp, 50);
    }

    #[test]
    fn test_same_day_quests_keep_streak_but_add_xp() {
        let mut character = Character::default();
        character.complete_quest(day(2024, 5, 1), 50);
        character.complete_quest(day(2024, 5, 1), 30);

        assert_eq!(character.streak, 1);
        assert_eq!(character.quests_completed, 2);
        assert_eq!(character.total_xp, 80);
    }

    #[test]
    fn test_consecutive_days_extend_streak() {
        let mut character = Character::default();
        character.complete_quest(day(2024, 5, 1), 10);
        character.complete_quest(day(2024, 5, 2), 10);
        character.complete_quest(day(2024, 5, 3), 10);

        assert_eq!(character.streak, 3);
    }

    #[test]
    fn test_gap_restarts_streak_at_one() {
        let mut character = Character::default();
        character.complete_quest(day(2024, 5, 1), 10);
        character.complete_quest(day(2024, 5, 2), 10);
        character.complete_quest(day(2024, 5, 7), 10);

        assert_eq!(character.streak, 1);
        assert_eq!(character.last_workout, Some(day(2024, 5, 7)));
    }

    #[test]
    fn test_clock_skew_leaves_streak_alone() {
        let mut character = Character::default();
        character.complete_quest(day(2024, 5, 10), 10);
        character.complete_quest(day(2024, 5, 11), 10);
        character.advance_streak(day(2024, 5, 8));

        assert_eq!(character.streak, 2);
    }

    #[test]
    fn test_decay_zeroes_stale_streak() {
        let mut character = Character {
            streak: 4,
            last_workout: Some(day(2024, 5, 1)),
            ..Character::default()
        };

        assert!(character.decay_streak(day(2024, 5, 4)));
        assert_eq!(character.streak, 0);
        assert_eq!(character.last_workout, Some(day(2024, 5, 1)));

        // A quest after decay starts a new streak
        character.complete_quest(day(2024, 5, 4), 10);
        assert_eq!(character.streak, 1);
    }

    #[test]
    fn test_decay_never_increases_streak() {
        let mut character = Character {
            streak: 4,
            last_workout: Some(day(2024, 5, 1)),
            ..Character::default()
        };

        assert!(!character.decay_streak(day(2024, 5, 2)));
        assert!(!character.decay_streak(day(2024, 5, 1)));
        assert_eq!(character.streak, 4);
    }

    #[test]
    fn test_apply_update_merges_present_fields_only() {
        let mut character = Character::default();
        character.add_xp(40);

        character.apply_update(CharacterUpdate {
            name: Some("Brienne".to_string()),
            height: Some(180.0),
            goal: Some("Run a 10k".to_string()),
            ..CharacterUpdate::default()
        });

        assert_eq!(character.name, "Brienne");
        assert_eq!(character.height, Some(180.0));
        assert_eq!(character.goal.as_deref(), Some("Run a 10k"));
        assert_eq!(character.weight, None);
        assert_eq!(character.xp, 40);
        assert_eq!(character.gender, Gender::Male);
    }

    #[test]
    fn test_apply_update_restores_xp_invariant() {
        let mut character = Character::default();
        character.apply_update(CharacterUpdate {
            level: Some(2),
            xp: Some(500),
            ..CharacterUpdate::default()
        });

        // 500 - 120 - 144 - 172 = 64 at level 5 (threshold 207)
        assert_eq!(character.level, 5);
        assert_eq!(character.xp, 64);
        assert_invariant(&character);
    }

    #[test]
    fn test_normalize_repairs_bad_record() {
        let mut character = Character {
            level: 0,
            xp: 130,
            xp_to_next_level: 7,
            ..Character::default()
        };
        character.normalize();

        assert_eq!(character.level, 2);
        assert_eq!(character.xp, 30);
        assert_invariant(&character);
    }

    #[test]
    fn test_bmi() {
        let character = Character {
            height: Some(170.0),
            weight: Some(70.0),
            ..Character::default()
        };
        assert_eq!(character.bmi(), Some(24.2));

        let missing = Character {
            height: Some(170.0),
            ..Character::default()
        };
        assert_eq!(missing.bmi(), None);
    }

    #[test]
    fn test_level_progress() {
        let mut character = Character::default();
        character.add_xp(25);
        assert!((character.level_progress() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deserializes_app_layout() {
        let json = r#"{
            "name": "Adventurer",
            "level": 3,
            "xp": 12,
            "xpToNextLevel": 144,
            "totalXP": 232,
            "streak": 2,
            "lastWorkout": "2024-05-02",
            "questsCompleted": 5,
            "gender": "female",
            "height": 165,
            "goal": "Get stronger"
        }"#;

        let character: Character = serde_json::from_str(json).unwrap();
        assert_eq!(character.level, 3);
        assert_eq!(character.total_xp, 232);
        assert_eq!(character.last_workout, Some(day(2024, 5, 2)));
        assert_eq!(character.gender, Gender::Female);
        assert_eq!(character.height, Some(165.0));
        assert_eq!(character.weight, None);
    }

    #[test]
    fn test_null_last_workout_and_missing_fields_default() {
        let character: Character =
            serde_json::from_str(r#"{"name":"Sam","lastWorkout":null}"#).unwrap();
        assert_eq!(character.name, "Sam");
        assert_eq!(character.last_workout, None);
        assert_eq!(character.level, 1);
        assert_eq!(character.xp_to_next_level, 100);
    }

    #[test]
    fn test_serializes_camel_case_keys() {
        let value = serde_json::to_value(Character::default()).unwrap();
        assert_eq!(value["xpToNextLevel"], 100);
        assert_eq!(value["totalXP"], 0);
        assert_eq!(value["questsCompleted"], 0);
        assert!(value["lastWorkout"].is_null());
        assert!(value.get("height").is_none());
    }
}
