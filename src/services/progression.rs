// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Character progression store.
//!
//! Owns the single character record:
//! 1. Load it once at startup (falling back to defaults)
//! 2. Apply leveling and streak rules in memory
//! 3. Persist the full record after every mutation
//! 4. Publish each committed snapshot to subscribers

use crate::db::LocalStorage;
use crate::error::{AppError, Result};
use crate::models::{Character, CharacterUpdate};
use crate::services::clock::Clock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

const STORE_NAME: &str = "progression";

/// Progression engine over the persisted character.
///
/// Mutations hold `write_lock` across the awaited storage write, so writes
/// land in the order the mutations were issued.
pub struct ProgressionStore {
    storage: LocalStorage,
    clock: Arc<dyn Clock>,
    ready: AtomicBool,
    write_lock: Mutex<()>,
    snapshot: watch::Sender<Character>,
}

impl ProgressionStore {
    pub fn new(storage: LocalStorage, clock: Arc<dyn Clock>) -> Self {
        let (snapshot, _) = watch::channel(Character::default());
        Self {
            storage,
            clock,
            ready: AtomicBool::new(false),
            write_lock: Mutex::new(()),
            snapshot,
        }
    }

    /// Load the persisted character and mark the store ready.
    ///
    /// Missing, unreadable or corrupt data falls back to a fresh character;
    /// the failure is logged, never returned. A stale streak is zeroed.
    /// Calling this again after the store is ready does nothing.
    pub async fn initialize(&self) -> Character {
        let _guard = self.write_lock.lock().await;
        if self.is_ready() {
            return self.snapshot.borrow().clone();
        }

        let mut character = match self.storage.get_character().await {
            Ok(Some(character)) => character,
            Ok(None) => {
                tracing::info!("No saved character, starting fresh");
                Character::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load character, using defaults");
                Character::default()
            }
        };

        character.normalize();
        let today = self.clock.today();
        let decayed = character.decay_streak(today);

        self.snapshot.send_replace(character.clone());
        self.ready.store(true, Ordering::Release);

        tracing::info!(
            level = character.level,
            total_xp = character.total_xp,
            streak = character.streak,
            "Character loaded"
        );

        if decayed {
            tracing::info!(last_workout = ?character.last_workout, %today, "Streak expired");
            if let Err(e) = self.storage.set_character(&character).await {
                tracing::error!(error = %e, "Failed to persist expired streak");
            }
        }

        character
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

    /// Current character snapshot.
    pub fn get_character(&self) -> Result<Character> {
        self.ensure_ready()?;
        Ok(self.snapshot.borrow().clone())
    }

    /// Receive every committed character snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Character> {
        self.snapshot.subscribe()
    }

    /// Merge the present fields of `update` into the character.
    pub async fn update_character(&self, update: CharacterUpdate) -> Result<Character> {
        self.mutate("update_character", |character| character.apply_update(update))
            .await
    }

    /// Award XP, rolling any overflow into level-ups.
    pub async fn increment_xp(&self, amount: u64) -> Result<Character> {
        self.mutate("increment_xp", |character| {
            let gained = character.add_xp(amount);
            if gained > 0 {
                tracing::info!(level = character.level, gained, "Level up");
            }
        })
        .await
    }

    /// Record a completed quest for today: streak, reward, quest count and
    /// last activity day commit as one write.
    ///
    /// Completing the same quest twice is not detected here; callers track
    /// which quests are already done.
    pub async fn complete_quest(&self, quest_id: &str, xp_reward: u64) -> Result<Character> {
        let clock = &self.clock;
        self.mutate("complete_quest", |character| {
            // Read under the write lock; a caller may have waited past midnight
            let today = clock.today();
            let gained = character.complete_quest(today, xp_reward);
            tracing::info!(
                quest_id,
                xp_reward,
                streak = character.streak,
                level = character.level,
                gained,
                "Quest completed"
            );
        })
        .await
    }

    /// Replace the character with a fresh default one.
    pub async fn reset_character(&self) -> Result<Character> {
        self.mutate("reset_character", |character| {
            *character = Character::default();
            tracing::info!("Character reset");
        })
        .await
    }

    /// Apply `f` to a copy of the current character, publish it, then persist it.
    ///
    /// A failed write still leaves the new state in memory for this session;
    /// the next successful mutation writes the full record again.
    async fn mutate<F>(&self, op: &'static str, f: F) -> Result<Character>
    where
        F: FnOnce(&mut Character),
    {
        self.ensure_ready()?;
        let _guard = self.write_lock.lock().await;

        let mut next = self.snapshot.borrow().clone();
        f(&mut next);
        self.snapshot.send_replace(next.clone());

        if let Err(e) = self.storage.set_character(&next).await {
            tracing::error!(error = %e, op, "Failed to persist character");
            return Err(e);
        }

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    fn store_with(storage: LocalStorage) -> ProgressionStore {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        ProgressionStore::new(storage, Arc::new(clock))
    }

    #[tokio::test]
    async fn test_operations_fail_before_initialize() {
        let store = store_with(LocalStorage::new_memory());

        assert!(!store.is_ready());
        assert!(matches!(
            store.get_character(),
            Err(AppError::NotInitialized(_))
        ));
        assert!(matches!(
            store.increment_xp(10).await,
            Err(AppError::NotInitialized(_))
        ));
    }

    #[tokio::test]
    async fn test_initialize_twice_keeps_state() {
        let store = store_with(LocalStorage::new_memory());
        store.initialize().await;
        store.increment_xp(42).await.unwrap();

        let again = store.initialize().await;
        assert_eq!(again.xp, 42);
    }

    #[tokio::test]
    async fn test_subscribers_see_each_commit() {
        let store = store_with(LocalStorage::new_memory());
        store.initialize().await;
        let mut rx = store.subscribe();

        store.increment_xp(120).await.unwrap();
        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.level, 2);
        assert_eq!(seen.xp, 20);
    }

    #[tokio::test]
    async fn test_quest_waiting_on_lock_uses_day_it_commits() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 0).unwrap(),
        ));
        let store = Arc::new(ProgressionStore::new(
            LocalStorage::new_memory(),
            clock.clone(),
        ));
        store.initialize().await;

        let guard = store.write_lock.lock().await;
        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.complete_quest("quest1", 50).await }
        });
        tokio::task::yield_now().await;

        clock.advance_days(1);
        drop(guard);

        let character = pending.await.unwrap().unwrap();
        assert_eq!(
            character.last_workout,
            Some(chrono::NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
        );
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state() {
        let store = store_with(LocalStorage::new_mock());
        let loaded = store.initialize().await;
        assert_eq!(loaded, Character::default());

        let result = store.increment_xp(30).await;
        assert!(matches!(result, Err(AppError::StorageWrite(_))));
        assert_eq!(store.get_character().unwrap().xp, 30);
    }
}
