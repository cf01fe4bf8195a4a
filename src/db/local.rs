// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local key-value storage with typed operations.
//!
//! Provides raw `get`/`set`/`remove` on string values plus typed helpers for:
//! - Character (progression record)
//! - Workouts (workout log)

use crate::db::keys;
use crate::error::AppError;
use crate::models::{Character, WorkoutRecord};
use anyhow::Context;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the values actually live.
#[derive(Clone)]
enum Backend {
    /// One `<key>.json` file per key in a data directory.
    Files(Arc<PathBuf>),
    /// Process memory only, lost on exit.
    Memory(Arc<DashMap<String, String>>),
}

/// Durable key-value storage client.
#[derive(Clone)]
pub struct LocalStorage {
    backend: Option<Backend>,
}

impl LocalStorage {
    /// Open file-backed storage rooted at `dir`, creating it if needed.
    pub async fn open<P: AsRef<Path>>(dir: P) -> Result<Self, AppError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::StorageRead(format!(
                "Failed to create data directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        tracing::info!(path = %dir.display(), "Opened local storage");

        Ok(Self {
            backend: Some(Backend::Files(Arc::new(dir))),
        })
    }

    /// In-memory storage, for tests and throwaway sessions.
    pub fn new_memory() -> Self {
        Self {
            backend: Some(Backend::Memory(Arc::new(DashMap::new()))),
        }
    }

    /// Create an offline storage client for testing.
    ///
    /// Every operation returns an error.
    pub fn new_mock() -> Self {
        Self { backend: None }
    }

    /// Helper to get the backend or build the error for offline mode.
    fn get_backend(&self, err: fn(String) -> AppError) -> Result<&Backend, AppError> {
        self.backend
            .as_ref()
            .ok_or_else(|| err("Storage not available (offline mode)".to_string()))
    }

    fn key_path(
        dir: &Path,
        key: &str,
        err: fn(String) -> AppError,
    ) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(err(format!("Invalid storage key: {:?}", key)));
        }
        Ok(dir.join(format!("{}.json", key)))
    }

    // ─── Raw Operations ──────────────────────────────────────────

    /// Read the value stored under `key`, if any.
    pub async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        match self.get_backend(AppError::StorageRead)? {
            Backend::Files(dir) => {
                let path = Self::key_path(dir, key, AppError::StorageRead)?;
                match tokio::fs::read_to_string(&path).await {
                    Ok(value) => Ok(Some(value)),
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(AppError::StorageRead(format!(
                        "Failed to read {}: {}",
                        path.display(),
                        e
                    ))),
                }
            }
            Backend::Memory(map) => Ok(map.get(key).map(|v| v.value().clone())),
        }
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// File writes go through a temp file and a rename so a crash mid-write
    /// leaves the previous value intact.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        match self.get_backend(AppError::StorageWrite)? {
            Backend::Files(dir) => {
                let path = Self::key_path(dir, key, AppError::StorageWrite)?;
                let tmp_path = path.with_extension("json.tmp");
                let write_err = |e: std::io::Error| {
                    AppError::StorageWrite(format!("Failed to write {}: {}", path.display(), e))
                };

                tokio::fs::write(&tmp_path, value).await.map_err(write_err)?;
                tokio::fs::rename(&tmp_path, &path).await.map_err(write_err)?;
                Ok(())
            }
            Backend::Memory(map) => {
                map.insert(key.to_string(), value.to_string());
                Ok(())
            }
        }
    }

    /// Remove the value under `key`. Removing a missing key is not an error.
    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        match self.get_backend(AppError::StorageWrite)? {
            Backend::Files(dir) => {
                let path = Self::key_path(dir, key, AppError::StorageWrite)?;
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(AppError::StorageWrite(format!(
                        "Failed to remove {}: {}",
                        path.display(),
                        e
                    ))),
                }
            }
            Backend::Memory(map) => {
                map.remove(key);
                Ok(())
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let Some(raw) = self.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| AppError::StorageRead(format!("Corrupt {} record: {}", key, e)))
    }

    async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("Failed to encode {} record", key))?;
        self.set(key, &raw).await
    }

    // ─── Character Operations ────────────────────────────────────

    /// Get the stored character, if one was ever saved.
    pub async fn get_character(&self) -> Result<Option<Character>, AppError> {
        self.get_json(keys::CHARACTER).await
    }

    /// Store the character.
    pub async fn set_character(&self, character: &Character) -> Result<(), AppError> {
        self.set_json(keys::CHARACTER, character).await
    }

    // ─── Workout Operations ──────────────────────────────────────

    /// Get the stored workout list, newest first.
    pub async fn get_workouts(&self) -> Result<Option<Vec<WorkoutRecord>>, AppError> {
        self.get_json(keys::WORKOUTS).await
    }

    /// Store the full workout list.
    pub async fn set_workouts(&self, workouts: &[WorkoutRecord]) -> Result<(), AppError> {
        self.set_json(keys::WORKOUTS, workouts).await
    }

    /// Delete the workout list.
    pub async fn delete_workouts(&self) -> Result<(), AppError> {
        self.remove(keys::WORKOUTS).await
    }
}
