//! Learner progress persistence.
//!
//! Records live in a [`KeyValueStore`] under `progress:<user>:<lesson>` as
//! JSON. Scoring never writes here; the caller records a finished attempt.

use academy_core::{AcademyError, KeyValueStore, ScoreResult, UserContext};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AcademyError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AcademyError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AcademyError> {
        self.entries.remove(key);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Result<String, AcademyError>,
    ) -> Result<String, AcademyError> {
        // the entry guard keeps the shard locked until the new value is in
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                let value = apply(Some(entry.get().as_str()))?;
                entry.insert(value.clone());
                Ok(value)
            }
            Entry::Vacant(entry) => {
                let value = apply(None)?;
                entry.insert(value.clone());
                Ok(value)
            }
        }
    }
}

/// Store backed by a single JSON object on disk, rewritten on every change.
/// The in-memory copy only changes once the file write has succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the file, starting empty if it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AcademyError> {
        let path = path.as_ref().to_path_buf();
        let entries: BTreeMap<String, String> = if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            if json.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&json)?
            }
        } else {
            BTreeMap::new()
        };
        tracing::debug!("Opened progress file {} ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, AcademyError> {
        self.entries
            .lock()
            .map_err(|_| AcademyError::Storage("progress store lock poisoned".to_string()))
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), AcademyError> {
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AcademyError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AcademyError> {
        let mut entries = self.lock()?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AcademyError> {
        let mut entries = self.lock()?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Result<String, AcademyError>,
    ) -> Result<String, AcademyError> {
        let mut entries = self.lock()?;
        let value = apply(entries.get(key).map(String::as_str))?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.clone());
        self.flush(&next)?;
        *entries = next;
        Ok(value)
    }
}

/// Stored outcome of a user's attempts at one lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Correct answers on the latest attempt
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    #[serde(default)]
    pub best_percentage: u32,
    /// When the latest attempt was recorded
    pub timestamp: DateTime<Utc>,
    pub attempt_count: u32,
}

pub fn progress_key(user: &str, lesson_id: u32) -> String {
    format!("progress:{}:{}", user, lesson_id)
}

#[derive(Clone)]
pub struct ProgressTracker {
    store: Arc<dyn KeyValueStore>,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn get(&self, user: &str, lesson_id: u32) -> Result<Option<ProgressRecord>, AcademyError> {
        self.store
            .get(&progress_key(user, lesson_id))?
            .map(|json| serde_json::from_str(&json).map_err(AcademyError::from))
            .transpose()
    }

    /// Record a scored attempt, bumping the attempt counter. The read and
    /// write go through one store update, so concurrent recorders sharing a
    /// store never lose an attempt.
    pub fn record(
        &self,
        user: &UserContext,
        lesson_id: u32,
        result: &ScoreResult,
        at: DateTime<Utc>,
    ) -> Result<ProgressRecord, AcademyError> {
        let percentage = result.percentage();

        let json = self.store.update(&progress_key(&user.name, lesson_id), &mut |current| {
            let previous = current
                .map(serde_json::from_str::<ProgressRecord>)
                .transpose()?;
            let record = ProgressRecord {
                score: result.correct_count,
                total: result.total,
                percentage,
                best_percentage: previous
                    .as_ref()
                    .map_or(percentage, |p| p.best_percentage.max(percentage)),
                timestamp: at,
                attempt_count: previous.as_ref().map_or(0, |p| p.attempt_count) + 1,
            };
            Ok(serde_json::to_string(&record)?)
        })?;
        let record: ProgressRecord = serde_json::from_str(&json)?;

        tracing::info!(
            "Recorded attempt {} for '{}' on lesson {}: {}%",
            record.attempt_count,
            user.name,
            lesson_id,
            percentage
        );
        Ok(record)
    }

    pub fn reset(&self, user: &str, lesson_id: u32) -> Result<(), AcademyError> {
        self.store.remove(&progress_key(user, lesson_id))
    }
}
