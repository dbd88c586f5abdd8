//! Best/last score and speed preference storage
//!
//! The engine only ever talks to the [`ScoreStore`] trait; backends decide
//! where the bytes live. Loads are tolerant: a missing or unreadable store
//! degrades to defaults rather than blocking a game from starting.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Player-selected ball speed multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeedPreference {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SpeedPreference {
    pub fn multiplier(&self) -> f32 {
        match self {
            SpeedPreference::Slow => 0.7,
            SpeedPreference::Normal => 1.0,
            SpeedPreference::Fast => 1.4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedPreference::Slow => "slow",
            SpeedPreference::Normal => "normal",
            SpeedPreference::Fast => "fast",
        }
    }
}

/// Errors a store backend can surface
#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Format(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "store i/o error: {e}"),
            StoreError::Format(e) => write!(f, "store format error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Format(e) => Some(e),
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Format(e)
    }
}

/// Backend-agnostic score and preference storage
pub trait ScoreStore {
    fn best_score(&self) -> Result<u64, StoreError>;
    fn last_score(&self) -> Result<u64, StoreError>;
    fn set_best_score(&mut self, score: u64) -> Result<(), StoreError>;
    fn set_last_score(&mut self, score: u64) -> Result<(), StoreError>;
    fn speed_preference(&self) -> Result<SpeedPreference, StoreError>;
    fn set_speed_preference(&mut self, speed: SpeedPreference) -> Result<(), StoreError>;
}

/// Volatile store, used in tests and when no storage path is available
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    best: u64,
    last: u64,
    speed: SpeedPreference,
}

impl ScoreStore for MemoryStore {
    fn best_score(&self) -> Result<u64, StoreError> {
        Ok(self.best)
    }

    fn last_score(&self) -> Result<u64, StoreError> {
        Ok(self.last)
    }

    fn set_best_score(&mut self, score: u64) -> Result<(), StoreError> {
        self.best = score;
        Ok(())
    }

    fn set_last_score(&mut self, score: u64) -> Result<(), StoreError> {
        self.last = score;
        Ok(())
    }

    fn speed_preference(&self) -> Result<SpeedPreference, StoreError> {
        Ok(self.speed)
    }

    fn set_speed_preference(&mut self, speed: SpeedPreference) -> Result<(), StoreError> {
        self.speed = speed;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoreData {
    #[serde(default)]
    best_score: u64,
    #[serde(default)]
    last_score: u64,
    #[serde(default)]
    speed: SpeedPreference,
}

/// JSON file store for native builds. The whole document is rewritten on
/// every setter; the data is a handful of fields so that is cheap and
/// keeps the on-disk copy consistent.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: StoreData,
}

impl JsonFileStore {
    /// Open a store at `path`. A missing file starts from defaults; a
    /// corrupt one is logged and replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(data) => data,
                Err(e) => {
                    log::warn!("score store at {} is corrupt ({e}), starting fresh", path.display());
                    StoreData::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => StoreData::default(),
            Err(e) => {
                log::warn!("could not read score store at {} ({e}), starting fresh", path.display());
                StoreData::default()
            }
        };
        Self { path, data }
    }

    fn write(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl ScoreStore for JsonFileStore {
    fn best_score(&self) -> Result<u64, StoreError> {
        Ok(self.data.best_score)
    }

    fn last_score(&self) -> Result<u64, StoreError> {
        Ok(self.data.last_score)
    }

    fn set_best_score(&mut self, score: u64) -> Result<(), StoreError> {
        self.data.best_score = score;
        self.write()
    }

    fn set_last_score(&mut self, score: u64) -> Result<(), StoreError> {
        self.data.last_score = score;
        self.write()
    }

    fn speed_preference(&self) -> Result<SpeedPreference, StoreError> {
        Ok(self.data.speed)
    }

    fn set_speed_preference(&mut self, speed: SpeedPreference) -> Result<(), StoreError> {
        self.data.speed = speed;
        self.write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_multipliers() {
        assert_eq!(SpeedPreference::Slow.multiplier(), 0.7);
        assert_eq!(SpeedPreference::Normal.multiplier(), 1.0);
        assert_eq!(SpeedPreference::Fast.multiplier(), 1.4);
        assert_eq!(SpeedPreference::default(), SpeedPreference::Normal);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::default();
        assert_eq!(store.best_score().unwrap(), 0);
        store.set_best_score(1200).unwrap();
        store.set_last_score(300).unwrap();
        store.set_speed_preference(SpeedPreference::Slow).unwrap();
        assert_eq!(store.best_score().unwrap(), 1200);
        assert_eq!(store.last_score().unwrap(), 300);
        assert_eq!(store.speed_preference().unwrap(), SpeedPreference::Slow);
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        {
            let mut store = JsonFileStore::open(&path);
            store.set_best_score(555).unwrap();
            store.set_speed_preference(SpeedPreference::Fast).unwrap();
        }
        let store = JsonFileStore::open(&path);
        assert_eq!(store.best_score().unwrap(), 555);
        assert_eq!(store.last_score().unwrap(), 0);
        assert_eq!(store.speed_preference().unwrap(), SpeedPreference::Fast);
    }

    #[test]
    fn test_file_store_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("nope.json"));
        assert_eq!(store.best_score().unwrap(), 0);
        assert_eq!(store.speed_preference().unwrap(), SpeedPreference::Normal);
    }

    #[test]
    fn test_file_store_corrupt_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "{not json").unwrap();
        let mut store = JsonFileStore::open(&path);
        assert_eq!(store.best_score().unwrap(), 0);
        // Writing repairs the file
        store.set_best_score(10).unwrap();
        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.best_score().unwrap(), 10);
    }

    #[test]
    fn test_file_store_tolerates_partial_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, r#"{"best_score": 42}"#).unwrap();
        let store = JsonFileStore::open(&path);
        assert_eq!(store.best_score().unwrap(), 42);
        assert_eq!(store.last_score().unwrap(), 0);
        assert_eq!(store.speed_preference().unwrap(), SpeedPreference::Normal);
    }
}
