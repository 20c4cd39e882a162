//! Bounded, persisted lists of finished rounds.
//!
//! Each list is stored under its own key as a JSON array, newest first. Loading
//! is all-or-nothing: a batch that fails to parse or validate is discarded and
//! the list starts empty.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::difficulty::{Difficulty, DrillDifficulty};
use crate::scoring::KeyAnalytics;

/// Most recent entries kept per list
pub const HISTORY_LIMIT: usize = 20;

pub const DRILL_HISTORY_KEY: &str = "drill_history";
pub const PRACTICE_HISTORY_KEY: &str = "practice_history";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillHistoryItem {
    pub timestamp: i64,
    pub difficulty: DrillDifficulty,
    pub score: u32,
    pub accuracy: u32,
    pub duration: u64,
    pub cpm: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeHistoryItem {
    pub timestamp: i64,
    pub difficulty: Difficulty,
    pub wpm: u32,
    pub accuracy: u32,
    pub duration: u64,
    #[serde(
        rename = "keyAnalytics",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub key_analytics: Option<KeyAnalytics>,
}

/// A finished round worth keeping
#[derive(Debug, Clone, PartialEq)]
pub enum RoundRecord {
    Practice(PracticeHistoryItem),
    Drill(DrillHistoryItem),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("history is not valid json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("history entry {index} is invalid: {reason}")]
    Invalid { index: usize, reason: &'static str },
}

/// Checks beyond what the typed deserialization already enforces
pub trait Validate {
    fn validate(&self) -> Result<(), &'static str>;
}

fn validate_common(timestamp: i64, accuracy: u32) -> Result<(), &'static str> {
    if timestamp < 0 {
        return Err("negative timestamp");
    }
    if accuracy > 100 {
        return Err("accuracy above 100");
    }
    Ok(())
}

impl Validate for DrillHistoryItem {
    fn validate(&self) -> Result<(), &'static str> {
        validate_common(self.timestamp, self.accuracy)
    }
}

impl Validate for PracticeHistoryItem {
    fn validate(&self) -> Result<(), &'static str> {
        validate_common(self.timestamp, self.accuracy)?;
        if let Some(analytics) = &self.key_analytics {
            for stat in analytics.values() {
                if stat.errors > stat.total || !stat.avg_latency.is_finite() || stat.avg_latency < 0.0 {
                    return Err("inconsistent key analytics");
                }
            }
        }
        Ok(())
    }
}

/// Parse and validate a whole batch; any bad entry rejects all of them
pub fn parse_batch<T>(raw: &str) -> Result<Vec<T>, HistoryError>
where
    T: DeserializeOwned + Validate,
{
    let items: Vec<T> = serde_json::from_str(raw)?;
    for (index, item) in items.iter().enumerate() {
        item.validate()
            .map_err(|reason| HistoryError::Invalid { index, reason })?;
    }
    Ok(items)
}

/// Key/value persistence for serialized history lists
pub trait HistoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, HistoryError>;
    fn write(&self, key: &str, contents: &str) -> Result<(), HistoryError>;
}

impl<S: HistoryStorage + ?Sized> HistoryStorage for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, HistoryError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), HistoryError> {
        (**self).write(key, contents)
    }
}

/// One `<key>.json` file per list inside a directory
#[derive(Debug, Clone)]
pub struct FileHistoryStorage {
    dir: PathBuf,
}

impl FileHistoryStorage {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl HistoryStorage for FileHistoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, HistoryError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), HistoryError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), contents)?;
        Ok(())
    }
}

/// In-memory storage for headless runs
#[derive(Debug, Default)]
pub struct MemoryHistoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryHistoryStorage {
    pub fn with_entry(key: &str, contents: &str) -> Self {
        let storage = Self::default();
        storage
            .entries
            .borrow_mut()
            .insert(key.to_string(), contents.to_string());
        storage
    }
}

impl HistoryStorage for MemoryHistoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, HistoryError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), HistoryError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), contents.to_string());
        Ok(())
    }
}

/// Drill and practice history backed by a storage
#[derive(Debug)]
pub struct History<S: HistoryStorage> {
    storage: S,
    drill: Vec<DrillHistoryItem>,
    practice: Vec<PracticeHistoryItem>,
}

impl<S: HistoryStorage> History<S> {
    pub fn load(storage: S) -> Self {
        let drill = load_list(&storage, DRILL_HISTORY_KEY);
        let practice = load_list(&storage, PRACTICE_HISTORY_KEY);
        tracing::debug!(
            target: "history",
            drill = drill.len(),
            practice = practice.len(),
            "history_loaded"
        );
        Self {
            storage,
            drill,
            practice,
        }
    }

    pub fn drill(&self) -> &[DrillHistoryItem] {
        &self.drill
    }

    pub fn practice(&self) -> &[PracticeHistoryItem] {
        &self.practice
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn record(&mut self, record: RoundRecord) {
        match record {
            RoundRecord::Practice(item) => self.record_practice(item),
            RoundRecord::Drill(item) => self.record_drill(item),
        }
    }

    pub fn record_drill(&mut self, item: DrillHistoryItem) {
        push_bounded(&mut self.drill, item);
        persist(&self.storage, DRILL_HISTORY_KEY, &self.drill);
    }

    pub fn record_practice(&mut self, item: PracticeHistoryItem) {
        push_bounded(&mut self.practice, item);
        persist(&self.storage, PRACTICE_HISTORY_KEY, &self.practice);
    }
}

fn push_bounded<T>(list: &mut Vec<T>, item: T) {
    list.insert(0, item);
    list.truncate(HISTORY_LIMIT);
}

fn load_list<T, S>(storage: &S, key: &str) -> Vec<T>
where
    T: DeserializeOwned + Validate,
    S: HistoryStorage,
{
    let raw = match storage.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(target: "history", key, error = %e, "history_read_failed");
            return Vec::new();
        }
    };

    match parse_batch::<T>(&raw) {
        Ok(mut items) => {
            items.truncate(HISTORY_LIMIT);
            items
        }
        Err(e) => {
            tracing::warn!(target: "history", key, error = %e, "history_discarded");
            Vec::new()
        }
    }
}

fn persist<T: Serialize, S: HistoryStorage>(storage: &S, key: &str, items: &[T]) {
    let result = serde_json::to_string(items)
        .map_err(HistoryError::from)
        .and_then(|json| storage.write(key, &json));
    if let Err(e) = result {
        tracing::warn!(target: "history", key, error = %e, "history_write_failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::KeyStat;
    use assert_matches::assert_matches;

    fn drill_item(timestamp: i64) -> DrillHistoryItem {
        DrillHistoryItem {
            timestamp,
            difficulty: DrillDifficulty::HomeRow,
            score: 10,
            accuracy: 90,
            duration: 5,
            cpm: 120,
        }
    }

    fn practice_item(timestamp: i64) -> PracticeHistoryItem {
        PracticeHistoryItem {
            timestamp,
            difficulty: Difficulty::Advanced,
            wpm: 55,
            accuracy: 97,
            duration: 40,
            key_analytics: None,
        }
    }

    #[test]
    fn test_record_prepends() {
        let mut history = History::load(MemoryHistoryStorage::default());
        history.record_drill(drill_item(1));
        history.record_drill(drill_item(2));

        assert_eq!(history.drill()[0].timestamp, 2);
        assert_eq!(history.drill()[1].timestamp, 1);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut history = History::load(MemoryHistoryStorage::default());
        for ts in 1..=21 {
            history.record_practice(practice_item(ts));
        }

        assert_eq!(history.practice().len(), HISTORY_LIMIT);
        assert_eq!(history.practice()[0].timestamp, 21);
        assert_eq!(history.practice()[19].timestamp, 2);
        assert!(history.practice().iter().all(|i| i.timestamp != 1));
    }

    #[test]
    fn test_record_persists_and_reloads() {
        let mut history = History::load(MemoryHistoryStorage::default());
        history.record(RoundRecord::Drill(drill_item(5)));
        let mut analytics = KeyAnalytics::new();
        analytics.insert(
            "a".to_string(),
            KeyStat {
                total: 2,
                errors: 1,
                avg_latency: 150.0,
            },
        );
        history.record(RoundRecord::Practice(PracticeHistoryItem {
            key_analytics: Some(analytics),
            ..practice_item(6)
        }));

        let reloaded = History::load(history.storage);
        assert_eq!(reloaded.drill(), &[drill_item(5)]);
        assert_eq!(reloaded.practice().len(), 1);
        assert_eq!(
            reloaded.practice()[0].key_analytics.as_ref().unwrap()["a"].avg_latency,
            150.0
        );
    }

    #[test]
    fn test_storage_layout() {
        let storage = MemoryHistoryStorage::default();
        let mut history = History::load(storage);
        history.record_drill(drill_item(1));

        let raw = history.storage().read(DRILL_HISTORY_KEY).unwrap().unwrap();
        assert_eq!(
            raw,
            r#"[{"timestamp":1,"difficulty":"HOME ROW","score":10,"accuracy":90,"duration":5,"cpm":120}]"#
        );
    }

    #[test]
    fn test_corrupt_json_is_discarded() {
        let storage = MemoryHistoryStorage::with_entry(DRILL_HISTORY_KEY, "[{\"timestamp\": 1,");
        let history = History::load(storage);

        assert!(history.drill().is_empty());
    }

    #[test]
    fn test_one_bad_entry_rejects_batch() {
        let raw = r#"[
            {"timestamp":1,"difficulty":"NOVICE","wpm":40,"accuracy":90,"duration":30},
            {"timestamp":2,"difficulty":"NOVICE","wpm":"fast","accuracy":90,"duration":30}
        ]"#;
        let storage = MemoryHistoryStorage::with_entry(PRACTICE_HISTORY_KEY, raw);
        let history = History::load(storage);

        assert!(history.practice().is_empty());
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let raw = r#"[{"timestamp":1,"difficulty":"ALPHA","score":1,"accuracy":140,"duration":2,"cpm":30}]"#;
        assert_matches!(
            parse_batch::<DrillHistoryItem>(raw),
            Err(HistoryError::Invalid { index: 0, .. })
        );
    }

    #[test]
    fn test_unknown_difficulty_rejected() {
        let raw = r#"[{"timestamp":1,"difficulty":"EASY","score":1,"accuracy":40,"duration":2,"cpm":30}]"#;
        assert_matches!(
            parse_batch::<DrillHistoryItem>(raw),
            Err(HistoryError::Parse(_))
        );
    }

    #[test]
    fn test_missing_field_rejected() {
        let raw = r#"[{"timestamp":1,"difficulty":"NOVICE","accuracy":90,"duration":30}]"#;
        assert_matches!(
            parse_batch::<PracticeHistoryItem>(raw),
            Err(HistoryError::Parse(_))
        );
    }

    #[test]
    fn test_not_an_array_rejected() {
        assert!(parse_batch::<DrillHistoryItem>("{}").is_err());
    }

    #[test]
    fn test_lists_are_independent() {
        let storage = MemoryHistoryStorage::with_entry(DRILL_HISTORY_KEY, "garbage");
        storage
            .write(
                PRACTICE_HISTORY_KEY,
                r#"[{"timestamp":1,"difficulty":"MASTER","wpm":80,"accuracy":99,"duration":20}]"#,
            )
            .unwrap();
        let history = History::load(storage);

        assert!(history.drill().is_empty());
        assert_eq!(history.practice().len(), 1);
        assert_eq!(history.practice()[0].key_analytics, None);
    }
}
