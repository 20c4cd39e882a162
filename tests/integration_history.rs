use std::fs;

use tempfile::tempdir;

use neontype::difficulty::{Difficulty, DrillDifficulty};
use neontype::history::{
    DrillHistoryItem, FileHistoryStorage, History, PracticeHistoryItem, HISTORY_LIMIT,
};
use neontype::scoring::{KeyAnalytics, KeyStat};

fn drill_item(timestamp: i64, score: u32) -> DrillHistoryItem {
    DrillHistoryItem {
        timestamp,
        difficulty: DrillDifficulty::Alpha,
        score,
        accuracy: 80,
        duration: 10,
        cpm: score * 6,
    }
}

#[test]
fn corrupt_drill_history_loads_empty() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("drill_history.json"), "{ not json").unwrap();
    fs::write(
        dir.path().join("practice_history.json"),
        r#"[{"timestamp":5,"difficulty":"ADVANCED","wpm":61,"accuracy":96,"duration":33}]"#,
    )
    .unwrap();

    let history = History::load(FileHistoryStorage::new(dir.path()));

    assert!(history.drill().is_empty());
    assert_eq!(history.practice().len(), 1);
    assert_eq!(history.practice()[0].difficulty, Difficulty::Advanced);
}

#[test]
fn missing_files_load_empty() {
    let dir = tempdir().unwrap();
    let history = History::load(FileHistoryStorage::new(dir.path().join("not-created-yet")));

    assert!(history.drill().is_empty());
    assert!(history.practice().is_empty());
}

#[test]
fn records_persist_newest_first_and_capped() {
    let dir = tempdir().unwrap();
    let mut history = History::load(FileHistoryStorage::new(dir.path()));
    for ts in 1..=(HISTORY_LIMIT as i64 + 1) {
        history.record_drill(drill_item(ts, ts as u32));
    }

    let reloaded = History::load(FileHistoryStorage::new(dir.path()));
    let drill = reloaded.drill();
    assert_eq!(drill.len(), HISTORY_LIMIT);
    assert_eq!(drill.first().unwrap().timestamp, 21);
    assert_eq!(drill.last().unwrap().timestamp, 2);
}

#[test]
fn practice_analytics_survive_reload() {
    let dir = tempdir().unwrap();
    let mut analytics = KeyAnalytics::new();
    analytics.insert(
        "e".into(),
        KeyStat {
            total: 3,
            errors: 1,
            avg_latency: 200.0,
        },
    );

    let mut history = History::load(FileHistoryStorage::new(dir.path()));
    history.record_practice(PracticeHistoryItem {
        timestamp: 1_700_000_000_000,
        difficulty: Difficulty::Novice,
        wpm: 42,
        accuracy: 97,
        duration: 31,
        key_analytics: Some(analytics.clone()),
    });

    let raw = fs::read_to_string(dir.path().join("practice_history.json")).unwrap();
    assert!(raw.contains(r#""keyAnalytics":{"e":{"total":3,"errors":1,"avgLatency":200.0}}"#));

    let reloaded = History::load(FileHistoryStorage::new(dir.path()));
    assert_eq!(reloaded.practice()[0].key_analytics, Some(analytics));
}

#[test]
fn oversized_file_is_truncated_on_load() {
    let dir = tempdir().unwrap();
    let items: Vec<DrillHistoryItem> = (0..30).map(|i| drill_item(100 - i, 1)).collect();
    fs::write(
        dir.path().join("drill_history.json"),
        serde_json::to_string(&items).unwrap(),
    )
    .unwrap();

    let history = History::load(FileHistoryStorage::new(dir.path()));
    assert_eq!(history.drill().len(), HISTORY_LIMIT);
    assert_eq!(history.drill()[0].timestamp, 100);
}

#[test]
fn unwritable_dir_keeps_memory_list() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, "a file, not a directory").unwrap();

    let mut history = History::load(FileHistoryStorage::new(&blocker));
    history.record_drill(drill_item(1, 3));

    assert_eq!(history.drill().len(), 1);
}
