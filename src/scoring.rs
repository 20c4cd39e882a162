//! Pure scoring functions shared by practice and drill rounds.
//!
//! Nothing in here reads the clock or mutates session state; callers pass in
//! counts and elapsed times and get integer metrics back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::practice::{Keystroke, Outcome};

/// Per-key aggregate built from a keystroke log
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStat {
    pub total: u32,
    pub errors: u32,
    pub avg_latency: f64,
}

impl KeyStat {
    /// Fold one attempt into the aggregate using an incremental mean
    pub fn record(&mut self, latency_ms: u64, correct: bool) {
        self.total += 1;
        if !correct {
            self.errors += 1;
        }
        let total = self.total as f64;
        self.avg_latency = (self.avg_latency * (total - 1.0) + latency_ms as f64) / total;
    }

    pub fn miss_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.errors as f64 / self.total as f64 * 100.0
        }
    }
}

/// Lowercased key -> aggregate
pub type KeyAnalytics = BTreeMap<String, KeyStat>;

/// Number of positions in `input` that differ from `target`
pub fn count_errors(input: &str, target: &str) -> usize {
    let mut expected = target.chars();
    input
        .chars()
        .filter(|c| expected.next() != Some(*c))
        .count()
}

/// Percentage of correct characters, 100 for empty input
pub fn accuracy(typed: usize, errors: usize) -> u32 {
    if typed == 0 {
        return 100;
    }
    let correct = typed.saturating_sub(errors) as f64;
    ((correct / typed as f64) * 100.0).round().max(0.0) as u32
}

/// Words per minute where a word is five characters
pub fn wpm(chars: usize, elapsed_secs: f64) -> u32 {
    if elapsed_secs <= 0.0 {
        return 0;
    }
    ((chars as f64 / 5.0) / (elapsed_secs / 60.0)).round() as u32
}

/// Correct keystrokes per minute
pub fn cpm(score: u32, elapsed_secs: f64) -> u32 {
    if elapsed_secs <= 0.0 {
        return 0;
    }
    ((score as f64 / elapsed_secs) * 60.0).round() as u32
}

/// Share of drill presses that hit the target, `None` before the first press
pub fn hit_rate(score: u32, total: u32) -> Option<u32> {
    if total == 0 {
        None
    } else {
        Some(((score as f64 / total as f64) * 100.0).round() as u32)
    }
}

pub fn key_analytics(keystrokes: &[Keystroke]) -> KeyAnalytics {
    keystrokes
        .iter()
        .fold(KeyAnalytics::new(), |mut map, stroke| {
            map.entry(stroke.key.to_lowercase().collect())
                .or_default()
                .record(stroke.latency_ms, stroke.outcome == Outcome::Correct);
            map
        })
}
