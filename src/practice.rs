use std::time::SystemTime;

use crate::scoring;
use crate::util::time_diff_ms;

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// A single typed character in a practice round
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keystroke {
    pub key: char,
    pub outcome: Outcome,
    pub timestamp: SystemTime,
    /// Milliseconds since the previous input event, 0 for the first
    pub latency_ms: u64,
}

/// Target text plus what the user has typed against it
#[derive(Debug, Clone, Default)]
pub struct PracticeRound {
    target: Vec<char>,
    input: Vec<char>,
    keystrokes: Vec<Keystroke>,
    last_input_at: Option<SystemTime>,
}

impl PracticeRound {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.chars().collect(),
            ..Self::default()
        }
    }

    pub fn target(&self) -> String {
        self.target.iter().collect()
    }

    pub fn target_chars(&self) -> &[char] {
        &self.target
    }

    pub fn input(&self) -> String {
        self.input.iter().collect()
    }

    pub fn input_chars(&self) -> &[char] {
        &self.input
    }

    pub fn keystrokes(&self) -> &[Keystroke] {
        &self.keystrokes
    }

    pub fn expected_char(&self, idx: usize) -> Option<char> {
        self.target.get(idx).copied()
    }

    /// Replace the current input with `input`, logging a keystroke for every
    /// character appended past the common prefix. Input longer than the
    /// target is clipped.
    pub fn apply_input(&mut self, input: &str, now: SystemTime) {
        let next: Vec<char> = input.chars().take(self.target.len()).collect();

        let common = self
            .input
            .iter()
            .zip(next.iter())
            .take_while(|(a, b)| a == b)
            .count();
        self.keystrokes.truncate(common.min(next.len()));

        for (idx, &key) in next.iter().enumerate().skip(self.keystrokes.len()) {
            let latency_ms = self
                .last_input_at
                .map(|prev| time_diff_ms(prev, now))
                .unwrap_or(0);
            let outcome = if self.expected_char(idx) == Some(key) {
                Outcome::Correct
            } else {
                Outcome::Incorrect
            };
            self.keystrokes.push(Keystroke {
                key,
                outcome,
                timestamp: now,
                latency_ms,
            });
            self.last_input_at = Some(now);
        }

        self.input = next;
        self.last_input_at = Some(now);
    }

    pub fn total_chars(&self) -> usize {
        self.input.len()
    }

    pub fn errors(&self) -> usize {
        self.input
            .iter()
            .enumerate()
            .filter(|(idx, c)| self.expected_char(*idx) != Some(**c))
            .count()
    }

    pub fn accuracy(&self) -> u32 {
        scoring::accuracy(self.total_chars(), self.errors())
    }

    pub fn is_complete(&self) -> bool {
        !self.target.is_empty() && self.input.len() == self.target.len()
    }
}
