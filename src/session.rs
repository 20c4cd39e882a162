//! Round lifecycle shared by practice and drill modes.
//!
//! `Session` is the only place that mutates round state. Every operation takes
//! the current time explicitly and returns the events it produced, so the
//! caller decides what to do with them (persist a record, emit telemetry,
//! start a text fetch). Derived numbers are never stored twice: [`Session::stats`]
//! and [`Session::drill_stats`] project them from the round on demand.

use rand::{rngs::StdRng, SeedableRng};
use std::time::SystemTime;

use crate::difficulty::{Difficulty, DrillDifficulty, Mode};
use crate::drill::{DrillKey, DrillOutcome, DrillRound};
use crate::history::{DrillHistoryItem, PracticeHistoryItem, RoundRecord};
use crate::practice::PracticeRound;
use crate::round_timer::RoundTimer;
use crate::scoring::{self, KeyAnalytics};
use crate::util::{elapsed_secs, epoch_millis};

/// Practice rounds shorter than this are not worth keeping
pub const MIN_RECORDED_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading,
    Playing,
    Finished,
}

/// Practice metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub wpm: u32,
    pub accuracy: u32,
    pub time_elapsed: u64,
    pub errors: usize,
    pub total_chars: usize,
}

/// Drill metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrillStats {
    pub score: u32,
    pub total: u32,
    pub combo: u32,
    pub best_combo: u32,
    pub cpm: u32,
    pub accuracy: u32,
    pub time_elapsed: u64,
}

/// Ask the text source for a practice text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRequest {
    pub generation: u64,
    pub difficulty: Difficulty,
}

/// Text coming back from the text source, tagged with the request it answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelivery {
    pub generation: u64,
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub text: String,
}

impl TextRequest {
    pub fn deliver(self, text: String) -> TextDelivery {
        TextDelivery {
            generation: self.generation,
            mode: Mode::Practice,
            difficulty: self.difficulty,
            text,
        }
    }
}

/// Headline numbers of a finished round, wpm for practice and cpm for drill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
    pub rate: u32,
    pub accuracy: u32,
    pub duration: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Initialized {
        mode: Mode,
        level: String,
    },
    TextRequested(TextRequest),
    Started {
        mode: Mode,
    },
    Finished {
        mode: Mode,
        result: RoundResult,
        record: Option<RoundRecord>,
    },
}

#[derive(Debug)]
pub struct Session {
    mode: Mode,
    difficulty: Difficulty,
    drill_difficulty: DrillDifficulty,
    status: Status,
    started_at: Option<SystemTime>,
    timer: RoundTimer,
    time_elapsed: u64,
    live_rate: u32,
    final_wpm: Option<u32>,
    analytics: Option<KeyAnalytics>,
    generation: u64,
    rng: StdRng,
    practice: PracticeRound,
    drill: DrillRound,
}

impl Session {
    pub fn new(mode: Mode, difficulty: Difficulty, drill_difficulty: DrillDifficulty) -> Self {
        Self::with_rng(mode, difficulty, drill_difficulty, StdRng::from_entropy())
    }

    /// Session with a fixed random source, for reproducible drills
    pub fn with_rng(
        mode: Mode,
        difficulty: Difficulty,
        drill_difficulty: DrillDifficulty,
        mut rng: StdRng,
    ) -> Self {
        let drill = DrillRound::new(drill_difficulty, &mut rng);
        Self {
            mode,
            difficulty,
            drill_difficulty,
            status: Status::Idle,
            started_at: None,
            timer: RoundTimer::every_second(),
            time_elapsed: 0,
            live_rate: 0,
            final_wpm: None,
            analytics: None,
            generation: 0,
            rng,
            practice: PracticeRound::default(),
            drill,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn drill_difficulty(&self) -> DrillDifficulty {
        self.drill_difficulty
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn practice(&self) -> &PracticeRound {
        &self.practice
    }

    pub fn drill(&self) -> &DrillRound {
        &self.drill
    }

    /// Per-key analytics of the last finished practice round
    pub fn analytics(&self) -> Option<&KeyAnalytics> {
        self.analytics.as_ref()
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    /// Label of the active difficulty for the current mode
    pub fn level(&self) -> String {
        match self.mode {
            Mode::Practice => self.difficulty.to_string(),
            Mode::Drill => self.drill_difficulty.to_string(),
        }
    }

    /// Start a fresh round in the current mode.
    ///
    /// A drill round with any activity is recorded before it is replaced.
    /// Practice mode enters `Loading` and asks for a text; the request carries
    /// a new generation so an answer to an older request can be told apart.
    pub fn initialize_at(&mut self, now: SystemTime) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if let Some(event) = self.flush_drill(now) {
            events.push(event);
        }

        self.timer.cancel();
        self.generation += 1;
        self.started_at = None;
        self.time_elapsed = 0;
        self.live_rate = 0;
        self.final_wpm = None;
        self.analytics = None;

        match self.mode {
            Mode::Practice => {
                self.status = Status::Loading;
                self.practice = PracticeRound::default();
                events.push(SessionEvent::TextRequested(TextRequest {
                    generation: self.generation,
                    difficulty: self.difficulty,
                }));
            }
            Mode::Drill => {
                self.status = Status::Idle;
                self.drill = DrillRound::new(self.drill_difficulty, &mut self.rng);
            }
        }

        tracing::debug!(
            target: "session",
            mode = %self.mode,
            level = %self.level(),
            generation = self.generation,
            "round_initialized"
        );
        events.push(SessionEvent::Initialized {
            mode: self.mode,
            level: self.level(),
        });
        events
    }

    pub fn switch_mode(&mut self, mode: Mode, now: SystemTime) -> Vec<SessionEvent> {
        self.mode = mode;
        self.initialize_at(now)
    }

    /// Change the practice tier. Ignored while a round is being played.
    pub fn set_difficulty(&mut self, difficulty: Difficulty, now: SystemTime) -> Vec<SessionEvent> {
        if self.status == Status::Playing {
            return Vec::new();
        }
        self.difficulty = difficulty;
        if self.mode == Mode::Practice {
            self.initialize_at(now)
        } else {
            Vec::new()
        }
    }

    /// Change the drill key pool. Ignored while a round is being played.
    pub fn set_drill_difficulty(
        &mut self,
        difficulty: DrillDifficulty,
        now: SystemTime,
    ) -> Vec<SessionEvent> {
        if self.status == Status::Playing {
            return Vec::new();
        }
        self.drill_difficulty = difficulty;
        if self.mode == Mode::Drill {
            self.initialize_at(now)
        } else {
            Vec::new()
        }
    }

    /// Apply a fetched practice text. Returns false when the delivery answers
    /// a superseded request and was dropped.
    pub fn deliver_text(&mut self, delivery: TextDelivery) -> bool {
        let current = self.status == Status::Loading
            && self.mode == Mode::Practice
            && delivery.mode == Mode::Practice
            && delivery.generation == self.generation
            && delivery.difficulty == self.difficulty;
        if !current {
            tracing::debug!(
                target: "session",
                delivered = delivery.generation,
                current = self.generation,
                "stale_text_discarded"
            );
            return false;
        }

        self.practice = PracticeRound::new(&delivery.text);
        self.status = Status::Idle;
        true
    }

    /// Idle -> Playing. Any other status is left alone.
    pub fn start_at(&mut self, now: SystemTime) -> Option<SessionEvent> {
        if self.status != Status::Idle {
            return None;
        }
        self.started_at = Some(now);
        self.timer.arm(now);
        self.status = Status::Playing;
        tracing::debug!(target: "session", mode = %self.mode, "round_started");
        Some(SessionEvent::Started { mode: self.mode })
    }

    /// Replace the practice input with `input`
    pub fn update_at(&mut self, input: &str, now: SystemTime) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.mode != Mode::Practice || !self.accepts_input() {
            return events;
        }
        if self.status == Status::Idle {
            if input.is_empty() {
                return events;
            }
            events.extend(self.start_at(now));
        }

        self.practice.apply_input(input, now);

        if self.practice.is_complete() {
            events.extend(self.finish_at(now));
        }
        events
    }

    /// Feed one key press to the drill
    pub fn press_at(&mut self, key: DrillKey, now: SystemTime) -> (DrillOutcome, Vec<SessionEvent>) {
        let mut events = Vec::new();
        if self.mode != Mode::Drill || !self.accepts_input() {
            return (DrillOutcome::Ignored, events);
        }
        if self.status == Status::Idle {
            events.extend(self.start_at(now));
        }
        let outcome = self.drill.press(key, &mut self.rng);
        (outcome, events)
    }

    /// End a practice round. Drill rounds end through [`Session::initialize_at`]
    /// or [`Session::teardown_at`] instead.
    pub fn finish_at(&mut self, now: SystemTime) -> Option<SessionEvent> {
        if self.mode != Mode::Practice || self.status != Status::Playing {
            return None;
        }
        self.status = Status::Finished;
        self.timer.cancel();

        let elapsed = self
            .started_at
            .map(|start| elapsed_secs(start, now))
            .unwrap_or(0.0);
        let wpm = scoring::wpm(self.practice.total_chars(), elapsed);
        self.final_wpm = Some(wpm);
        self.time_elapsed = elapsed.floor() as u64;
        let analytics = scoring::key_analytics(self.practice.keystrokes());
        self.analytics = Some(analytics.clone());

        let result = RoundResult {
            rate: wpm,
            accuracy: self.practice.accuracy(),
            duration: self.time_elapsed,
        };
        let record = (self.practice.total_chars() > MIN_RECORDED_CHARS).then(|| {
            RoundRecord::Practice(PracticeHistoryItem {
                timestamp: epoch_millis(now),
                difficulty: self.difficulty,
                wpm: result.rate,
                accuracy: result.accuracy,
                duration: result.duration,
                key_analytics: Some(analytics),
            })
        });

        tracing::info!(
            target: "session",
            wpm,
            accuracy = result.accuracy,
            duration = result.duration,
            recorded = record.is_some(),
            "practice_finished"
        );
        Some(SessionEvent::Finished {
            mode: Mode::Practice,
            result,
            record,
        })
    }

    /// Timer callback. Refreshes elapsed time and the live rate once per
    /// period while playing.
    pub fn tick_at(&mut self, now: SystemTime) -> bool {
        if self.status != Status::Playing || !self.timer.poll(now) {
            return false;
        }
        let Some(start) = self.started_at else {
            return false;
        };
        self.time_elapsed = elapsed_secs(start, now).floor() as u64;
        self.live_rate = match self.mode {
            Mode::Practice => scoring::wpm(self.practice.total_chars(), self.time_elapsed as f64),
            Mode::Drill => self.drill.cpm(self.time_elapsed),
        };
        true
    }

    /// Stop the timer and record a pending drill round before exit
    pub fn teardown_at(&mut self, now: SystemTime) -> Vec<SessionEvent> {
        self.timer.cancel();
        let events: Vec<_> = self.flush_drill(now).into_iter().collect();
        if !events.is_empty() {
            self.status = Status::Idle;
            self.started_at = None;
        }
        events
    }

    pub fn stats(&self) -> Stats {
        Stats {
            wpm: self.final_wpm.unwrap_or(match self.mode {
                Mode::Practice => self.live_rate,
                Mode::Drill => 0,
            }),
            accuracy: self.practice.accuracy(),
            time_elapsed: self.time_elapsed,
            errors: self.practice.errors(),
            total_chars: self.practice.total_chars(),
        }
    }

    pub fn drill_stats(&self) -> DrillStats {
        DrillStats {
            score: self.drill.score(),
            total: self.drill.total(),
            combo: self.drill.combo(),
            best_combo: self.drill.best_combo(),
            cpm: match self.mode {
                Mode::Drill => self.live_rate,
                Mode::Practice => 0,
            },
            accuracy: self.drill.accuracy(),
            time_elapsed: self.time_elapsed,
        }
    }

    fn accepts_input(&self) -> bool {
        !matches!(self.status, Status::Finished | Status::Loading)
    }

    /// Turn the current drill round into a history record if it saw any
    /// key presses. Duration and cpm use whole elapsed seconds.
    fn flush_drill(&mut self, now: SystemTime) -> Option<SessionEvent> {
        if !self.drill.has_activity() {
            return None;
        }
        let duration = self
            .started_at
            .map(|start| elapsed_secs(start, now).floor() as u64)
            .unwrap_or(self.time_elapsed);
        let result = RoundResult {
            rate: self.drill.cpm(duration),
            accuracy: self.drill.recorded_accuracy(),
            duration,
        };
        let item = DrillHistoryItem {
            timestamp: epoch_millis(now),
            difficulty: self.drill.difficulty(),
            score: self.drill.score(),
            accuracy: result.accuracy,
            duration,
            cpm: result.rate,
        };
        tracing::info!(
            target: "session",
            score = item.score,
            cpm = item.cpm,
            accuracy = item.accuracy,
            duration,
            "drill_finished"
        );
        // A flushed round must not be recorded a second time
        self.drill = DrillRound::new(self.drill.difficulty(), &mut self.rng);
        Some(SessionEvent::Finished {
            mode: Mode::Drill,
            result,
            record: Some(RoundRecord::Drill(item)),
        })
    }
}
