//! Application controller: routes terminal events into the session and fans
//! the session's events out to history, telemetry and the text fetcher.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::config::Config;
use crate::difficulty::Mode;
use crate::drill::{DrillKey, DrillOutcome};
use crate::history::{History, HistoryStorage};
use crate::runtime::{spawn_text_fetch, AppEvent};
use crate::session::{Session, SessionEvent, Status};
use crate::sound::ClickSound;
use crate::telemetry::{Telemetry, TelemetryEvent};
use crate::text_source::TextSource;
use crate::util::time_diff_ms;

/// How long a pressed key stays highlighted on the drill keyboard
pub const PRESS_FEEDBACK: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Main,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App {
    session: Session,
    history: History<Box<dyn HistoryStorage>>,
    source: Arc<dyn TextSource>,
    events: Option<Sender<AppEvent>>,
    telemetry: Box<dyn Telemetry>,
    sound: ClickSound,
    view: View,
    topic: Option<String>,
    pressed: Option<(char, SystemTime)>,
}

impl App {
    pub fn new(
        config: &Config,
        storage: Box<dyn HistoryStorage>,
        source: Arc<dyn TextSource>,
        telemetry: Box<dyn Telemetry>,
    ) -> Self {
        Self {
            session: Session::new(config.mode, config.difficulty, config.drill_difficulty),
            history: History::load(storage),
            source,
            events: None,
            telemetry,
            sound: ClickSound::new(config.sound_enabled),
            view: View::Main,
            topic: config.topic.clone(),
            pressed: None,
        }
    }

    /// Fetch texts on a worker thread and deliver them through `tx`.
    /// Without a sender fetches run inline.
    pub fn with_event_sender(mut self, tx: Sender<AppEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Replace the session, e.g. with one using a seeded random source
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Begin the first round
    pub fn start(&mut self, now: SystemTime) {
        self.telemetry.emit(&TelemetryEvent::PageView { view: "main" });
        let events = self.session.initialize_at(now);
        self.dispatch(events);
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &History<Box<dyn HistoryStorage>> {
        &self.history
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound.enabled()
    }

    pub fn pressed_key(&self) -> Option<char> {
        self.pressed.map(|(c, _)| c)
    }

    /// Current preferences, for saving on exit
    pub fn config(&self) -> Config {
        Config {
            mode: self.session.mode(),
            difficulty: self.session.difficulty(),
            drill_difficulty: self.session.drill_difficulty(),
            sound_enabled: self.sound.enabled(),
            topic: self.topic.clone(),
        }
    }

    pub fn handle_event(&mut self, event: AppEvent, now: SystemTime) -> Control {
        match event {
            AppEvent::Key(key) => return self.handle_key(key, now),
            AppEvent::Tick => {
                self.session.tick_at(now);
                if let Some((_, at)) = self.pressed {
                    if time_diff_ms(at, now) >= PRESS_FEEDBACK.as_millis() as u64 {
                        self.pressed = None;
                    }
                }
            }
            AppEvent::Resize => {}
            AppEvent::TextReady(delivery) => {
                self.session.deliver_text(delivery);
            }
        }
        Control::Continue
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: SystemTime) -> Control {
        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        // Reset works from every view
        if key.code == KeyCode::Tab {
            self.view = View::Main;
            self.reset(now);
            return Control::Continue;
        }

        match key.code {
            KeyCode::Esc => {
                if self.view == View::History {
                    self.view = View::Main;
                    return Control::Continue;
                }
                return Control::Quit;
            }
            KeyCode::F(1) => {
                let events = self.session.switch_mode(self.session.mode().toggled(), now);
                self.dispatch(events);
                return Control::Continue;
            }
            KeyCode::F(2) => {
                let events = match self.session.mode() {
                    Mode::Practice => self
                        .session
                        .set_difficulty(self.session.difficulty().next(), now),
                    Mode::Drill => self
                        .session
                        .set_drill_difficulty(self.session.drill_difficulty().next(), now),
                };
                self.dispatch(events);
                return Control::Continue;
            }
            KeyCode::F(3) => {
                let enabled = self.sound.toggle();
                tracing::debug!(target: "sound", enabled, "sound_toggled");
                return Control::Continue;
            }
            KeyCode::F(4) => {
                self.view = match self.view {
                    View::Main => {
                        self.telemetry.emit(&TelemetryEvent::PageView { view: "history" });
                        View::History
                    }
                    View::History => View::Main,
                };
                return Control::Continue;
            }
            _ => {}
        }

        if self.view == View::History {
            return Control::Continue;
        }

        match self.session.mode() {
            Mode::Practice => self.practice_key(key, now),
            Mode::Drill => self.drill_key(key, now),
        }
        Control::Continue
    }

    /// Start a new round in the current mode
    pub fn reset(&mut self, now: SystemTime) {
        self.pressed = None;
        let events = self.session.initialize_at(now);
        self.dispatch(events);
    }

    /// Flush whatever the session still holds before exit
    pub fn teardown(&mut self, now: SystemTime) {
        let events = self.session.teardown_at(now);
        self.dispatch(events);
    }

    fn practice_key(&mut self, key: KeyEvent, now: SystemTime) {
        match self.session.status() {
            Status::Finished => {
                if key.code == KeyCode::Enter {
                    self.reset(now);
                }
                return;
            }
            Status::Loading => return,
            Status::Idle | Status::Playing => {}
        }

        let mut input = self.session.practice().input();
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                input.push(c);
                self.sound.click();
            }
            KeyCode::Backspace => {
                if input.pop().is_none() {
                    return;
                }
            }
            _ => return,
        }

        let events = self.session.update_at(&input, now);
        self.dispatch(events);
    }

    fn drill_key(&mut self, key: KeyEvent, now: SystemTime) {
        let drill_key = to_drill_key(&key);
        let (outcome, events) = self.session.press_at(drill_key, now);
        if outcome != DrillOutcome::Ignored {
            self.sound.click();
            if let DrillKey::Char(c) = drill_key {
                self.pressed = Some((c, now));
            }
        }
        self.dispatch(events);
    }

    fn dispatch(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            if let Some(telemetry) = TelemetryEvent::from_session(&event) {
                self.telemetry.emit(&telemetry);
            }
            match event {
                SessionEvent::TextRequested(request) => match &self.events {
                    Some(tx) => spawn_text_fetch(self.source.clone(), request, tx.clone()),
                    None => {
                        let text = self.source.fetch_practice_text(request.difficulty);
                        self.session.deliver_text(request.deliver(text));
                    }
                },
                SessionEvent::Finished {
                    record: Some(record),
                    ..
                } => self.history.record(record),
                SessionEvent::Finished { record: None, .. }
                | SessionEvent::Initialized { .. }
                | SessionEvent::Started { .. } => {}
            }
        }
    }
}

/// Classify a terminal key for the drill
pub fn to_drill_key(key: &KeyEvent) -> DrillKey {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
    {
        return DrillKey::Modifier;
    }
    match key.code {
        KeyCode::Char(c) => DrillKey::Char(c),
        KeyCode::Modifier(_)
        | KeyCode::CapsLock
        | KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Esc => DrillKey::Modifier,
        _ => DrillKey::Other,
    }
}
