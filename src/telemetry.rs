//! Fire-and-forget usage events.

use itertools::Itertools;
use std::cell::RefCell;

use crate::difficulty::Mode;
use crate::session::{RoundResult, SessionEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryEvent {
    PageView { view: &'static str },
    RoundInit { mode: Mode, level: String },
    RoundStart { mode: Mode },
    RoundFinish { mode: Mode, result: RoundResult, recorded: bool },
}

impl TelemetryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryEvent::PageView { .. } => "page_view",
            TelemetryEvent::RoundInit { .. } => "round_init",
            TelemetryEvent::RoundStart { .. } => "round_start",
            TelemetryEvent::RoundFinish { .. } => "round_finish",
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            TelemetryEvent::PageView { view } => vec![("view", view.to_string())],
            TelemetryEvent::RoundInit { mode, level } => {
                vec![("mode", mode.to_string()), ("level", level.clone())]
            }
            TelemetryEvent::RoundStart { mode } => vec![("mode", mode.to_string())],
            TelemetryEvent::RoundFinish {
                mode,
                result,
                recorded,
            } => vec![
                ("mode", mode.to_string()),
                ("rate", result.rate.to_string()),
                ("accuracy", result.accuracy.to_string()),
                ("duration", result.duration.to_string()),
                ("recorded", recorded.to_string()),
            ],
        }
    }

    /// The telemetry counterpart of a session event, if any
    pub fn from_session(event: &SessionEvent) -> Option<Self> {
        match event {
            SessionEvent::Initialized { mode, level } => Some(TelemetryEvent::RoundInit {
                mode: *mode,
                level: level.clone(),
            }),
            SessionEvent::Started { mode } => Some(TelemetryEvent::RoundStart { mode: *mode }),
            SessionEvent::Finished {
                mode,
                result,
                record,
            } => Some(TelemetryEvent::RoundFinish {
                mode: *mode,
                result: *result,
                recorded: record.is_some(),
            }),
            SessionEvent::TextRequested(_) => None,
        }
    }
}

/// Sink for usage events. Implementations must not fail the caller.
pub trait Telemetry {
    fn emit(&self, event: &TelemetryEvent);
}

/// Writes events to the log under the `telemetry` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn emit(&self, event: &TelemetryEvent) {
        let params = event
            .params()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .join(" ");
        tracing::info!(target: "telemetry", event = event.name(), %params);
    }
}

/// Keeps events in memory, for headless runs
#[derive(Debug, Default)]
pub struct MemoryTelemetry {
    events: RefCell<Vec<TelemetryEvent>>,
}

impl MemoryTelemetry {
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(TelemetryEvent::name).collect()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.borrow().clone()
    }
}

impl Telemetry for MemoryTelemetry {
    fn emit(&self, event: &TelemetryEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

impl<T: Telemetry + ?Sized> Telemetry for std::rc::Rc<T> {
    fn emit(&self, event: &TelemetryEvent) {
        (**self).emit(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_params() {
        let event = TelemetryEvent::RoundFinish {
            mode: Mode::Drill,
            result: RoundResult {
                rate: 120,
                accuracy: 95,
                duration: 30,
            },
            recorded: true,
        };
        assert_eq!(event.name(), "round_finish");
        assert!(event.params().contains(&("rate", "120".to_string())));
        assert!(event.params().contains(&("mode", "DRILL".to_string())));
    }

    #[test]
    fn text_requests_are_not_reported() {
        let event = SessionEvent::TextRequested(crate::session::TextRequest {
            generation: 1,
            difficulty: crate::difficulty::Difficulty::Novice,
        });
        assert_eq!(TelemetryEvent::from_session(&event), None);
    }

    #[test]
    fn memory_sink_collects() {
        let sink = MemoryTelemetry::default();
        sink.emit(&TelemetryEvent::PageView { view: "main" });
        sink.emit(&TelemetryEvent::RoundStart { mode: Mode::Practice });
        assert_eq!(sink.names(), vec!["page_view", "round_start"]);
    }
}
