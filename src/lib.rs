// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod difficulty;
pub mod drill;
pub mod history;
pub mod practice;
pub mod round_timer;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod sound;
pub mod telemetry;
pub mod text_source;
pub mod ui;
pub mod util;
