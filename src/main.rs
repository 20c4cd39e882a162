use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, SystemTime},
};
use tracing_appender::non_blocking::WorkerGuard;

use neontype::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    difficulty::{Difficulty, DrillDifficulty, Mode},
    history::FileHistoryStorage,
    runtime::{AppEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    telemetry::TracingTelemetry,
    text_source::build_source,
    ui::screen::current_screen,
};

const TICK_RATE_MS: u64 = 100;

/// terminal typing tutor with free-text practice and single-key drills
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing tutor. Practice mode types generated or bundled text, drill mode trains single keys. Rounds are scored live and the last 20 of each kind are kept."
)]
pub struct Cli {
    /// mode to start in (defaults to the last one used)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// practice text difficulty
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// drill key pool
    #[clap(short = 'k', long, value_enum)]
    drill_difficulty: Option<DrillDifficulty>,

    /// start with key click sounds off
    #[clap(long)]
    mute: bool,

    /// topic hint for generated practice text
    #[clap(short = 't', long)]
    topic: Option<String>,

    /// never call the text generation api, use bundled texts only
    #[clap(long)]
    offline: bool,

    /// directory for history and config files
    #[clap(long)]
    data_dir: Option<PathBuf>,
}

impl Cli {
    /// Overlay command line choices on the stored preferences
    fn apply(&self, mut config: Config) -> Config {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(drill_difficulty) = self.drill_difficulty {
            config.drill_difficulty = drill_difficulty;
        }
        if self.mute {
            config.sound_enabled = false;
        }
        if self.topic.is_some() {
            config.topic = self.topic.clone();
        }
        config
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.data_dir {
            Some(dir) => FileConfigStore::with_path(dir.join("config.json")),
            None => FileConfigStore::new(),
        }
    }

    fn history_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(AppDirs::data_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = AppDirs::log_dir()?;
    std::fs::create_dir_all(&log_dir).ok()?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "neontype.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = tracing_subscriber::EnvFilter::try_from_env("NEONTYPE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|_| guard)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = configure_logging();

    let store = cli.config_store();
    let config = cli.apply(store.load());
    tracing::info!(
        mode = %config.mode,
        difficulty = %config.difficulty,
        drill_difficulty = %config.drill_difficulty,
        offline = cli.offline,
        "starting"
    );

    let event_source = CrosstermEventSource::new();
    let mut app = App::new(
        &config,
        Box::new(FileHistoryStorage::new(cli.history_dir())),
        build_source(cli.offline, config.topic.clone()),
        Box::new(TracingTelemetry),
    )
    .with_event_sender(event_source.sender());
    let runner = Runner::new(event_source, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start(SystemTime::now());
    let result = start_tui(&mut terminal, &mut app, &runner);
    app.teardown(SystemTime::now());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(e) = store.save(&app.config()) {
        tracing::warn!(error = %e, "config_save_failed");
    }

    result
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| current_screen(app.view()).render(app, f))?;

        if app.handle_event(runner.step(), SystemTime::now()) == Control::Quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["neontype"]).unwrap();

        assert_eq!(cli.mode, None);
        assert_eq!(cli.difficulty, None);
        assert!(!cli.mute);
        assert!(!cli.offline);
        assert_eq!(cli.data_dir, None);
    }

    #[test]
    fn test_cli_value_enums() {
        let cli = Cli::try_parse_from([
            "neontype",
            "--mode",
            "practice",
            "--difficulty",
            "master",
            "--drill-difficulty",
            "home-row",
        ])
        .unwrap();

        assert_eq!(cli.mode, Some(Mode::Practice));
        assert_eq!(cli.difficulty, Some(Difficulty::Master));
        assert_eq!(cli.drill_difficulty, Some(DrillDifficulty::HomeRow));
    }

    #[test]
    fn test_cli_rejects_unknown_difficulty() {
        assert!(Cli::try_parse_from(["neontype", "--difficulty", "easy"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli =
            Cli::try_parse_from(["neontype", "--mute", "-k", "numbers", "--topic", "ocean"]).unwrap();
        let stored = Config {
            mode: Mode::Practice,
            ..Config::default()
        };

        let config = cli.apply(stored);
        assert_eq!(config.mode, Mode::Practice);
        assert_eq!(config.drill_difficulty, DrillDifficulty::Numbers);
        assert!(!config.sound_enabled);
        assert_eq!(config.topic.as_deref(), Some("ocean"));
    }

    #[test]
    fn test_data_dir_controls_paths() {
        let cli = Cli::try_parse_from(["neontype", "--data-dir", "/tmp/nt"]).unwrap();

        assert_eq!(cli.history_dir(), PathBuf::from("/tmp/nt"));
        assert_eq!(
            cli.config_store().path(),
            PathBuf::from("/tmp/nt/config.json").as_path()
        );
    }
}
