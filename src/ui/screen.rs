use ratatui::Frame;

use crate::app::{App, View};
use crate::ui::history_view::render_history;

/// A UI Screen boundary: responsible for rendering one view
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Practice or drill round, whichever mode is active
pub struct MainScreen;

impl Screen for MainScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// History of the active mode
pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        let history = app.history();
        render_history(
            app.session().mode(),
            history.drill(),
            history.practice(),
            area,
            f.buffer_mut(),
        );
    }
}

/// Helper to construct the appropriate screen for the current view
pub fn current_screen(view: View) -> Box<dyn Screen> {
    match view {
        View::Main => Box::new(MainScreen),
        View::History => Box::new(HistoryScreen),
    }
}
