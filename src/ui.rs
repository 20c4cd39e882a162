pub mod drill_view;
pub mod history_view;
pub mod key_stats;
pub mod keyboard;
pub mod practice_view;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::app::App;
use crate::difficulty::Mode;
use crate::session::Status;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

/// Live numbers shown above the round
pub fn stats_line(app: &App) -> String {
    let session = app.session();
    match session.mode() {
        Mode::Practice => {
            let stats = session.stats();
            format!(
                "{} wpm   {}% acc   {} errors   {}s",
                stats.wpm, stats.accuracy, stats.errors, stats.time_elapsed
            )
        }
        Mode::Drill => {
            let stats = session.drill_stats();
            format!(
                "{} cpm   {}% acc   {}/{} hits   {}s",
                stats.cpm, stats.accuracy, stats.score, stats.total, stats.time_elapsed
            )
        }
    }
}

fn header_line(app: &App) -> Line<'static> {
    let session = app.session();
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    // difficulty is locked while a round is running
    let level_style = if session.status() == Status::Playing {
        dim_style
    } else {
        bold_style.fg(Color::Yellow)
    };

    Line::from(vec![
        Span::styled("NEONTYPE", bold_style.fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(session.mode().to_string(), bold_style.fg(Color::Magenta)),
        Span::raw("  "),
        Span::styled(session.level(), level_style),
        Span::raw("  "),
        Span::styled(
            if app.sound_enabled() { "♪ on" } else { "♪ off" },
            dim_style,
        ),
    ])
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Length(1), // stats
                Constraint::Min(1),    // round
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(header_line(self))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(Span::styled(
            stats_line(self),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        match self.session().mode() {
            Mode::Practice => practice_view::render_practice(self.session(), chunks[2], buf),
            Mode::Drill => drill_view::render_drill(self, chunks[2], buf),
        }

        Paragraph::new(Span::styled(
            "(tab) reset  (f1) mode  (f2) difficulty  (f3) sound  (f4) history  (esc)ape",
            italic_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }
}
