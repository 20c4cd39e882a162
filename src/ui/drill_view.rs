use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::App;
use crate::session::Status;
use crate::ui::keyboard::Keyboard;

fn target_label(target: char) -> String {
    match target {
        ' ' => "SPACE".to_string(),
        c => c.to_uppercase().to_string(),
    }
}

pub fn render_drill(app: &App, area: Rect, buf: &mut Buffer) {
    let session = app.session();
    let drill = session.drill();
    let stats = session.drill_stats();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(Keyboard::HEIGHT),
            Constraint::Min(0),
        ])
        .split(area);

    let target_area = Rect {
        x: area.x + area.width.saturating_sub(11) / 2,
        width: area.width.min(11),
        ..chunks[1]
    };
    Paragraph::new(Span::styled(
        target_label(drill.target()),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    )
    .render(target_area, buf);

    let hint = if session.status() == Status::Idle {
        Span::styled(
            "press the highlighted key to start",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        )
    } else {
        Span::styled(
            format!("combo x{}   best x{}", stats.combo, stats.best_combo),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )
    };
    Paragraph::new(Line::from(hint))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let keyboard = Keyboard {
        active: Some(drill.target()),
        pressed: app.pressed_key(),
    };
    (&keyboard).render(chunks[4], buf);
}
