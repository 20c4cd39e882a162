use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::session::{Session, Status};
use crate::ui::key_stats::render_key_stats;

const HORIZONTAL_MARGIN: u16 = 5;

/// Target text colored by what has been typed so far
pub fn text_spans(session: &Session) -> Vec<Span<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);

    let round = session.practice();
    let target = round.target_chars();
    let input = round.input_chars();

    let mut spans: Vec<Span> = input
        .iter()
        .enumerate()
        .map(|(idx, &typed)| {
            let expected = round.expected_char(idx).unwrap_or(' ');
            if typed == expected {
                Span::styled(expected.to_string(), green_bold_style)
            } else {
                // show what should have been typed, spaces made visible
                let shown = match expected {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                };
                Span::styled(shown, red_bold_style)
            }
        })
        .collect();

    if let Some(&current) = target.get(input.len()) {
        spans.push(Span::styled(current.to_string(), underlined_dim_bold_style));
        let rest: String = target[input.len() + 1..].iter().collect();
        spans.push(Span::styled(rest, dim_bold_style));
    }
    spans
}

pub fn render_practice(session: &Session, area: Rect, buf: &mut Buffer) {
    match session.status() {
        Status::Loading => {
            Paragraph::new(Span::styled(
                "Generating text...",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .render(centered_line(area), buf);
        }
        Status::Finished => render_result_panel(session, area, buf),
        Status::Idle | Status::Playing => {
            let width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
            let text_width = session.practice().target().width() as u16;
            let lines = text_width.div_ceil(width).max(1);

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .horizontal_margin(HORIZONTAL_MARGIN)
                .constraints([
                    Constraint::Length(area.height.saturating_sub(lines) / 2),
                    Constraint::Length(lines),
                    Constraint::Min(0),
                ])
                .split(area);

            Paragraph::new(Line::from(text_spans(session)))
                .alignment(if lines == 1 {
                    Alignment::Center
                } else {
                    Alignment::Left
                })
                .wrap(Wrap { trim: false })
                .render(chunks[1], buf);
        }
    }
}

/// Summary of a finished practice round
pub fn render_result_panel(session: &Session, area: Rect, buf: &mut Buffer) {
    let stats = session.stats();
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let panel = Block::default()
        .borders(Borders::ALL)
        .title(" Session Complete ")
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(Color::Magenta));
    let inner = panel.inner(area);
    panel.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    Paragraph::new(Line::from(vec![
        Span::styled(format!("{} wpm", stats.wpm), bold_style.fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled(format!("{}% acc", stats.accuracy), bold_style.fg(Color::Green)),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(format!(
        "{} chars   {} errors   {}s",
        stats.total_chars, stats.errors, stats.time_elapsed
    ))
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::Gray))
    .render(chunks[1], buf);

    render_key_stats(session.analytics(), chunks[3], buf);

    Paragraph::new(Span::styled(
        "(enter) play again / (tab) reset / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}

fn centered_line(area: Rect) -> Rect {
    Rect {
        y: area.y + area.height / 2,
        height: area.height.min(1),
        ..area
    }
}
