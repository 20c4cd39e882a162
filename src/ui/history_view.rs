use chrono::{DateTime, Local, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::difficulty::Mode;
use crate::history::{DrillHistoryItem, PracticeHistoryItem};

pub fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn accuracy_style(accuracy: u32) -> Style {
    let color = if accuracy >= 95 {
        Color::Green
    } else if accuracy >= 85 {
        Color::Yellow
    } else {
        Color::Red
    };
    Style::default().fg(color)
}

fn drill_row(item: &DrillHistoryItem) -> Row<'static> {
    Row::new(vec![
        Cell::from(format_timestamp(item.timestamp)),
        Cell::from(item.difficulty.to_string()),
        Cell::from(item.score.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{}", item.cpm)),
        Cell::from(format!("{}%", item.accuracy)).style(accuracy_style(item.accuracy)),
        Cell::from(format!("{}s", item.duration)),
    ])
}

fn practice_row(item: &PracticeHistoryItem) -> Row<'static> {
    Row::new(vec![
        Cell::from(format_timestamp(item.timestamp)),
        Cell::from(item.difficulty.to_string()),
        Cell::from(item.wpm.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{}%", item.accuracy)).style(accuracy_style(item.accuracy)),
        Cell::from(format!("{}s", item.duration)),
    ])
}

/// History list of the active mode, newest first
pub fn render_history(
    mode: Mode,
    drill: &[DrillHistoryItem],
    practice: &[PracticeHistoryItem],
    area: Rect,
    buf: &mut Buffer,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let (title, empty) = match mode {
        Mode::Drill => ("Drill History", drill.is_empty()),
        Mode::Practice => ("Practice History", practice.is_empty()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(Color::Cyan));

    if empty {
        Paragraph::new("No history recorded yet.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .block(block)
            .render(chunks[0], buf);
    } else {
        let header_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let table = match mode {
            Mode::Drill => Table::new(
                drill.iter().map(drill_row),
                [
                    Constraint::Length(17),
                    Constraint::Length(9),
                    Constraint::Length(6),
                    Constraint::Length(5),
                    Constraint::Length(5),
                    Constraint::Min(5),
                ],
            )
            .header(Row::new(["Date", "Keys", "Score", "CPM", "Acc", "Time"]).style(header_style)),
            Mode::Practice => Table::new(
                practice.iter().map(practice_row),
                [
                    Constraint::Length(17),
                    Constraint::Length(13),
                    Constraint::Length(5),
                    Constraint::Length(5),
                    Constraint::Min(5),
                ],
            )
            .header(Row::new(["Date", "Level", "WPM", "Acc", "Time"]).style(header_style)),
        };
        table.block(block).column_spacing(2).render(chunks[0], buf);
    }

    Paragraph::new("(esc/f4) back  (tab) reset")
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::ITALIC))
        .render(chunks[1], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::{Difficulty, DrillDifficulty};

    fn rendered(mode: Mode, drill: &[DrillHistoryItem], practice: &[PracticeHistoryItem]) -> String {
        let area = Rect::new(0, 0, 80, 14);
        let mut buf = Buffer::empty(area);
        render_history(mode, drill, practice, area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn empty_history_message() {
        let text = rendered(Mode::Drill, &[], &[]);
        assert!(text.contains("Drill History"));
        assert!(text.contains("No history recorded yet."));
    }

    #[test]
    fn shows_current_mode_list() {
        let drill = [DrillHistoryItem {
            timestamp: 1_700_000_000_000,
            difficulty: DrillDifficulty::Numbers,
            score: 33,
            accuracy: 91,
            duration: 20,
            cpm: 99,
        }];
        let practice = [PracticeHistoryItem {
            timestamp: 1_700_000_000_000,
            difficulty: Difficulty::Master,
            wpm: 77,
            accuracy: 98,
            duration: 45,
            key_analytics: None,
        }];

        let text = rendered(Mode::Practice, &drill, &practice);
        assert!(text.contains("Practice History"));
        assert!(text.contains("MASTER"));
        assert!(!text.contains("NUMBERS"));
    }

    #[test]
    fn bad_timestamp_placeholder() {
        assert_eq!(format_timestamp(i64::MAX), "-");
        assert_eq!(format_timestamp(0).len(), 16);
    }
}
