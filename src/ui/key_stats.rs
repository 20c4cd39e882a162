use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::scoring::KeyAnalytics;

pub struct KeyRowData {
    pub key: String,
    pub avg_latency: f64,
    pub miss_rate: f64,
    pub attempts: u32,
}

/// Pure presenter for a single key analytics row
pub fn present_row(data: &KeyRowData) -> Row<'static> {
    let key_display = if data.key == " " {
        "SPACE".to_string()
    } else {
        data.key.clone()
    };

    let time_color = if data.avg_latency < 150.0 {
        Color::Green
    } else if data.avg_latency < 250.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    let miss_color = if data.miss_rate == 0.0 {
        Color::Green
    } else if data.miss_rate < 10.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    Row::new(vec![
        Cell::from(key_display).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{:.0}", data.avg_latency)).style(Style::default().fg(time_color)),
        Cell::from(format!("{:.1}", data.miss_rate)).style(Style::default().fg(miss_color)),
        Cell::from(data.attempts.to_string()),
    ])
}

/// Keys ordered slowest first, ties broken by miss rate then key
pub fn slowest_keys(analytics: &KeyAnalytics, limit: usize) -> Vec<KeyRowData> {
    let mut rows: Vec<KeyRowData> = analytics
        .iter()
        .map(|(key, stat)| KeyRowData {
            key: key.clone(),
            avg_latency: stat.avg_latency,
            miss_rate: stat.miss_rate(),
            attempts: stat.total,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.avg_latency
            .partial_cmp(&a.avg_latency)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.miss_rate
                    .partial_cmp(&a.miss_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.key.cmp(&b.key))
    });
    rows.truncate(limit);
    rows
}

/// Table of the slowest keys of a round
pub fn render_key_stats(analytics: Option<&KeyAnalytics>, area: Rect, buf: &mut Buffer) {
    let Some(analytics) = analytics.filter(|a| !a.is_empty()) else {
        Paragraph::new("No key statistics for this round.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .render(area, buf);
        return;
    };

    let visible = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = slowest_keys(analytics, visible)
        .iter()
        .map(present_row)
        .collect();

    let header = Row::new(vec![
        Cell::from("Key"),
        Cell::from("Avg (ms)"),
        Cell::from("Miss (%)"),
        Cell::from("Hits"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let widths = [
        Constraint::Length(6),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Min(4),
    ];

    Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Slowest Keys"))
        .column_spacing(1)
        .render(area, buf);
}
