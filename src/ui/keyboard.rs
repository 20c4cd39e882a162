use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// (key, label, width in cells)
type KeyCap = (char, &'static str, u16);

const NONE: char = '\0';

const ROWS: [&[KeyCap]; 5] = [
    &[
        ('`', "`", 3),
        ('1', "1", 3),
        ('2', "2", 3),
        ('3', "3", 3),
        ('4', "4", 3),
        ('5', "5", 3),
        ('6', "6", 3),
        ('7', "7", 3),
        ('8', "8", 3),
        ('9', "9", 3),
        ('0', "0", 3),
        ('-', "-", 3),
        ('=', "=", 3),
        (NONE, "⌫", 6),
    ],
    &[
        (NONE, "Tab", 5),
        ('q', "Q", 3),
        ('w', "W", 3),
        ('e', "E", 3),
        ('r', "R", 3),
        ('t', "T", 3),
        ('y', "Y", 3),
        ('u', "U", 3),
        ('i', "I", 3),
        ('o', "O", 3),
        ('p', "P", 3),
        ('[', "[", 3),
        (']', "]", 3),
        ('\\', "\\", 4),
    ],
    &[
        (NONE, "Caps", 6),
        ('a', "A", 3),
        ('s', "S", 3),
        ('d', "D", 3),
        ('f', "F", 3),
        ('g', "G", 3),
        ('h', "H", 3),
        ('j', "J", 3),
        ('k', "K", 3),
        ('l', "L", 3),
        (';', ";", 3),
        ('\'', "'", 3),
        (NONE, "↵", 6),
    ],
    &[
        (NONE, "Shift", 7),
        ('z', "Z", 3),
        ('x', "X", 3),
        ('c', "C", 3),
        ('v', "V", 3),
        ('b', "B", 3),
        ('n', "N", 3),
        ('m', "M", 3),
        (',', ",", 3),
        ('.', ".", 3),
        ('/', "/", 3),
        (NONE, "Shift", 7),
    ],
    &[(' ', "", 21)],
];

/// On-screen keyboard highlighting the drill target and the last pressed key
pub struct Keyboard {
    pub active: Option<char>,
    pub pressed: Option<char>,
}

impl Keyboard {
    pub const HEIGHT: u16 = ROWS.len() as u16;

    fn cap_style(&self, key: char) -> Style {
        let matches = |c: Option<char>| {
            key != NONE && c.is_some_and(|c| c.to_lowercase().eq(key.to_lowercase()))
        };
        if matches(self.active) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if matches(self.pressed) {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM)
        }
    }
}

fn centered(label: &str, width: u16) -> String {
    format!("{label:^width$}", width = width as usize)
}

impl Widget for &Keyboard {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = ROWS
            .iter()
            .map(|row| {
                let mut spans = Vec::with_capacity(row.len() * 2);
                for (idx, (key, label, width)) in row.iter().enumerate() {
                    if idx > 0 {
                        spans.push(Span::raw(" "));
                    }
                    spans.push(Span::styled(centered(label, *width), self.cap_style(*key)));
                }
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
