//! Bordered button

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

/// Render a button; a disabled button is greyed out even when focused
pub fn render_button(
    frame: &mut Frame,
    area: Rect,
    content: &str,
    is_focused: bool,
    is_enabled: bool,
) {
    let (border, text) = match (is_enabled, is_focused) {
        (false, _) => (
            Style::default().fg(Color::DarkGray),
            Style::default().fg(Color::DarkGray),
        ),
        (true, true) => (
            Style::default().fg(Color::Green),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        (true, false) => (Style::default().fg(Color::Gray), Style::default()),
    };

    let block = Block::default().borders(Borders::ALL).border_style(border);
    frame.render_widget(
        Paragraph::new(format!(" {content} ")).style(text).block(block),
        area,
    );
}
