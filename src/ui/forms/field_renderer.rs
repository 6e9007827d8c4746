//! Field rendering for wizard inputs and the estimation line form

use crate::state::FormField;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Draw a local form field
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FormField, is_active: bool) {
    draw_field_with_value(
        frame,
        area,
        &field.label,
        &field.display_value(),
        is_active,
        field.is_multiline,
    );
}

/// Draw a labelled value, used for draft fields that live outside a `FormField`
pub fn draw_field_with_value(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    is_active: bool,
    is_multiline: bool,
) {
    let accent = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let cursor = Span::styled(if is_active { "▌" } else { "" }, Style::default().fg(Color::Cyan));

    let shown = if value.is_empty() && !is_active {
        "(empty)"
    } else {
        value
    };

    let mut lines: Vec<Line> = if is_multiline {
        shown.lines().map(|l| Line::from(l.to_string())).collect()
    } else {
        vec![Line::from(Span::styled(shown.to_string(), accent))]
    };
    // A trailing newline starts a fresh line for the cursor
    if is_multiline && shown.ends_with('\n') {
        lines.push(Line::default());
    }
    match lines.last_mut() {
        Some(last) => last.spans.push(cursor),
        None => lines.push(Line::from(cursor)),
    }

    let block = Block::default()
        .title(format!(" {label} "))
        .borders(Borders::ALL)
        .border_style(accent);

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}
