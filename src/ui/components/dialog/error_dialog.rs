//! Error dialog

use super::base::{render_dialog, DialogConfig};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    Frame,
};

/// Render the oldest queued error; `remaining` counts the whole queue
pub fn render_error_dialog(frame: &mut Frame, message: &str, remaining: usize) {
    let key = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let hint = vec![
        Span::raw("Press "),
        Span::styled("Enter", key),
        Span::raw(" or "),
        Span::styled("Esc", key),
        Span::raw(" to dismiss"),
    ];

    let title = if remaining > 1 {
        format!("Error (1 of {remaining})")
    } else {
        "Error".to_string()
    };

    render_dialog(
        frame,
        DialogConfig {
            title,
            accent: Color::Red,
            message,
            hint,
            max_width: 64,
        },
    );
}
