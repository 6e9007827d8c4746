//! Layout components (content area, status bar)

use crate::app::App;
use crate::platform::SUBMIT_SHORTCUT;
use crate::state::{NotificationLevel, StepKind, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split off the bottom line for the status bar
pub fn create_layout(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    chunks[0]
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![];

    // Connection status
    let conn_status = if app.state.portal_connected {
        Span::styled(" ● ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ○ ", Style::default().fg(Color::Red))
    };
    spans.push(conn_status);

    spans.push(Span::styled(
        view_hints(app),
        Style::default().fg(Color::Gray),
    ));

    if let Some(notification) = app.state.success_message() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!(
                "{} ({})",
                notification.message,
                notification.created_at.format("%H:%M")
            ),
            Style::default().fg(level_color(notification.level)),
        ));
    }

    spans.push(Span::raw(" | "));
    spans.push(Span::styled(
        app.portal_label.as_str(),
        Style::default().fg(Color::Blue),
    ));

    let quit_hint = " ^C:quit ";
    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: quit_hint.len() as u16,
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

fn level_color(level: NotificationLevel) -> Color {
    match level {
        NotificationLevel::Success => Color::Green,
        NotificationLevel::Error => Color::Red,
    }
}

/// Get keyboard hints for the current view and step
fn view_hints(app: &App) -> String {
    let step = app.session.as_ref().map(|s| s.wizard.current_kind());
    match (app.state.current_view, step) {
        (View::Surveys, _) => "j/k:nav  Enter:open  r:refresh  q:quit".to_string(),
        (View::Wizard, Some(StepKind::Review)) | (View::Wizard, None) => {
            "PgDn:next  F1-F5:jump  Esc:leave".to_string()
        }
        (View::Wizard, Some(StepKind::Input | StepKind::TechnicalView)) => {
            "Tab:field  PgUp/PgDn:step  Esc:leave".to_string()
        }
        (View::Wizard, Some(StepKind::Exclusions)) => {
            "j/k:nav  Space:toggle  PgUp/PgDn:step".to_string()
        }
        (View::Wizard, Some(StepKind::Estimation)) => {
            "Tab:field  ←/→:type  Enter:save  ^E:edit  Del:remove".to_string()
        }
        (View::Wizard, Some(StepKind::Documents)) => {
            "Space:received  Tab:photo path  Enter:attach  d:detach".to_string()
        }
        (View::Wizard, Some(StepKind::Submit)) => {
            format!("Enter/{SUBMIT_SHORTCUT}:submit  PgUp:back  Esc:leave")
        }
    }
}
