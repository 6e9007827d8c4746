//! Assigned survey list

use super::render_scrollable_list;
use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Draw the surveys list
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Assigned Surveys ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let banner_height = if app.state.load_error.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(banner_height), Constraint::Min(0)])
        .split(area);

    if let Some(error) = &app.state.load_error {
        super::draw_banner(frame, chunks[0], error);
    }

    if app.state.surveys.is_empty() {
        let message = if app.state.surveys_loading {
            "Loading surveys..."
        } else {
            "No surveys assigned.\nPress 'r' to refresh."
        };
        let content = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: false })
            .block(block);
        frame.render_widget(content, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = app
        .state
        .surveys
        .iter()
        .enumerate()
        .map(|(idx, survey)| {
            let is_selected = idx == app.state.selected_index;
            let prefix = if is_selected { "▸" } else { " " };

            let style = if is_selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let state_color = if survey.is_completed() {
                Color::Green
            } else {
                Color::Yellow
            };

            let line = Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(format!("#{:<5}", survey.id), Style::default().fg(Color::Cyan)),
                Span::raw(" "),
                Span::styled(
                    format!("[{:<9}]", survey.survey_type.label()),
                    Style::default().fg(Color::Magenta),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("[{}]", survey.state_label()),
                    Style::default().fg(state_color),
                ),
                Span::raw(" "),
                Span::styled(survey.display_name(), style),
                Span::styled(
                    survey
                        .partner_name
                        .as_deref()
                        .map(|p| format!("  {p}"))
                        .unwrap_or_default(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    render_scrollable_list(frame, chunks[1], list, app.state.selected_index);
}
