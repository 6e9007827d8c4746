//! UI module for rendering the TUI

mod components;
mod forms;
mod layout;
mod surveys;
mod widgets;
mod wizard;

pub use widgets::render_scrollable_list;

use crate::app::App;
use crate::state::View;
use components::render_error_dialog;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let main_area = layout::create_layout(frame.area());

    match app.state.current_view {
        View::Surveys => surveys::draw(frame, main_area, app),
        View::Wizard => wizard::draw(frame, main_area, app),
    }

    layout::draw_status_bar(frame, app);

    if let Some(error) = app.state.current_error() {
        render_error_dialog(frame, &error.message, app.state.error_count());
    }
}

/// Red bordered strip for failures that do not block the view
fn draw_banner(frame: &mut Frame, area: Rect, message: &str) {
    let banner = Paragraph::new(message)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(banner, area);
}
