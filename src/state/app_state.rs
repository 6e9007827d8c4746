//! Application state definitions

use crate::state::Survey;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Surveys,
    Wizard,
}

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A message shown to the surveyor
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn new(level: NotificationLevel, message: String) -> Self {
        Self {
            level,
            message,
            created_at: Utc::now(),
        }
    }
}

/// Main application state
#[derive(Debug, Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,

    // Data
    pub surveys: Vec<Survey>,
    pub selected_index: usize,
    pub surveys_loading: bool,
    /// Inline banner for a failed survey load
    pub load_error: Option<String>,

    // UI state
    pub portal_connected: bool,
    /// Pending errors, shown one at a time in a modal dialog
    errors: VecDeque<Notification>,
    /// Last success message, shown in the status bar
    success: Option<Notification>,
}

impl AppState {
    /// Move selection down
    pub fn move_selection_down(&mut self) {
        if !self.surveys.is_empty() && self.selected_index < self.surveys.len() - 1 {
            self.selected_index += 1;
        }
    }

    /// Move selection up
    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn selected_survey(&self) -> Option<&Survey> {
        self.surveys.get(self.selected_index)
    }

    /// Replace the survey list, keeping the selection in range
    pub fn set_surveys(&mut self, surveys: Vec<Survey>) {
        self.surveys = surveys;
        if self.selected_index >= self.surveys.len() {
            self.selected_index = self.surveys.len().saturating_sub(1);
        }
    }

    /// Queue an error for the error dialog
    pub fn push_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "Showing error");
        self.errors
            .push_back(Notification::new(NotificationLevel::Error, message));
    }

    pub fn push_success(&mut self, message: impl Into<String>) {
        self.success = Some(Notification::new(NotificationLevel::Success, message.into()));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Error currently displayed
    pub fn current_error(&self) -> Option<&Notification> {
        self.errors.front()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn dismiss_error(&mut self) {
        self.errors.pop_front();
    }

    pub fn success_message(&self) -> Option<&Notification> {
        self.success.as_ref()
    }

    pub fn clear_success(&mut self) {
        self.success = None;
    }
}
