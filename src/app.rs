//! Application state and core logic

use crate::portal::PortalApi;
use crate::session::{SessionCommand, WizardSession};
use crate::state::{AppState, View};
use crate::workflow::SubmitError;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Open wizard, present only in the wizard view
    pub session: Option<WizardSession>,
    /// Portal address shown in the status bar
    pub portal_label: String,
    client: Arc<dyn PortalApi>,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App instance and load the surveyor's list
    pub async fn new(client: Arc<dyn PortalApi>, portal_label: impl Into<String>) -> Result<Self> {
        let mut app = Self {
            state: AppState::default(),
            session: None,
            portal_label: portal_label.into(),
            client,
            quit: false,
        };
        app.refresh_surveys().await;
        Ok(app)
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn in_wizard(&self) -> bool {
        self.state.current_view == View::Wizard && self.session.is_some()
    }

    /// Reload assigned surveys; failures become the list banner
    pub async fn refresh_surveys(&mut self) {
        self.state.surveys_loading = true;
        match self.client.list_assigned_surveys().await {
            Ok(surveys) => {
                tracing::info!(count = surveys.len(), "Loaded assigned surveys");
                self.state.portal_connected = true;
                self.state.load_error = None;
                self.state.set_surveys(surveys);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Survey list load failed");
                self.state.portal_connected = false;
                self.state.load_error = Some(format!("Could not load surveys: {e}"));
            }
        }
        self.state.surveys_loading = false;
    }

    /// Load a survey and switch to its wizard
    pub async fn open_survey(&mut self, survey_id: i64) {
        match WizardSession::open(Arc::clone(&self.client), survey_id).await {
            Ok(session) => {
                tracing::info!(
                    survey_id,
                    steps = session.wizard.total_steps(),
                    "Opened survey wizard"
                );
                self.state.load_error = None;
                self.session = Some(session);
                self.state.current_view = View::Wizard;
            }
            Err(e) => {
                tracing::warn!(survey_id, error = %e, "Survey load failed");
                self.state.load_error = Some(format!("Could not load survey {survey_id}: {e}"));
                self.state.current_view = View::Surveys;
            }
        }
    }

    /// Discard the wizard and return to the list
    pub fn leave_wizard(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(survey_id = session.survey_id(), "Left survey wizard");
        }
        self.state.current_view = View::Surveys;
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Error dialog is modal
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return Ok(());
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return Ok(());
        }

        match self.state.current_view {
            View::Surveys => self.handle_surveys_key(key).await,
            View::Wizard => self.handle_wizard_key(key).await,
        }
        Ok(())
    }

    async fn handle_surveys_key(&mut self, key: KeyEvent) {
        self.state.clear_success();
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.state.move_selection_down(),
            KeyCode::Up | KeyCode::Char('k') => self.state.move_selection_up(),
            KeyCode::Char('r') => self.refresh_surveys().await,
            KeyCode::Enter => {
                if let Some(survey_id) = self.state.selected_survey().map(|s| s.id) {
                    self.open_survey(survey_id).await;
                }
            }
            _ => {}
        }
    }

    async fn handle_wizard_key(&mut self, key: KeyEvent) {
        let Some(session) = self.session.as_mut() else {
            self.state.current_view = View::Surveys;
            return;
        };

        match session.handle_key(key) {
            SessionCommand::None => {}
            SessionCommand::Leave => self.leave_wizard(),
            SessionCommand::Submit => self.submit().await,
            SessionCommand::LoadEstimation(estimation_id) => {
                if let Err(e) = session.load_estimation(estimation_id).await {
                    tracing::warn!(estimation_id, error = %e, "Estimation load failed");
                }
            }
        }
    }

    /// Submit the open survey.
    ///
    /// Success returns to a refreshed list; failure leaves the wizard where it
    /// was so the surveyor can retry.
    pub async fn submit(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match session.submit().await {
            Ok(_) => {
                let name = session.bundle.survey.display_name();
                self.state.push_success(format!("{name} submitted"));
                self.leave_wizard();
                self.refresh_surveys().await;
            }
            Err(SubmitError::NotOnFinalStep) => {
                session.hint = Some(SubmitError::NotOnFinalStep.to_string());
            }
            Err(e) => self.state.push_error(e.to_string()),
        }
    }
}
