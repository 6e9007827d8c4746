//! An open survey: wizard, estimation lines and the input widgets around them

use crate::platform::is_submit_shortcut;
use crate::portal::{PortalApi, PortalResult};
use crate::state::{
    push_input_char, required_technical_fields, DraftField, DraftUpdate, EstimationAggregator,
    EstimationDetails, EstimationLineForm, ExclusionCategory, Form, FormField, LineId,
    PhotoAttachment, StepKind, SurveyBundle, Wizard,
};
use crate::workflow::{
    LoadOutcome, SubmissionOrchestrator, SubmitError, SubmitReceipt, SurveyFetcher,
    ESTIMATION_LOAD_ERROR,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::Path;
use std::sync::Arc;

/// Shown when a key would edit a completed survey
pub const READ_ONLY_HINT: &str = "Survey is completed and read-only";

/// Work the session hands back to the app because it needs the network or
/// changes the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    None,
    Leave,
    Submit,
    LoadEstimation(i64),
}

/// A selectable row on the exclusions step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionRow {
    Category(usize),
    Type { category: usize, kind: usize },
}

/// Flatten categories and their types into one navigable list
pub fn exclusion_rows(categories: &[ExclusionCategory]) -> Vec<ExclusionRow> {
    categories
        .iter()
        .enumerate()
        .flat_map(|(category, entry)| {
            std::iter::once(ExclusionRow::Category(category)).chain(
                (0..entry.types.len()).map(move |kind| ExclusionRow::Type { category, kind }),
            )
        })
        .collect()
}

pub struct WizardSession {
    pub bundle: SurveyBundle,
    pub wizard: Wizard,
    pub lines: EstimationAggregator,
    pub line_form: EstimationLineForm,
    pub photo_path: FormField,
    /// Non-fatal load failures, shown as a banner
    pub load_errors: Vec<String>,
    /// Validation feedback for the current step
    pub hint: Option<String>,
    /// Focused text input on input steps
    pub field_focus: usize,
    /// Cursor in the list shown on the current step
    pub cursor: usize,
    /// Documents step: typing goes to the photo path input
    pub path_focused: bool,
    pub orchestrator: SubmissionOrchestrator,
    fetcher: SurveyFetcher,
}

impl WizardSession {
    /// Load a survey and open the wizard on its first step
    pub async fn open(client: Arc<dyn PortalApi>, survey_id: i64) -> PortalResult<Self> {
        let fetcher = SurveyFetcher::new(Arc::clone(&client));
        let outcome = fetcher.load(survey_id).await?;
        Ok(Self::from_outcome(
            outcome,
            fetcher,
            SubmissionOrchestrator::new(client),
        ))
    }

    fn from_outcome(
        outcome: LoadOutcome,
        fetcher: SurveyFetcher,
        orchestrator: SubmissionOrchestrator,
    ) -> Self {
        let LoadOutcome { bundle, errors } = outcome;
        let mut wizard = Wizard::new(bundle.survey.survey_type.clone());
        let lines = bundle
            .estimation
            .as_ref()
            .map(EstimationAggregator::from_details)
            .unwrap_or_default();
        if !lines.is_empty() {
            wizard.update(DraftUpdate::SetRepairTotal(lines.total()));
        }
        Self {
            wizard,
            lines,
            line_form: EstimationLineForm::new(),
            photo_path: FormField::text("photo_path", "Photo path", false),
            load_errors: errors,
            hint: None,
            field_focus: 0,
            cursor: 0,
            path_focused: false,
            orchestrator,
            fetcher,
            bundle,
        }
    }

    pub fn survey_id(&self) -> i64 {
        self.bundle.survey.id
    }

    /// Completed surveys can be browsed but not edited
    pub fn is_read_only(&self) -> bool {
        self.bundle.survey.is_completed()
    }

    /// Fetch the estimation through the session's shared guard.
    ///
    /// The banner holds at most one estimation failure and drops it once a
    /// retry succeeds.
    pub async fn load_estimation(&mut self, estimation_id: i64) -> PortalResult<()> {
        self.load_errors
            .retain(|e| !e.starts_with(ESTIMATION_LOAD_ERROR));
        match self.fetcher.ensure_estimation(estimation_id).await {
            Ok(details) => {
                self.merge_estimation(&details);
                Ok(())
            }
            Err(e) => {
                self.load_errors
                    .push(format!("{ESTIMATION_LOAD_ERROR}: {e}"));
                Err(e)
            }
        }
    }

    /// Fold fetched lines in beside any the surveyor added meanwhile
    fn merge_estimation(&mut self, details: &EstimationDetails) {
        let total = self.lines.merge_details(details);
        tracing::debug!(
            estimation_id = details.id,
            server_total = details.amount_total,
            local_total = total,
            "Merged estimation lines"
        );
        if !self.lines.is_empty() {
            self.wizard.update(DraftUpdate::SetRepairTotal(total));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SessionCommand {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc if self.path_focused => {
                self.path_focused = false;
                return SessionCommand::None;
            }
            KeyCode::Esc => return SessionCommand::Leave,
            KeyCode::PageDown => return self.next_step(),
            KeyCode::Right if ctrl => return self.next_step(),
            KeyCode::PageUp => return self.prev_step(),
            KeyCode::Left if ctrl => return self.prev_step(),
            KeyCode::F(n) => return self.jump_to(n as usize),
            _ => {}
        }

        if self.is_read_only() {
            self.hint = Some(READ_ONLY_HINT.to_string());
            return SessionCommand::None;
        }
        if is_submit_shortcut(&key) {
            return SessionCommand::Submit;
        }

        self.hint = None;
        match self.wizard.current_kind() {
            StepKind::Review => SessionCommand::None,
            StepKind::Input | StepKind::TechnicalView => {
                self.handle_text_key(key);
                SessionCommand::None
            }
            StepKind::Exclusions => {
                self.handle_exclusions_key(key);
                SessionCommand::None
            }
            StepKind::Estimation => {
                self.handle_estimation_key(key);
                SessionCommand::None
            }
            StepKind::Documents => {
                self.handle_documents_key(key);
                SessionCommand::None
            }
            StepKind::Submit => match key.code {
                KeyCode::Enter => SessionCommand::Submit,
                _ => SessionCommand::None,
            },
        }
    }

    fn next_step(&mut self) -> SessionCommand {
        if self.wizard.is_final_step() {
            return SessionCommand::None;
        }
        if !self.wizard.try_advance() {
            self.hint = Some(self.blocked_reason());
            return SessionCommand::None;
        }
        self.step_entered()
    }

    fn prev_step(&mut self) -> SessionCommand {
        self.wizard.retreat();
        self.step_entered()
    }

    fn jump_to(&mut self, n: usize) -> SessionCommand {
        let before = self.wizard.current_step();
        self.wizard.jump_to(n);
        if self.wizard.current_step() == before {
            return SessionCommand::None;
        }
        self.step_entered()
    }

    fn step_entered(&mut self) -> SessionCommand {
        self.hint = None;
        self.field_focus = 0;
        self.cursor = 0;
        self.path_focused = false;
        tracing::debug!(step = self.wizard.current_step(), "Entered wizard step");

        match (self.wizard.current_kind(), self.bundle.estimation_id()) {
            (StepKind::Estimation, Some(id)) if self.lines.estimation_id().is_none() => {
                SessionCommand::LoadEstimation(id)
            }
            _ => SessionCommand::None,
        }
    }

    /// Why the current step refuses to advance
    pub fn blocked_reason(&self) -> String {
        match self.wizard.current_kind() {
            StepKind::Exclusions => format!(
                "Select at least one type for: {}",
                self.wizard
                    .draft()
                    .exclusions
                    .incomplete_categories()
                    .join(", ")
            ),
            StepKind::TechnicalView => {
                let missing: Vec<&str> = required_technical_fields(self.wizard.survey_type())
                    .iter()
                    .filter(|field| !self.wizard.draft().has_value(**field))
                    .map(DraftField::label)
                    .collect();
                format!("Required: {}", missing.join(", "))
            }
            _ => "This step is not complete".to_string(),
        }
    }

    /// Field currently receiving text on an input step
    pub fn focused_field(&self) -> Option<DraftField> {
        self.wizard
            .input_fields(self.wizard.current_kind())
            .get(self.field_focus)
            .copied()
    }

    fn handle_text_key(&mut self, key: KeyEvent) {
        let fields = self.wizard.input_fields(self.wizard.current_kind());
        if fields.is_empty() {
            return;
        }
        let Some(field) = fields.get(self.field_focus).copied() else {
            self.field_focus = 0;
            return;
        };

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.field_focus = (self.field_focus + 1) % fields.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.field_focus = (self.field_focus + fields.len() - 1) % fields.len();
            }
            KeyCode::Enter if field.is_multiline() => self.type_char(field, '\n'),
            KeyCode::Enter => {
                self.field_focus = (self.field_focus + 1) % fields.len();
            }
            KeyCode::Backspace => {
                let mut value = self.wizard.draft().field(field).to_string();
                if value.pop().is_some() {
                    self.wizard.update(DraftUpdate::SetText(field, value));
                }
            }
            KeyCode::Char(c) => self.type_char(field, c),
            _ => {}
        }
    }

    fn type_char(&mut self, field: DraftField, c: char) {
        if let Some(value) = push_input_char(self.wizard.draft().field(field), c, field.is_numeric())
        {
            self.wizard.update(DraftUpdate::SetText(field, value));
        }
    }

    fn handle_exclusions_key(&mut self, key: KeyEvent) {
        let rows = exclusion_rows(&self.bundle.exclusion_categories);
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < rows.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let categories = &self.bundle.exclusion_categories;
                let update = match rows.get(self.cursor) {
                    Some(ExclusionRow::Category(index)) => {
                        DraftUpdate::ToggleExclusionCategory(categories[*index].name.clone())
                    }
                    Some(ExclusionRow::Type { category, kind }) => {
                        let entry = &categories[*category];
                        DraftUpdate::ToggleExclusionType {
                            category: entry.name.clone(),
                            code: entry.types[*kind].code.clone(),
                        }
                    }
                    None => return,
                };
                self.wizard.update(update);
            }
            _ => {}
        }
    }

    fn handle_estimation_key(&mut self, key: KeyEvent) {
        let item_type_count = self.bundle.item_types.len();
        match key.code {
            KeyCode::Tab => self.line_form.next_field(),
            KeyCode::BackTab => self.line_form.prev_field(),
            KeyCode::Right => self.line_form.next_item_type(item_type_count),
            KeyCode::Left => self.line_form.prev_item_type(item_type_count),
            KeyCode::Down => {
                if self.cursor + 1 < self.lines.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(line) = self.lines.items().get(self.cursor) {
                    self.line_form.load_line(line, &self.bundle.item_types);
                }
            }
            KeyCode::Enter if self.line_form.editing.is_some() => self.update_line(),
            KeyCode::Enter => self.add_line(),
            KeyCode::Delete => self.remove_line_at_cursor(),
            KeyCode::Backspace => self.line_form.get_active_field_mut().pop_char(),
            KeyCode::Char(c) => self.line_form.get_active_field_mut().push_char(c),
            _ => {}
        }
    }

    /// Validate the line form and append it to the estimation
    pub fn add_line(&mut self) {
        match self.line_form.to_draft(&self.bundle.item_types) {
            Ok(draft) => {
                let total = self.lines.add_item(draft);
                self.wizard.update(DraftUpdate::SetRepairTotal(total));
                self.line_form.reset();
                self.cursor = self.lines.len() - 1;
            }
            Err(e) => self.hint = Some(e.to_string()),
        }
    }

    /// Apply the form to the line loaded for editing
    pub fn update_line(&mut self) {
        let Some(id) = self.line_form.editing else {
            return;
        };
        let result = self
            .line_form
            .to_patch()
            .map_err(|e| e.to_string())
            .and_then(|patch| self.lines.update_item(id, patch).map_err(|e| e.to_string()));
        match result {
            Ok(total) => {
                self.wizard.update(DraftUpdate::SetRepairTotal(total));
                self.line_form.reset();
            }
            Err(message) => self.hint = Some(message),
        }
    }

    fn remove_line_at_cursor(&mut self) {
        let Some(id) = self.lines.items().get(self.cursor).map(|line| line.id) else {
            return;
        };
        self.remove_line(id);
    }

    pub fn remove_line(&mut self, id: LineId) {
        match self.lines.remove_item(id) {
            Ok(total) => {
                self.wizard.update(DraftUpdate::SetRepairTotal(total));
                self.cursor = self.cursor.min(self.lines.len().saturating_sub(1));
            }
            Err(e) => self.hint = Some(e.to_string()),
        }
    }

    /// Number of rows on the documents step: slots, then attached photos
    fn document_rows(&self) -> usize {
        let draft = self.wizard.draft();
        draft.document_slots.len() + draft.photos.len()
    }

    fn handle_documents_key(&mut self, key: KeyEvent) {
        if self.path_focused {
            match key.code {
                KeyCode::Tab => self.path_focused = false,
                KeyCode::Enter => self.attach_photo(),
                KeyCode::Backspace => self.photo_path.pop_char(),
                KeyCode::Char(c) => self.photo_path.push_char(c),
                _ => {}
            }
            return;
        }

        let slot_count = self.wizard.draft().document_slots.len();
        match key.code {
            KeyCode::Tab => self.path_focused = true,
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.document_rows() {
                    self.cursor += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Char(' ') | KeyCode::Enter if self.cursor < slot_count => {
                self.wizard
                    .update(DraftUpdate::ToggleDocumentSlot(self.cursor));
            }
            KeyCode::Delete | KeyCode::Char('d') if self.cursor >= slot_count => {
                self.wizard
                    .update(DraftUpdate::DetachPhoto(self.cursor - slot_count));
                self.cursor = self.cursor.min(self.document_rows().saturating_sub(1));
            }
            _ => {}
        }
    }

    /// Attach the file named in the photo path input
    pub fn attach_photo(&mut self) {
        let raw = self.photo_path.as_text().trim().to_string();
        if raw.is_empty() {
            return;
        }
        let path = Path::new(&raw);
        if !path.is_file() {
            self.hint = Some(format!("No such file: {raw}"));
            return;
        }
        self.wizard
            .update(DraftUpdate::AttachPhoto(PhotoAttachment::from_path(path)));
        self.photo_path.clear();
    }

    /// Run the submission for this session
    pub async fn submit(&mut self) -> Result<SubmitReceipt, SubmitError> {
        self.orchestrator
            .submit(&self.bundle.survey, &self.wizard, &self.lines)
            .await
    }
}
