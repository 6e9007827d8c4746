//! Survey wizard step sequencer

use super::draft::{DraftField, DraftUpdate, WizardDraft};
use super::survey::SurveyType;

/// What a wizard step collects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Review,
    Input,
    Exclusions,
    Estimation,
    Documents,
    TechnicalView,
    Submit,
}

impl StepKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Review => "Review",
            Self::Input => "Input",
            Self::Exclusions => "Exclusions",
            Self::Estimation => "Estimation",
            Self::Documents => "Documents",
            Self::TechnicalView => "Technical View",
            Self::Submit => "Submit",
        }
    }
}

/// Steps for a survey type: 3 for generic surveys, 5 for issuance and claim
pub fn step_plan(survey_type: &SurveyType) -> Vec<StepKind> {
    match survey_type {
        SurveyType::Issuance => vec![
            StepKind::Review,
            StepKind::Exclusions,
            StepKind::Documents,
            StepKind::TechnicalView,
            StepKind::Submit,
        ],
        SurveyType::Claim => vec![
            StepKind::Review,
            StepKind::Estimation,
            StepKind::Documents,
            StepKind::TechnicalView,
            StepKind::Submit,
        ],
        SurveyType::Generic(_) => vec![StepKind::Review, StepKind::Input, StepKind::Submit],
    }
}

/// Fields the technical step refuses to leave empty
pub fn required_technical_fields(survey_type: &SurveyType) -> &'static [DraftField] {
    match survey_type {
        SurveyType::Issuance => &[DraftField::VehicleCondition, DraftField::MarketValue],
        SurveyType::Claim => &[
            DraftField::DamageDescription,
            DraftField::EstimatedRepairCost,
        ],
        SurveyType::Generic(_) => &[],
    }
}

/// Multi-step wizard state: current position plus the threaded draft
#[derive(Debug, Clone)]
pub struct Wizard {
    survey_type: SurveyType,
    steps: Vec<StepKind>,
    /// 1-indexed
    current_step: usize,
    draft: WizardDraft,
    revision: u64,
}

impl Wizard {
    pub fn new(survey_type: SurveyType) -> Self {
        let draft = WizardDraft::for_survey(&survey_type);
        Self::with_draft(survey_type, draft)
    }

    pub fn with_draft(survey_type: SurveyType, draft: WizardDraft) -> Self {
        Self {
            steps: step_plan(&survey_type),
            survey_type,
            current_step: 1,
            draft,
            revision: 0,
        }
    }

    pub fn survey_type(&self) -> &SurveyType {
        &self.survey_type
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn step_titles(&self) -> Vec<&'static str> {
        self.steps.iter().map(StepKind::title).collect()
    }

    pub fn current_kind(&self) -> StepKind {
        self.steps[self.current_step - 1]
    }

    pub fn is_final_step(&self) -> bool {
        self.current_step == self.total_steps()
    }

    /// Move forward one step; no-op on the last step
    pub fn advance(&mut self) {
        if self.current_step < self.total_steps() {
            self.current_step += 1;
        }
    }

    /// Move back one step; no-op on the first step
    pub fn retreat(&mut self) {
        if self.current_step > 1 {
            self.current_step -= 1;
        }
    }

    /// Jump to step `n`; out-of-range targets are ignored
    pub fn jump_to(&mut self, n: usize) {
        if (1..=self.total_steps()).contains(&n) {
            self.current_step = n;
        }
    }

    /// Whether the current step's inputs allow moving on
    pub fn can_advance(&self) -> bool {
        match self.current_kind() {
            StepKind::Exclusions => self.draft.exclusions.is_complete(),
            StepKind::TechnicalView => required_technical_fields(&self.survey_type)
                .iter()
                .all(|field| self.draft.has_value(*field)),
            _ => true,
        }
    }

    /// Advance only if the current step validates
    pub fn try_advance(&mut self) -> bool {
        if !self.can_advance() || self.is_final_step() {
            return false;
        }
        self.advance();
        true
    }

    /// Text fields edited on the given step
    pub fn input_fields(&self, kind: StepKind) -> Vec<DraftField> {
        match kind {
            StepKind::Input => vec![DraftField::Conclusion, DraftField::Recommendation],
            StepKind::TechnicalView => {
                let mut fields = required_technical_fields(&self.survey_type).to_vec();
                fields.extend([DraftField::Conclusion, DraftField::Recommendation]);
                fields
            }
            _ => Vec::new(),
        }
    }

    pub fn draft(&self) -> &WizardDraft {
        &self.draft
    }

    /// Number of draft versions produced so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the draft with the version produced by `update`
    pub fn update(&mut self, update: DraftUpdate) {
        self.draft = self.draft.apply(update);
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wizard_at(survey_type: SurveyType, step: usize) -> Wizard {
        let mut wizard = Wizard::new(survey_type);
        wizard.jump_to(step);
        wizard
    }

    #[test]
    fn test_issuance_plan() {
        let wizard = Wizard::new(SurveyType::Issuance);
        assert_eq!(wizard.total_steps(), 5);
        assert_eq!(
            wizard.step_titles(),
            vec!["Review", "Exclusions", "Documents", "Technical View", "Submit"]
        );
    }

    #[test]
    fn test_claim_plan() {
        let wizard = Wizard::new(SurveyType::Claim);
        assert_eq!(wizard.total_steps(), 5);
        assert_eq!(wizard.step_titles()[1], "Estimation");
    }

    #[test]
    fn test_generic_plan() {
        let wizard = Wizard::new(SurveyType::Generic("fleet".to_string()));
        assert_eq!(wizard.step_titles(), vec!["Review", "Input", "Submit"]);
    }

    #[test]
    fn test_starts_on_first_step() {
        let wizard = Wizard::new(SurveyType::Claim);
        assert_eq!(wizard.current_step(), 1);
        assert_eq!(wizard.current_kind(), StepKind::Review);
        assert!(wizard.can_advance());
    }

    #[test]
    fn test_advance_stops_at_last_step() {
        let mut wizard = Wizard::new(SurveyType::default());
        for _ in 0..10 {
            wizard.advance();
        }
        assert_eq!(wizard.current_step(), 3);
        assert!(wizard.is_final_step());

        wizard.advance();
        assert_eq!(wizard.current_step(), 3);
    }

    #[test]
    fn test_retreat_stops_at_first_step() {
        let mut wizard = wizard_at(SurveyType::Issuance, 2);
        wizard.retreat();
        wizard.retreat();
        assert_eq!(wizard.current_step(), 1);
    }

    #[test]
    fn test_jump_to_out_of_range_is_ignored() {
        for survey_type in [SurveyType::Issuance, SurveyType::default()] {
            let mut wizard = wizard_at(survey_type, 2);
            let total = wizard.total_steps();
            for n in [0, total + 1, total + 50, usize::MAX] {
                wizard.jump_to(n);
                assert_eq!(wizard.current_step(), 2);
            }
        }
    }

    #[test]
    fn test_jump_to_in_range() {
        let mut wizard = Wizard::new(SurveyType::Issuance);
        wizard.jump_to(5);
        assert_eq!(wizard.current_kind(), StepKind::Submit);
        wizard.jump_to(1);
        assert_eq!(wizard.current_kind(), StepKind::Review);
    }

    #[test]
    fn test_jump_ignores_validation() {
        let mut wizard = wizard_at(SurveyType::Issuance, 4);
        assert!(!wizard.can_advance());
        wizard.jump_to(5);
        assert_eq!(wizard.current_step(), 5);
    }

    #[test]
    fn test_exclusions_step_requires_types() {
        let mut wizard = wizard_at(SurveyType::Issuance, 2);
        assert!(wizard.can_advance());

        wizard.update(DraftUpdate::ToggleExclusionCategory("Body".to_string()));
        assert!(!wizard.can_advance());
        assert!(!wizard.try_advance());
        assert_eq!(wizard.current_step(), 2);

        wizard.update(DraftUpdate::ToggleExclusionType {
            category: "Body".to_string(),
            code: "rust".to_string(),
        });
        assert!(wizard.try_advance());
        assert_eq!(wizard.current_kind(), StepKind::Documents);
    }

    #[test]
    fn test_technical_step_issuance_fields() {
        let mut wizard = wizard_at(SurveyType::Issuance, 4);
        wizard.update(DraftUpdate::SetText(
            DraftField::VehicleCondition,
            "Good".to_string(),
        ));
        assert!(!wizard.can_advance());
        wizard.update(DraftUpdate::SetText(DraftField::MarketValue, "12000".to_string()));
        assert!(wizard.can_advance());
    }

    #[test]
    fn test_technical_step_claim_fields() {
        let mut wizard = wizard_at(SurveyType::Claim, 4);
        wizard.update(DraftUpdate::SetText(
            DraftField::DamageDescription,
            "Rear impact".to_string(),
        ));
        assert!(!wizard.can_advance());
        wizard.update(DraftUpdate::SetRepairTotal(350.0));
        assert!(wizard.can_advance());
    }

    #[test]
    fn test_try_advance_on_final_step() {
        let mut wizard = wizard_at(SurveyType::Claim, 5);
        assert!(!wizard.try_advance());
        assert_eq!(wizard.current_step(), 5);
    }

    #[test]
    fn test_update_bumps_revision() {
        let mut wizard = Wizard::new(SurveyType::Claim);
        let before = wizard.draft().clone();
        wizard.update(DraftUpdate::SetText(DraftField::Conclusion, "ok".to_string()));
        assert_eq!(wizard.revision(), 1);
        assert_eq!(before.conclusion, "");
        assert_eq!(wizard.draft().conclusion, "ok");
    }

    #[test]
    fn test_input_fields() {
        let wizard = Wizard::new(SurveyType::Claim);
        assert_eq!(
            wizard.input_fields(StepKind::TechnicalView),
            vec![
                DraftField::DamageDescription,
                DraftField::EstimatedRepairCost,
                DraftField::Conclusion,
                DraftField::Recommendation,
            ]
        );
        assert!(wizard.input_fields(StepKind::Review).is_empty());
    }
}
