//! Wizard draft: the accumulated, not yet submitted assessment
//!
//! The draft is never mutated in place by a step. Steps describe their change
//! as a [`DraftUpdate`] and [`WizardDraft::apply`] returns the next version.

use crate::state::{ExclusionSelection, SurveyType};
use std::path::{Path, PathBuf};

/// Free-text and numeric inputs of the assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Conclusion,
    Recommendation,
    VehicleCondition,
    MarketValue,
    DamageDescription,
    EstimatedRepairCost,
}

impl DraftField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Conclusion => "Conclusion",
            Self::Recommendation => "Recommendation",
            Self::VehicleCondition => "Vehicle condition",
            Self::MarketValue => "Market value",
            Self::DamageDescription => "Damage description",
            Self::EstimatedRepairCost => "Estimated repair cost",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::MarketValue | Self::EstimatedRepairCost)
    }

    pub fn is_multiline(&self) -> bool {
        matches!(
            self,
            Self::Conclusion | Self::Recommendation | Self::DamageDescription
        )
    }
}

/// A required paper the surveyor confirms having collected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSlot {
    pub name: String,
    pub received: bool,
}

impl DocumentSlot {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            received: false,
        }
    }
}

/// A photo picked from the local filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    pub name: String,
    pub path: PathBuf,
}

impl PhotoAttachment {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

/// A single change to the draft
#[derive(Debug, Clone, PartialEq)]
pub enum DraftUpdate {
    SetText(DraftField, String),
    ToggleExclusionCategory(String),
    ToggleExclusionType { category: String, code: String },
    ToggleDocumentSlot(usize),
    AttachPhoto(PhotoAttachment),
    DetachPhoto(usize),
    /// Estimation total written back into the repair cost field
    SetRepairTotal(f64),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WizardDraft {
    pub conclusion: String,
    pub recommendation: String,
    pub vehicle_condition: String,
    pub market_value: String,
    pub damage_description: String,
    pub estimated_repair_cost: String,
    pub exclusions: ExclusionSelection,
    pub document_slots: Vec<DocumentSlot>,
    pub photos: Vec<PhotoAttachment>,
}

impl WizardDraft {
    /// Empty draft with the document slots the survey type expects
    pub fn for_survey(survey_type: &SurveyType) -> Self {
        let slots: &[&str] = match survey_type {
            SurveyType::Issuance => &["Vehicle registration", "Driving license", "ID card"],
            SurveyType::Claim => &["Police report", "Driving license", "Repair quotation"],
            SurveyType::Generic(_) => &[],
        };
        Self {
            document_slots: slots.iter().map(|name| DocumentSlot::new(name)).collect(),
            ..Default::default()
        }
    }

    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::Conclusion => &self.conclusion,
            DraftField::Recommendation => &self.recommendation,
            DraftField::VehicleCondition => &self.vehicle_condition,
            DraftField::MarketValue => &self.market_value,
            DraftField::DamageDescription => &self.damage_description,
            DraftField::EstimatedRepairCost => &self.estimated_repair_cost,
        }
    }

    fn field_mut(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::Conclusion => &mut self.conclusion,
            DraftField::Recommendation => &mut self.recommendation,
            DraftField::VehicleCondition => &mut self.vehicle_condition,
            DraftField::MarketValue => &mut self.market_value,
            DraftField::DamageDescription => &mut self.damage_description,
            DraftField::EstimatedRepairCost => &mut self.estimated_repair_cost,
        }
    }

    /// Required field is filled in (whitespace does not count)
    pub fn has_value(&self, field: DraftField) -> bool {
        !self.field(field).trim().is_empty()
    }

    /// Produce the next draft version
    pub fn apply(&self, update: DraftUpdate) -> Self {
        let mut next = self.clone();
        match update {
            DraftUpdate::SetText(field, value) => *next.field_mut(field) = value,
            DraftUpdate::ToggleExclusionCategory(category) => {
                next.exclusions.toggle_category(&category)
            }
            DraftUpdate::ToggleExclusionType { category, code } => {
                next.exclusions.toggle_type(&category, &code)
            }
            DraftUpdate::ToggleDocumentSlot(index) => {
                if let Some(slot) = next.document_slots.get_mut(index) {
                    slot.received = !slot.received;
                }
            }
            DraftUpdate::AttachPhoto(photo) => {
                if !next.photos.iter().any(|p| p.path == photo.path) {
                    next.photos.push(photo);
                }
            }
            DraftUpdate::DetachPhoto(index) => {
                if index < next.photos.len() {
                    next.photos.remove(index);
                }
            }
            DraftUpdate::SetRepairTotal(total) => {
                next.estimated_repair_cost = format!("{total:.2}");
            }
        }
        next
    }
}
