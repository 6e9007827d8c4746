//! Survey records as delivered by the portal

use crate::portal::envelope::{lenient_amount, many2one, optional_text};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Survey kind, decides the wizard's step plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SurveyType {
    Issuance,
    Claim,
    /// Any other tenant-defined type; handled as a generic survey
    Generic(String),
}

impl Default for SurveyType {
    fn default() -> Self {
        SurveyType::Generic(String::new())
    }
}

impl From<String> for SurveyType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "issuance" => SurveyType::Issuance,
            "claim" => SurveyType::Claim,
            _ => SurveyType::Generic(value),
        }
    }
}

impl From<SurveyType> for String {
    fn from(value: SurveyType) -> Self {
        value.as_str().to_string()
    }
}

impl SurveyType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Issuance => "issuance",
            Self::Claim => "claim",
            Self::Generic(other) => other,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Issuance => "Issuance",
            Self::Claim => "Claim",
            Self::Generic(other) if other.is_empty() => "Survey",
            Self::Generic(other) => other,
        }
    }
}

/// The entity a survey inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyLink {
    Lead(i64),
    Claim(i64),
    Unlinked,
}

/// State value the backend sets once an assessment has been submitted
pub const COMPLETED_STATE: &str = "completed";

/// A field inspection task
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Survey {
    pub id: i64,
    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,
    #[serde(default)]
    pub survey_type: SurveyType,
    #[serde(default, deserialize_with = "many2one")]
    pub lead_id: Option<i64>,
    #[serde(default, deserialize_with = "many2one")]
    pub claim_id: Option<i64>,
    #[serde(default, deserialize_with = "many2one")]
    pub estimation_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub partner_name: Option<String>,
}

impl Survey {
    /// Resolve which related entity this survey points at.
    ///
    /// When the backend populates both references the survey type decides.
    pub fn link(&self) -> SurveyLink {
        match (self.lead_id, self.claim_id) {
            (Some(_), Some(claim)) if self.survey_type == SurveyType::Claim => {
                SurveyLink::Claim(claim)
            }
            (Some(lead), _) => SurveyLink::Lead(lead),
            (None, Some(claim)) => SurveyLink::Claim(claim),
            (None, None) => SurveyLink::Unlinked,
        }
    }

    pub fn state_label(&self) -> &str {
        self.state.as_deref().unwrap_or("draft")
    }

    pub fn is_completed(&self) -> bool {
        self.state.as_deref() == Some(COMPLETED_STATE)
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Survey #{}", self.id))
    }
}

/// Sales opportunity behind an issuance survey
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Opportunity {
    pub id: i64,
    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub partner_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub vehicle_make: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub vehicle_model: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub plate_number: Option<String>,
}

/// Claim behind a claim survey
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Claim {
    pub id: i64,
    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub partner_name: Option<String>,
    #[serde(default, deserialize_with = "estimation_refs")]
    pub claim_estimations: Vec<EstimationRef>,
}

impl Claim {
    /// The estimation attached to this claim, if any
    pub fn estimation_id(&self) -> Option<i64> {
        self.claim_estimations.first().map(|e| e.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EstimationRef {
    pub id: i64,
}

/// Accepts `[{"id": 42}]`, `[42]` or `false`
fn estimation_refs<'de, D>(deserializer: D) -> Result<Vec<EstimationRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(|item| match item {
            Value::Number(n) => n.as_i64(),
            other => other.get("id").and_then(Value::as_i64),
        })
        .map(|id| EstimationRef { id })
        .collect())
}

/// Related entity loaded alongside a survey
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RelatedRecord {
    Opportunity(Opportunity),
    Claim(Claim),
    #[default]
    None,
}

impl RelatedRecord {
    pub fn claim(&self) -> Option<&Claim> {
        match self {
            RelatedRecord::Claim(claim) => Some(claim),
            _ => None,
        }
    }
}

/// Everything the wizard needs about one survey
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyBundle {
    pub survey: Survey,
    pub related: RelatedRecord,
    pub estimation: Option<EstimationDetails>,
    pub item_types: Vec<ItemType>,
    pub exclusion_categories: Vec<ExclusionCategory>,
}

impl SurveyBundle {
    /// Estimation the survey works on: the claim's, else the survey's own
    pub fn estimation_id(&self) -> Option<i64> {
        if self.survey.survey_type != SurveyType::Claim {
            return None;
        }
        self.related
            .claim()
            .and_then(Claim::estimation_id)
            .or(self.survey.estimation_id)
    }
}

/// Damage estimation attached to a claim
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EstimationDetails {
    pub id: i64,
    #[serde(default, alias = "estimation_lines", alias = "line_ids")]
    pub lines: Vec<EstimationLineRecord>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount_total: f64,
}

/// An estimation line as stored on the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EstimationLineRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "many2one")]
    pub item_type_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub unit_amount: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub depreciation: f64,
}

/// Estimation item type (reference data)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemType {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub code: Option<String>,
}

/// Exclusion category with its selectable sub-types (reference data)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExclusionCategory {
    pub name: String,
    #[serde(default)]
    pub types: Vec<ExclusionType>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExclusionType {
    pub code: String,
    pub label: String,
}
