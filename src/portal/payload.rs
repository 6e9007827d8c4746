//! Request bodies sent to the portal

use crate::state::{EstimationLine, ExclusionEntry, SurveyType, WizardDraft};
use serde::Serialize;

/// Canonical survey update built from the wizard draft
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyUpdatePayload {
    pub survey_id: i64,
    pub survey_type: String,
    #[serde(rename = "survey_conclusion")]
    pub conclusion: String,
    #[serde(rename = "survey_recommendation")]
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_condition: Option<String>,
    #[serde(rename = "vehicle_market_value")]
    pub market_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_description: Option<String>,
    #[serde(rename = "repair_cost_estimate")]
    pub estimated_repair_cost: f64,
    pub exclusions: Vec<ExclusionEntry>,
    pub documents_received: Vec<String>,
}

/// Parse a numeric input; empty or malformed text becomes 0
pub fn coerce_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.replace(',', "").parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            tracing::warn!(value = %trimmed, "Non-numeric amount coerced to 0");
            0.0
        }
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl SurveyUpdatePayload {
    pub fn from_draft(survey_id: i64, survey_type: &SurveyType, draft: &WizardDraft) -> Self {
        let (vehicle_condition, damage_description) = match survey_type {
            SurveyType::Issuance => (non_empty(&draft.vehicle_condition), None),
            SurveyType::Claim => (None, non_empty(&draft.damage_description)),
            SurveyType::Generic(_) => (None, None),
        };

        Self {
            survey_id,
            survey_type: survey_type.as_str().to_string(),
            conclusion: draft.conclusion.trim().to_string(),
            recommendation: draft.recommendation.trim().to_string(),
            vehicle_condition,
            market_value: coerce_amount(&draft.market_value),
            damage_description,
            estimated_repair_cost: coerce_amount(&draft.estimated_repair_cost),
            exclusions: draft.exclusions.emit(),
            documents_received: draft
                .document_slots
                .iter()
                .filter(|slot| slot.received)
                .map(|slot| slot.name.clone())
                .collect(),
        }
    }
}

/// One estimation line on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimationLinePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub item_type_id: Option<i64>,
    pub description: String,
    pub unit_amount: f64,
    pub quantity: f64,
    pub depreciation: f64,
    pub amount: f64,
}

impl From<&EstimationLine> for EstimationLinePayload {
    fn from(line: &EstimationLine) -> Self {
        Self {
            id: line.server_id(),
            item_type_id: line.item_type_id,
            description: line.description.clone(),
            unit_amount: line.unit_amount,
            quantity: line.quantity,
            depreciation: line.depreciation,
            amount: line.amount,
        }
    }
}

/// Lines to create or update on a survey's estimation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimationLinesPayload {
    pub survey_id: i64,
    pub estimation_id: Option<i64>,
    pub lines: Vec<EstimationLinePayload>,
}

impl EstimationLinesPayload {
    pub fn new(survey_id: i64, estimation_id: Option<i64>, lines: &[EstimationLine]) -> Self {
        Self {
            survey_id,
            estimation_id,
            lines: lines.iter().map(EstimationLinePayload::from).collect(),
        }
    }
}

/// A photo encoded for transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedPhoto {
    pub name: String,
    /// Base64 (standard alphabet, padded)
    pub data: String,
}

/// Photos attached to a survey, uploaded in one call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentsPayload {
    pub survey_id: i64,
    pub photos: Vec<EncodedPhoto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DraftField, DraftUpdate, LineId};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount(""), 0.0);
        assert_eq!(coerce_amount("   "), 0.0);
        assert_eq!(coerce_amount("12000"), 12000.0);
        assert_eq!(coerce_amount(" 1,250.50 "), 1250.5);
        assert_eq!(coerce_amount("n/a"), 0.0);
        assert_eq!(coerce_amount("NaN"), 0.0);
        assert_eq!(coerce_amount("inf"), 0.0);
        assert_eq!(coerce_amount("-infinity"), 0.0);
    }

    #[test]
    fn test_issuance_payload_renames_fields() {
        let draft = WizardDraft::for_survey(&SurveyType::Issuance)
            .apply(DraftUpdate::SetText(DraftField::Conclusion, " Insurable ".to_string()))
            .apply(DraftUpdate::SetText(DraftField::VehicleCondition, "Good".to_string()))
            .apply(DraftUpdate::SetText(DraftField::MarketValue, "15000".to_string()))
            .apply(DraftUpdate::ToggleExclusionCategory("Body".to_string()))
            .apply(DraftUpdate::ToggleExclusionType {
                category: "Glass".to_string(),
                code: "crack".to_string(),
            })
            .apply(DraftUpdate::ToggleDocumentSlot(1));

        let payload = SurveyUpdatePayload::from_draft(7, &SurveyType::Issuance, &draft);

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "survey_id": 7,
                "survey_type": "issuance",
                "survey_conclusion": "Insurable",
                "survey_recommendation": "",
                "vehicle_condition": "Good",
                "vehicle_market_value": 15000.0,
                "repair_cost_estimate": 0.0,
                "exclusions": [{"category": "Glass", "type_codes": ["crack"]}],
                "documents_received": ["Driving license"],
            })
        );
    }

    #[test]
    fn test_claim_payload_defaults_numeric_to_zero() {
        let draft = WizardDraft::for_survey(&SurveyType::Claim).apply(DraftUpdate::SetText(
            DraftField::DamageDescription,
            "Rear impact".to_string(),
        ));

        let payload = SurveyUpdatePayload::from_draft(9, &SurveyType::Claim, &draft);
        assert_eq!(payload.estimated_repair_cost, 0.0);
        assert_eq!(payload.market_value, 0.0);
        assert_eq!(payload.damage_description.as_deref(), Some("Rear impact"));
        assert!(payload.vehicle_condition.is_none());
    }

    #[test]
    fn test_line_payload_carries_server_id_only() {
        let existing = EstimationLine {
            id: LineId::Server(5),
            item_type_id: Some(3),
            description: "Bumper".to_string(),
            unit_amount: 200.0,
            quantity: 1.0,
            depreciation: 0.0,
            amount: 200.0,
        };
        let new = EstimationLine {
            id: LineId::Local(uuid::Uuid::new_v4()),
            ..existing.clone()
        };

        let payload = EstimationLinesPayload::new(9, Some(42), &[existing, new]);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["lines"][0]["id"], json!(5));
        assert!(value["lines"][1].get("id").is_none());
        assert_eq!(value["estimation_id"], json!(42));
    }
}
