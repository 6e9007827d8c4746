//! Loads a survey together with its related records

use crate::portal::{PortalApi, PortalResult};
use crate::state::{
    EstimationDetails, ExclusionCategory, ItemType, RelatedRecord, SurveyBundle, SurveyLink,
    SurveyType,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Banner prefix for a failed estimation fetch
pub const ESTIMATION_LOAD_ERROR: &str = "Could not load estimation";

/// Result of a survey load.
///
/// Only a failed survey fetch is fatal. Failures further down the chain are
/// collected in `errors` and the bundle carries whatever did load.
#[derive(Debug)]
pub struct LoadOutcome {
    pub bundle: SurveyBundle,
    pub errors: Vec<String>,
}

/// Fetches survey data for one wizard session
pub struct SurveyFetcher {
    client: Arc<dyn PortalApi>,
    /// One slot per estimation id; concurrent callers share a single request
    estimations: Mutex<HashMap<i64, Arc<OnceCell<EstimationDetails>>>>,
}

impl SurveyFetcher {
    pub fn new(client: Arc<dyn PortalApi>) -> Self {
        Self {
            client,
            estimations: Mutex::new(HashMap::new()),
        }
    }

    /// Survey, then its related entity, then (for claims) the estimation
    pub async fn load(&self, survey_id: i64) -> PortalResult<LoadOutcome> {
        tracing::info!(survey_id, "Loading survey");
        let survey = self.client.get_survey_details(survey_id).await?;
        let mut errors = Vec::new();

        let related = match survey.link() {
            SurveyLink::Lead(lead_id) => match self.client.get_opportunity(lead_id).await {
                Ok(opportunity) => RelatedRecord::Opportunity(opportunity),
                Err(e) => {
                    tracing::warn!(lead_id, error = %e, "Opportunity load failed");
                    errors.push(format!("Could not load opportunity: {e}"));
                    RelatedRecord::None
                }
            },
            SurveyLink::Claim(claim_id) => match self.client.get_claim(claim_id).await {
                Ok(claim) => RelatedRecord::Claim(claim),
                Err(e) => {
                    tracing::warn!(claim_id, error = %e, "Claim load failed");
                    errors.push(format!("Could not load claim: {e}"));
                    RelatedRecord::None
                }
            },
            SurveyLink::Unlinked => RelatedRecord::None,
        };

        let mut bundle = SurveyBundle {
            survey,
            related,
            estimation: None,
            item_types: Vec::new(),
            exclusion_categories: Vec::new(),
        };

        let estimation = async {
            match bundle.estimation_id() {
                Some(id) => Some(self.ensure_estimation(id).await),
                None => None,
            }
        };
        let (estimation, reference) =
            tokio::join!(estimation, self.reference_data(&bundle.survey.survey_type));

        match estimation {
            Some(Ok(details)) => bundle.estimation = Some(details),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Estimation load failed");
                errors.push(format!("{ESTIMATION_LOAD_ERROR}: {e}"));
            }
            None => {}
        }

        match reference {
            Ok(ReferenceData::ItemTypes(items)) => bundle.item_types = items,
            Ok(ReferenceData::ExclusionCategories(categories)) => {
                bundle.exclusion_categories = categories
            }
            Ok(ReferenceData::None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Reference data load failed");
                errors.push(format!("Could not load reference data: {e}"));
            }
        }

        Ok(LoadOutcome { bundle, errors })
    }

    /// Fetch an estimation at most once per session.
    ///
    /// Callers racing on the same id wait for the first request. A failed
    /// request leaves the slot empty so the next call tries again.
    pub async fn ensure_estimation(&self, estimation_id: i64) -> PortalResult<EstimationDetails> {
        let slot = {
            let mut estimations = self.estimations.lock().await;
            estimations.entry(estimation_id).or_default().clone()
        };

        let details = slot
            .get_or_try_init(|| async {
                tracing::info!(estimation_id, "Fetching estimation");
                self.client.get_estimation_details(estimation_id).await
            })
            .await?;
        Ok(details.clone())
    }

    async fn reference_data(&self, survey_type: &SurveyType) -> PortalResult<ReferenceData> {
        Ok(match survey_type {
            SurveyType::Claim => {
                ReferenceData::ItemTypes(self.client.get_estimation_item_types().await?)
            }
            SurveyType::Issuance => {
                ReferenceData::ExclusionCategories(self.client.get_exclusion_categories().await?)
            }
            SurveyType::Generic(_) => ReferenceData::None,
        })
    }
}

enum ReferenceData {
    ItemTypes(Vec<ItemType>),
    ExclusionCategories(Vec<ExclusionCategory>),
    None,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::{MockPortalApi, PortalError};
    use crate::state::{Claim, Opportunity, Survey};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn survey(value: serde_json::Value) -> Survey {
        serde_json::from_value(value).unwrap()
    }

    fn claim_with_estimation(id: i64, estimation_id: i64) -> Claim {
        serde_json::from_value(json!({"id": id, "claim_estimations": [estimation_id]})).unwrap()
    }

    fn estimation(id: i64) -> EstimationDetails {
        serde_json::from_value(json!({
            "id": id,
            "lines": [{"id": 1, "description": "Door", "unit_amount": 100, "quantity": 1}],
        }))
        .unwrap()
    }

    fn claim_survey_mock() -> MockPortalApi {
        let mut mock = MockPortalApi::new();
        mock.expect_get_survey_details()
            .returning(|_| Ok(survey(json!({"id": 5, "survey_type": "claim", "claim_id": 9}))));
        mock.expect_get_claim()
            .returning(|id| Ok(claim_with_estimation(id, 42)));
        mock.expect_get_estimation_item_types()
            .returning(|| Ok(vec![]));
        mock
    }

    #[tokio::test]
    async fn test_load_claim_survey_chain() {
        let mut mock = claim_survey_mock();
        mock.expect_get_estimation_details()
            .withf(|id| *id == 42)
            .times(1)
            .returning(|id| Ok(estimation(id)));

        let fetcher = SurveyFetcher::new(Arc::new(mock));
        let outcome = fetcher.load(5).await.unwrap();

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.bundle.related.claim().map(|c| c.id), Some(9));
        assert_eq!(outcome.bundle.estimation.map(|e| e.id), Some(42));
    }

    #[tokio::test]
    async fn test_load_issuance_survey_fetches_opportunity_and_exclusions() {
        let mut mock = MockPortalApi::new();
        mock.expect_get_survey_details()
            .returning(|_| Ok(survey(json!({"id": 3, "survey_type": "issuance", "lead_id": 7}))));
        mock.expect_get_opportunity().times(1).returning(|id| {
            Ok(serde_json::from_value::<Opportunity>(json!({"id": id, "plate_number": "AB-123"}))
                .unwrap())
        });
        mock.expect_get_exclusion_categories().times(1).returning(|| {
            Ok(serde_json::from_value(json!([
                {"name": "Body", "types": [{"code": "scratch", "label": "Scratch"}]}
            ]))
            .unwrap())
        });
        mock.expect_get_claim().never();
        mock.expect_get_estimation_details().never();

        let fetcher = SurveyFetcher::new(Arc::new(mock));
        let outcome = fetcher.load(3).await.unwrap();

        assert!(matches!(
            outcome.bundle.related,
            RelatedRecord::Opportunity(ref o) if o.id == 7
        ));
        assert_eq!(outcome.bundle.exclusion_categories.len(), 1);
        assert!(outcome.bundle.estimation.is_none());
    }

    #[tokio::test]
    async fn test_load_survey_failure_is_fatal() {
        let mut mock = MockPortalApi::new();
        mock.expect_get_survey_details()
            .returning(|_| Err(PortalError::api(404, "Survey not found")));

        let fetcher = SurveyFetcher::new(Arc::new(mock));
        let err = fetcher.load(99).await.unwrap_err();
        assert_eq!(err.to_string(), "API request failed: 404 - Survey not found");
    }

    #[tokio::test]
    async fn test_load_related_failure_is_not_fatal() {
        let mut mock = MockPortalApi::new();
        mock.expect_get_survey_details()
            .returning(|_| Ok(survey(json!({"id": 5, "survey_type": "claim", "claim_id": 9}))));
        mock.expect_get_claim()
            .returning(|_| Err(PortalError::api(500, "boom")));
        mock.expect_get_estimation_item_types()
            .returning(|| Ok(vec![]));
        mock.expect_get_estimation_details().never();

        let fetcher = SurveyFetcher::new(Arc::new(mock));
        let outcome = fetcher.load(5).await.unwrap();

        assert_eq!(outcome.bundle.survey.id, 5);
        assert_eq!(outcome.bundle.related, RelatedRecord::None);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Could not load claim"));
    }

    #[tokio::test]
    async fn test_unlinked_generic_survey_makes_no_extra_calls() {
        let mut mock = MockPortalApi::new();
        mock.expect_get_survey_details()
            .returning(|_| Ok(survey(json!({"id": 1, "survey_type": "fleet"}))));

        let fetcher = SurveyFetcher::new(Arc::new(mock));
        let outcome = fetcher.load(1).await.unwrap();

        assert_eq!(outcome.bundle.related, RelatedRecord::None);
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn test_estimation_fetched_once_across_paths() {
        let mut mock = claim_survey_mock();
        mock.expect_get_estimation_details()
            .withf(|id| *id == 42)
            .times(1)
            .returning(|id| Ok(estimation(id)));

        let fetcher = SurveyFetcher::new(Arc::new(mock));
        let (outcome, direct) = tokio::join!(fetcher.load(5), fetcher.ensure_estimation(42));

        assert_eq!(outcome.unwrap().bundle.estimation, Some(estimation(42)));
        assert_eq!(direct.unwrap(), estimation(42));

        // Later requests are served from the session cache
        assert_eq!(fetcher.ensure_estimation(42).await.unwrap().id, 42);
    }

    #[tokio::test]
    async fn test_failed_estimation_fetch_can_be_retried() {
        let mut mock = MockPortalApi::new();
        let mut calls = 0;
        mock.expect_get_estimation_details()
            .times(2)
            .returning(move |id| {
                calls += 1;
                if calls == 1 {
                    Err(PortalError::api(503, "unavailable"))
                } else {
                    Ok(estimation(id))
                }
            });

        let fetcher = SurveyFetcher::new(Arc::new(mock));
        tokio_test::assert_err!(fetcher.ensure_estimation(42).await);
        let details = tokio_test::assert_ok!(fetcher.ensure_estimation(42).await);
        assert_eq!(details.id, 42);
    }
}
