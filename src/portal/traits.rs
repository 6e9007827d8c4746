//! Trait abstraction for the portal backend to enable mocking in tests

use super::error::PortalResult;
use super::payload::{DocumentsPayload, EstimationLinesPayload, SurveyUpdatePayload};
use crate::state::{
    Claim, EstimationDetails, ExclusionCategory, ItemType, Opportunity, Survey,
};
use async_trait::async_trait;

/// Portal operations used by the surveyor front-end
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// Surveys assigned to the signed-in surveyor
    async fn list_assigned_surveys(&self) -> PortalResult<Vec<Survey>>;

    /// Load one survey
    async fn get_survey_details(&self, survey_id: i64) -> PortalResult<Survey>;

    /// Load the opportunity behind an issuance survey
    async fn get_opportunity(&self, lead_id: i64) -> PortalResult<Opportunity>;

    /// Load the claim behind a claim survey
    async fn get_claim(&self, claim_id: i64) -> PortalResult<Claim>;

    /// Load an estimation with its lines
    async fn get_estimation_details(&self, estimation_id: i64) -> PortalResult<EstimationDetails>;

    /// Reference data for estimation lines
    async fn get_estimation_item_types(&self) -> PortalResult<Vec<ItemType>>;

    /// Reference data for the exclusions step
    async fn get_exclusion_categories(&self) -> PortalResult<Vec<ExclusionCategory>>;

    /// Submit the assessment
    async fn submit_survey(&self, payload: SurveyUpdatePayload) -> PortalResult<()>;

    /// Create estimation lines added during the session
    async fn create_survey_estimation_lines(
        &self,
        payload: EstimationLinesPayload,
    ) -> PortalResult<()>;

    /// Update estimation lines that already exist on the server
    async fn update_survey_estimation_lines(
        &self,
        payload: EstimationLinesPayload,
    ) -> PortalResult<()>;

    /// Upload survey photos
    async fn update_survey_documents(&self, payload: DocumentsPayload) -> PortalResult<()>;
}
