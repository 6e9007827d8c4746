//! Submission of a completed wizard to the portal
//!
//! The survey update goes first. Only once it is accepted are estimation
//! lines saved (create and update in parallel) and photos uploaded. Earlier
//! side effects are not rolled back when a later stage fails; a retry resends
//! the whole sequence.

use super::photos::{encode_photos, PhotoError};
use crate::portal::{
    DocumentsPayload, EstimationLinesPayload, PortalApi, PortalError, SurveyUpdatePayload,
};
use crate::state::{EstimationAggregator, LinePartition, Survey, Wizard};
use std::sync::Arc;
use thiserror::Error;

/// Where a submission stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    /// Last attempt failed; a manual retry is allowed
    Failed(String),
}

impl SubmitPhase {
    pub fn label(&self) -> &str {
        match self {
            SubmitPhase::Idle => "Ready to submit",
            SubmitPhase::Submitting => "Submitting...",
            SubmitPhase::Succeeded => "Submitted",
            SubmitPhase::Failed(_) => "Submission failed",
        }
    }
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Submission is only possible from the final step")]
    NotOnFinalStep,

    #[error("This survey has already been submitted")]
    AlreadySubmitted,

    #[error("Survey update failed: {0}")]
    Survey(#[source] PortalError),

    #[error("Estimation lines could not be saved: {0}")]
    EstimationLines(#[source] PortalError),

    #[error(transparent)]
    Photos(#[from] PhotoError),

    #[error("Photo upload failed: {0}")]
    Documents(#[source] PortalError),
}

/// What a successful submission sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmitReceipt {
    pub lines_created: usize,
    pub lines_updated: usize,
    pub photos_uploaded: usize,
}

/// Drives one survey's submission and remembers its outcome
pub struct SubmissionOrchestrator {
    client: Arc<dyn PortalApi>,
    phase: SubmitPhase,
}

impl SubmissionOrchestrator {
    pub fn new(client: Arc<dyn PortalApi>) -> Self {
        Self {
            client,
            phase: SubmitPhase::Idle,
        }
    }

    pub fn phase(&self) -> &SubmitPhase {
        &self.phase
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.phase, SubmitPhase::Idle | SubmitPhase::Failed(_))
    }

    /// Run the full submission sequence.
    ///
    /// Precondition failures leave the phase untouched.
    pub async fn submit(
        &mut self,
        survey: &Survey,
        wizard: &Wizard,
        lines: &EstimationAggregator,
    ) -> Result<SubmitReceipt, SubmitError> {
        if !wizard.is_final_step() {
            return Err(SubmitError::NotOnFinalStep);
        }
        if survey.is_completed() || !self.can_submit() {
            return Err(SubmitError::AlreadySubmitted);
        }

        self.phase = SubmitPhase::Submitting;
        tracing::info!(
            survey_id = survey.id,
            draft_revision = wizard.revision(),
            "Submitting survey"
        );

        let result = self.run(survey, wizard, lines).await;
        self.phase = match &result {
            Ok(receipt) => {
                tracing::info!(
                    survey_id = survey.id,
                    created = receipt.lines_created,
                    updated = receipt.lines_updated,
                    photos = receipt.photos_uploaded,
                    "Survey submitted"
                );
                SubmitPhase::Succeeded
            }
            Err(e) => {
                tracing::error!(survey_id = survey.id, error = %e, "Submission failed");
                SubmitPhase::Failed(e.to_string())
            }
        };
        result
    }

    async fn run(
        &self,
        survey: &Survey,
        wizard: &Wizard,
        lines: &EstimationAggregator,
    ) -> Result<SubmitReceipt, SubmitError> {
        let payload = SurveyUpdatePayload::from_draft(survey.id, wizard.survey_type(), wizard.draft());
        self.client
            .submit_survey(payload)
            .await
            .map_err(SubmitError::Survey)?;

        let mut receipt = SubmitReceipt::default();

        let partition = lines.partition();
        if !partition.is_empty() {
            let (created, updated) = self
                .save_lines(survey.id, lines.estimation_id(), partition)
                .await
                .map_err(SubmitError::EstimationLines)?;
            receipt.lines_created = created;
            receipt.lines_updated = updated;
        }

        let photos = &wizard.draft().photos;
        if !photos.is_empty() {
            let encoded = encode_photos(photos).await?;
            receipt.photos_uploaded = encoded.len();
            self.client
                .update_survey_documents(DocumentsPayload {
                    survey_id: survey.id,
                    photos: encoded,
                })
                .await
                .map_err(SubmitError::Documents)?;
        }

        Ok(receipt)
    }

    /// Create and update calls run concurrently; either failing fails both
    async fn save_lines(
        &self,
        survey_id: i64,
        estimation_id: Option<i64>,
        partition: LinePartition,
    ) -> Result<(usize, usize), PortalError> {
        let create = async {
            if partition.new_items.is_empty() {
                return Ok(0);
            }
            tracing::debug!(lines = partition.new_items.len(), "Creating estimation lines");
            let payload = EstimationLinesPayload::new(survey_id, estimation_id, &partition.new_items);
            self.client
                .create_survey_estimation_lines(payload)
                .await
                .map(|()| partition.new_items.len())
        };
        let update = async {
            if partition.existing_items.is_empty() {
                return Ok(0);
            }
            tracing::debug!(lines = partition.existing_items.len(), "Updating estimation lines");
            let payload =
                EstimationLinesPayload::new(survey_id, estimation_id, &partition.existing_items);
            self.client
                .update_survey_estimation_lines(payload)
                .await
                .map(|()| partition.existing_items.len())
        };
        futures::try_join!(create, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::MockPortalApi;
    use crate::state::{
        DraftField, DraftUpdate, EstimationDetails, LineDraft, PhotoAttachment, SurveyType,
    };
    use mockall::Sequence;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn survey(survey_type: &str) -> Survey {
        serde_json::from_value(json!({"id": 5, "survey_type": survey_type, "state": "surveyor"}))
            .unwrap()
    }

    fn final_wizard(survey_type: SurveyType) -> Wizard {
        let mut wizard = Wizard::new(survey_type);
        let last = wizard.total_steps();
        wizard.jump_to(last);
        wizard
    }

    fn lines_with_existing_and_new() -> EstimationAggregator {
        let details: EstimationDetails = serde_json::from_value(json!({
            "id": 42,
            "lines": [{"id": 1, "description": "Door", "unit_amount": 100, "quantity": 2}],
        }))
        .unwrap();
        let mut lines = EstimationAggregator::from_details(&details);
        lines.add_item(LineDraft {
            item_type_id: Some(3),
            description: "Bumper".to_string(),
            unit_amount: 50.0,
            quantity: 1.0,
            depreciation: 0.0,
        });
        lines
    }

    #[tokio::test]
    async fn test_refuses_before_final_step() {
        let mut mock = MockPortalApi::new();
        mock.expect_submit_survey().never();

        let mut orchestrator = SubmissionOrchestrator::new(Arc::new(mock));
        let wizard = Wizard::new(SurveyType::Claim);
        let err = orchestrator
            .submit(&survey("claim"), &wizard, &EstimationAggregator::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::NotOnFinalStep));
        assert_eq!(orchestrator.phase(), &SubmitPhase::Idle);
    }

    #[tokio::test]
    async fn test_refuses_completed_survey() {
        let mut mock = MockPortalApi::new();
        mock.expect_submit_survey().never();

        let mut completed = survey("claim");
        completed.state = Some("completed".to_string());

        let mut orchestrator = SubmissionOrchestrator::new(Arc::new(mock));
        let err = orchestrator
            .submit(&completed, &final_wizard(SurveyType::Claim), &EstimationAggregator::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::AlreadySubmitted));
    }

    #[tokio::test]
    async fn test_generic_survey_sends_only_the_update() {
        let mut mock = MockPortalApi::new();
        mock.expect_submit_survey()
            .withf(|payload| {
                payload.survey_type == "fleet"
                    && payload.conclusion == "Fine"
                    && payload.market_value == 0.0
            })
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_create_survey_estimation_lines().never();
        mock.expect_update_survey_estimation_lines().never();
        mock.expect_update_survey_documents().never();

        let mut wizard = final_wizard(SurveyType::from("fleet".to_string()));
        wizard.update(DraftUpdate::SetText(DraftField::Conclusion, "Fine".to_string()));

        let mut orchestrator = SubmissionOrchestrator::new(Arc::new(mock));
        let receipt = orchestrator
            .submit(&survey("fleet"), &wizard, &EstimationAggregator::new())
            .await
            .unwrap();

        assert_eq!(receipt, SubmitReceipt::default());
        assert_eq!(orchestrator.phase(), &SubmitPhase::Succeeded);
        assert!(!orchestrator.can_submit());
    }

    #[tokio::test]
    async fn test_survey_update_runs_before_lines() {
        let mut mock = MockPortalApi::new();
        let mut seq = Sequence::new();
        mock.expect_submit_survey()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_create_survey_estimation_lines()
            .withf(|payload| {
                payload.estimation_id == Some(42)
                    && payload.lines.len() == 1
                    && payload.lines[0].id.is_none()
                    && payload.lines[0].amount == 50.0
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_update_survey_estimation_lines()
            .withf(|payload| payload.lines.len() == 1 && payload.lines[0].id == Some(1))
            .times(1)
            .returning(|_| Ok(()));

        let mut orchestrator = SubmissionOrchestrator::new(Arc::new(mock));
        let receipt = orchestrator
            .submit(
                &survey("claim"),
                &final_wizard(SurveyType::Claim),
                &lines_with_existing_and_new(),
            )
            .await
            .unwrap();

        assert_eq!(receipt.lines_created, 1);
        assert_eq!(receipt.lines_updated, 1);
    }

    #[tokio::test]
    async fn test_survey_failure_aborts_everything() {
        let mut mock = MockPortalApi::new();
        mock.expect_submit_survey()
            .times(1)
            .returning(|_| Err(PortalError::rejected("Survey locked")));
        mock.expect_create_survey_estimation_lines().never();
        mock.expect_update_survey_estimation_lines().never();

        let mut orchestrator = SubmissionOrchestrator::new(Arc::new(mock));
        let err = orchestrator
            .submit(
                &survey("claim"),
                &final_wizard(SurveyType::Claim),
                &lines_with_existing_and_new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Survey(_)));
        assert_eq!(
            orchestrator.phase(),
            &SubmitPhase::Failed(
                "Survey update failed: Portal rejected the request: Survey locked".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_line_update_rejection_fails_submission_and_allows_retry() {
        let mut mock = MockPortalApi::new();
        mock.expect_submit_survey().times(2).returning(|_| Ok(()));
        mock.expect_create_survey_estimation_lines()
            .returning(|_| Ok(()));
        let mut attempts = 0;
        mock.expect_update_survey_estimation_lines()
            .times(2)
            .returning(move |_| {
                attempts += 1;
                if attempts == 1 {
                    Err(PortalError::api(422, "Line 1 is locked"))
                } else {
                    Ok(())
                }
            });

        let survey = survey("claim");
        let wizard = final_wizard(SurveyType::Claim);
        let lines = lines_with_existing_and_new();

        let mut orchestrator = SubmissionOrchestrator::new(Arc::new(mock));
        let err = orchestrator.submit(&survey, &wizard, &lines).await.unwrap_err();
        assert!(matches!(err, SubmitError::EstimationLines(_)));
        assert!(orchestrator.can_submit());

        orchestrator.submit(&survey, &wizard, &lines).await.unwrap();
        assert_eq!(orchestrator.phase(), &SubmitPhase::Succeeded);
    }

    #[tokio::test]
    async fn test_photos_uploaded_in_one_call() {
        let dir = TempDir::new().unwrap();
        let front = dir.path().join("front.jpg");
        let rear = dir.path().join("rear.jpg");
        fs::write(&front, b"front").unwrap();
        fs::write(&rear, b"rear").unwrap();

        let mut mock = MockPortalApi::new();
        mock.expect_submit_survey().returning(|_| Ok(()));
        mock.expect_update_survey_documents()
            .withf(|payload| {
                payload.survey_id == 5
                    && payload.photos.len() == 2
                    && payload.photos[0].name == "front.jpg"
                    && payload.photos[1].data == "cmVhcg=="
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut wizard = final_wizard(SurveyType::Issuance);
        wizard.update(DraftUpdate::AttachPhoto(PhotoAttachment::from_path(&front)));
        wizard.update(DraftUpdate::AttachPhoto(PhotoAttachment::from_path(&rear)));

        let mut orchestrator = SubmissionOrchestrator::new(Arc::new(mock));
        let receipt = orchestrator
            .submit(&survey("issuance"), &wizard, &EstimationAggregator::new())
            .await
            .unwrap();
        assert_eq!(receipt.photos_uploaded, 2);
    }

    #[tokio::test]
    async fn test_unreadable_photo_skips_upload() {
        let dir = TempDir::new().unwrap();

        let mut mock = MockPortalApi::new();
        mock.expect_submit_survey().returning(|_| Ok(()));
        mock.expect_update_survey_documents().never();

        let mut wizard = final_wizard(SurveyType::Issuance);
        wizard.update(DraftUpdate::AttachPhoto(PhotoAttachment::from_path(
            dir.path().join("missing.jpg"),
        )));

        let mut orchestrator = SubmissionOrchestrator::new(Arc::new(mock));
        let err = orchestrator
            .submit(&survey("issuance"), &wizard, &EstimationAggregator::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Photos(_)));
    }
}
