//! Async orchestration on top of the portal client

mod fetcher;
mod photos;
mod submit;

pub use fetcher::{LoadOutcome, SurveyFetcher, ESTIMATION_LOAD_ERROR};
pub use submit::{SubmissionOrchestrator, SubmitError, SubmitPhase, SubmitReceipt};
