//! HTTP client for the insurance portal REST API
//!
//! Every response body passes through the envelope normalizer before being
//! decoded into a record, so call sites never deal with nesting depth.

use super::envelope::{embedded_error, unwrap_envelope};
use super::error::{PortalError, PortalResult};
use super::payload::{DocumentsPayload, EstimationLinesPayload, SurveyUpdatePayload};
use super::traits::PortalApi;
use crate::config::PortalSettings;
use crate::state::{
    Claim, EstimationDetails, ExclusionCategory, ItemType, Opportunity, Survey,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Header carrying the tenant identifier
const TENANT_HEADER: &str = "x-tenant-id";

/// Client for the portal backend
#[derive(Clone)]
pub struct PortalClient {
    /// The HTTP client
    client: Client,
    /// Base URL without trailing slash
    base_url: String,
}

impl PortalClient {
    /// Create a new client from resolved settings
    pub fn new(settings: &PortalSettings) -> PortalResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &settings.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| PortalError::config("API token contains invalid characters"))?;
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(tenant) = &settings.tenant {
            let value = HeaderValue::from_str(tenant)
                .map_err(|_| PortalError::config("Tenant contains invalid characters"))?;
            headers.insert(TENANT_HEADER, value);
        }

        let client = Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| PortalError::config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_record<T: DeserializeOwned>(&self, path: &str) -> PortalResult<T> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = decode_body(status, &text)?;
        Ok(serde_json::from_value(body)?)
    }

    async fn send<B: Serialize>(&self, method: Method, path: &str, payload: &B) -> PortalResult<()> {
        let url = self.url(path);
        tracing::debug!(%url, %method, "Sending");
        let response = self.client.request(method, &url).json(payload).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        decode_body(status, &text)?;
        Ok(())
    }
}

/// Check the status, detect embedded failures and strip the envelope
fn decode_body(status: u16, text: &str) -> PortalResult<Value> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|body| embedded_error(&body))
            .unwrap_or_else(|| text.trim().to_string());
        return Err(PortalError::api(status, message));
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    let body: Value = serde_json::from_str(text)?;
    if let Some(message) = embedded_error(&body) {
        return Err(PortalError::rejected(message));
    }
    Ok(unwrap_envelope(body))
}

#[async_trait]
impl PortalApi for PortalClient {
    async fn list_assigned_surveys(&self) -> PortalResult<Vec<Survey>> {
        self.get_record("/api/surveyor/surveys").await
    }

    async fn get_survey_details(&self, survey_id: i64) -> PortalResult<Survey> {
        self.get_record(&format!("/api/surveys/{survey_id}")).await
    }

    async fn get_opportunity(&self, lead_id: i64) -> PortalResult<Opportunity> {
        self.get_record(&format!("/api/opportunities/{lead_id}")).await
    }

    async fn get_claim(&self, claim_id: i64) -> PortalResult<Claim> {
        self.get_record(&format!("/api/claims/{claim_id}")).await
    }

    async fn get_estimation_details(&self, estimation_id: i64) -> PortalResult<EstimationDetails> {
        self.get_record(&format!("/api/estimations/{estimation_id}"))
            .await
    }

    async fn get_estimation_item_types(&self) -> PortalResult<Vec<ItemType>> {
        self.get_record("/api/estimation-item-types").await
    }

    async fn get_exclusion_categories(&self) -> PortalResult<Vec<ExclusionCategory>> {
        self.get_record("/api/survey-exclusions").await
    }

    async fn submit_survey(&self, payload: SurveyUpdatePayload) -> PortalResult<()> {
        let path = format!("/api/surveys/{}/submit", payload.survey_id);
        self.send(Method::POST, &path, &payload).await
    }

    async fn create_survey_estimation_lines(
        &self,
        payload: EstimationLinesPayload,
    ) -> PortalResult<()> {
        let path = format!("/api/surveys/{}/estimation-lines", payload.survey_id);
        self.send(Method::POST, &path, &payload).await
    }

    async fn update_survey_estimation_lines(
        &self,
        payload: EstimationLinesPayload,
    ) -> PortalResult<()> {
        let path = format!("/api/surveys/{}/estimation-lines", payload.survey_id);
        self.send(Method::PUT, &path, &payload).await
    }

    async fn update_survey_documents(&self, payload: DocumentsPayload) -> PortalResult<()> {
        let path = format!("/api/surveys/{}/documents", payload.survey_id);
        self.send(Method::POST, &path, &payload).await
    }
}
