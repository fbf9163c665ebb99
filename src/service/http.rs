//! HTTP client for a remote prediction endpoint

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use crate::state::{ModelSummary, PredictionOutcome};

use super::error::ServiceError;
use super::traits::PredictionService;
use super::types::{ModelInfoResponse, PredictionRequest, PredictionResponse};

/// Default prediction endpoint address
const DEFAULT_ADDRESS: &str = "http://127.0.0.1:5000";

/// Bound on any single request so a stalled endpoint cannot keep the
/// form disabled indefinitely
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a prediction service reachable over HTTP/JSON
pub struct HttpPredictionClient {
    client: Client,
    base_url: String,
}

impl HttpPredictionClient {
    /// Create a new client against the given base address
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("credit-tui/0.1")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint address: environment override, then configuration, then
    /// the default
    pub fn resolve_address(configured: Option<&str>) -> String {
        std::env::var("CREDIT_TUI_ENDPOINT")
            .ok()
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string())
    }

    #[allow(dead_code)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn classify(
        &self,
        request: PredictionRequest,
    ) -> Result<PredictionOutcome, ServiceError> {
        let response = self
            .client
            .post(format!("{}/api/predict", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|err| ServiceError::Transport(err.to_string()))?;

        // An upstream classification failure still arrives as a JSON
        // envelope, just with a non-success status. Only bodies that do
        // not parse get classified by status alone.
        let status = response.status();
        let envelope: PredictionResponse = match response.json().await {
            Ok(envelope) => envelope,
            Err(err) if status.is_success() => {
                return Err(ServiceError::MalformedResponse(err.to_string()))
            }
            Err(_) => return Err(ServiceError::Transport(format!("server returned {status}"))),
        };

        envelope.into_outcome()
    }

    async fn describe_model(&self) -> Result<ModelSummary, ServiceError> {
        let response = self
            .client
            .get(format!("{}/api/model-info", self.base_url))
            .send()
            .await
            .map_err(|err| ServiceError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Transport(format!(
                "server returned {status}"
            )));
        }

        let info: ModelInfoResponse = response
            .json()
            .await
            .map_err(|err| ServiceError::MalformedResponse(err.to_string()))?;
        Ok(info.into())
    }
}
