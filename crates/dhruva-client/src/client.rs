//! HTTP client for the remote ML backend.
use crate::error::ClientError;
use crate::wire::{
    AnalyzeRequest, AnalyzeResponse, ClassificationResult, ErrorBody, HealthResponse,
    LapsePredictionResult, SentimentResult, TextRequest,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Timeout for `/analyze` and the single-model endpoints.
pub const ANALYZE_TIMEOUT: Duration = Duration::from_secs(15);

const ML_PREFIX: &str = "/api/v1/ml";

/// Thin wrapper over a shared `reqwest::Client`. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    request_timeout: Duration,
}

impl ApiClient {
    pub fn new() -> Result<Self, ClientError> {
        Self::with_timeout(ANALYZE_TIMEOUT)
    }

    pub fn with_timeout(request_timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("dhruva/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self {
            http,
            request_timeout,
        })
    }

    /// `GET {base}/api/v1/ml/health` with the given timeout.
    pub async fn health(
        &self,
        base_url: &str,
        timeout: Duration,
    ) -> Result<HealthResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}{}/health", base_url, ML_PREFIX))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, base_url))?;
        read_json(response, base_url).await
    }

    /// Full analysis in one call.
    pub async fn analyze(
        &self,
        base_url: &str,
        request: &AnalyzeRequest,
    ) -> Result<AnalyzeResponse, ClientError> {
        let response: AnalyzeResponse = self.post(base_url, "analyze", request).await?;
        response.validate().map_err(ClientError::ResponseParsing)?;
        Ok(response)
    }

    pub async fn classify(
        &self,
        base_url: &str,
        text: &str,
    ) -> Result<ClassificationResult, ClientError> {
        let body = TextRequest {
            text,
            department: None,
        };
        self.post(base_url, "classify", &body).await
    }

    pub async fn sentiment(
        &self,
        base_url: &str,
        text: &str,
    ) -> Result<SentimentResult, ClientError> {
        let body = TextRequest {
            text,
            department: None,
        };
        self.post(base_url, "sentiment", &body).await
    }

    pub async fn predict_lapse(
        &self,
        base_url: &str,
        text: &str,
        department: Option<&str>,
    ) -> Result<LapsePredictionResult, ClientError> {
        let body = TextRequest { text, department };
        self.post(base_url, "predict-lapse", &body).await
    }

    async fn post<B, T>(&self, base_url: &str, endpoint: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}/{}", base_url, ML_PREFIX, endpoint);
        tracing::debug!(url = %url, "posting to backend");

        let response = self
            .http
            .post(&url)
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, base_url))?;
        read_json(response, base_url).await
    }
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    base_url: &str,
) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail)
            .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
        return Err(ClientError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ClientError::from_reqwest(e, base_url))?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::ResponseParsing(e.to_string()))
}
