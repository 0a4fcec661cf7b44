//! 分析服務的型別化 HTTP 客戶端。
//!
//! 所有方法失敗都回傳 `DeployError::ApiError`，呼叫端只需要處理一種錯誤。
//! 不重試，失敗立刻回報。

pub mod types;

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::utils::error::{DeployError, Result};
use types::{
    AnalyzeRequest, AnalyzeResponse, BatchAnalyzeRequest, BatchAnalyzeResponse,
    ContentAnalyzeRequest, ContentAnalyzeResponse, DomainAnalyzeRequest, DomainAnalyzeResponse,
    HealthResponse, KeywordsResponse, RecentDetectionsResponse, StatsResponse,
};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AnalyzerClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl AnalyzerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get_json("/health").await
    }

    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        self.post_json("/analyze", request).await
    }

    pub async fn analyze_batch(
        &self,
        request: &BatchAnalyzeRequest,
    ) -> Result<BatchAnalyzeResponse> {
        self.post_json("/analyze/batch", request).await
    }

    pub async fn analyze_content(
        &self,
        request: &ContentAnalyzeRequest,
    ) -> Result<ContentAnalyzeResponse> {
        self.post_json("/content/analyze", request).await
    }

    pub async fn analyze_hate_speech(
        &self,
        request: &DomainAnalyzeRequest,
    ) -> Result<DomainAnalyzeResponse> {
        self.post_json("/hate-speech/analyze", request).await
    }

    pub async fn analyze_misinformation(
        &self,
        request: &DomainAnalyzeRequest,
    ) -> Result<DomainAnalyzeResponse> {
        self.post_json("/misinformation/analyze", request).await
    }

    /// 舊版路徑，服務端保留給既有呼叫者
    #[deprecated(note = "use analyze() instead; /predict is a legacy alias of /analyze")]
    pub async fn predict(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        self.post_json("/predict", request).await
    }

    pub async fn stats(&self) -> Result<StatsResponse> {
        self.get_json("/stats").await
    }

    pub async fn keywords(&self) -> Result<KeywordsResponse> {
        self.get_json("/keywords").await
    }

    pub async fn recent(&self, hours: u32, limit: u32) -> Result<RecentDetectionsResponse> {
        let endpoint = "/recent";
        let request = self
            .client
            .get(self.url(endpoint))
            .timeout(self.timeout)
            .query(&[("hours", hours), ("limit", limit)]);
        self.execute(endpoint, request).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let request = self.client.get(self.url(endpoint)).timeout(self.timeout);
        self.execute(endpoint, request).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let request = self
            .client
            .post(self.url(endpoint))
            .timeout(self.timeout)
            .json(body);
        self.execute(endpoint, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request.send().await.map_err(|e| DeployError::ApiError {
            endpoint: endpoint.to_string(),
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        })?;

        let status = response.status();
        tracing::debug!("API response status for {}: {}", endpoint, status);

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = detail.trim();
            return Err(DeployError::ApiError {
                endpoint: endpoint.to_string(),
                status: Some(status.as_u16()),
                message: if detail.is_empty() {
                    format!("unexpected status {}", status.as_u16())
                } else {
                    detail.to_string()
                },
            });
        }

        response.json::<T>().await.map_err(|e| DeployError::ApiError {
            endpoint: endpoint.to_string(),
            status: Some(status.as_u16()),
            message: format!("invalid response body: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = AnalyzerClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_analyze_decodes_response() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/analyze")
                .json_body_partial(r#"{"text": "test message", "store_result": true}"#);
            then.status(200).json_body(serde_json::json!({
                "text": "test message",
                "is_hate_speech": false,
                "confidence": 0.91,
                "category": "none",
                "severity": "none",
                "detected_keywords": [],
                "explanation": "No hate speech detected",
                "timestamp": "2025-01-15T10:30:00.123456",
                "processing_time_ms": 12.5
            }));
        });

        let client = AnalyzerClient::new(server.base_url());
        let response = client
            .analyze(&AnalyzeRequest::new("test message"))
            .await
            .unwrap();

        assert!(!response.is_hate_speech);
        assert_eq!(response.confidence, 0.91);
        mock.assert();
    }

    #[tokio::test]
    async fn test_error_status_maps_to_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/stats");
            then.status(500)
                .json_body(serde_json::json!({"detail": "stats backend down"}));
        });

        let client = AnalyzerClient::new(server.base_url());
        let error = client.stats().await.unwrap_err();
        match error {
            DeployError::ApiError {
                endpoint,
                status,
                message,
            } => {
                assert_eq!(endpoint, "/stats");
                assert_eq!(status, Some(500));
                assert!(message.contains("stats backend down"), "message: {}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_error_has_no_status() {
        let client =
            AnalyzerClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2));
        let error = client.health().await.unwrap_err();
        match error {
            DeployError::ApiError { status, .. } => assert_eq!(status, None),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recent_sends_query_parameters() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/recent")
                .query_param("hours", "12")
                .query_param("limit", "5");
            then.status(200).json_body(serde_json::json!({
                "total_found": 2,
                "returned": 2,
                "time_period_hours": 12,
                "detections": [{}, {}]
            }));
        });

        let client = AnalyzerClient::new(server.base_url());
        let response = client.recent(12, 5).await.unwrap();
        assert_eq!(response.returned, 2);
        mock.assert();
    }
}
