//! 分析服務的請求與回應格式，欄位跟著服務端 schema 走。

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 服務支援的分析類型，線上格式為 snake_case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    HateSpeech,
    Misinformation,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::HateSpeech => "hate_speech",
            ContentType::Misinformation => "misinformation",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub store_result: bool,
}

impl AnalyzeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            user_id: None,
            platform: None,
            store_result: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAnalyzeRequest {
    pub texts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub store_results: bool,
}

impl BatchAnalyzeRequest {
    pub fn new(texts: Vec<String>) -> Self {
        Self {
            texts,
            user_id: None,
            platform: None,
            store_results: true,
        }
    }
}

/// 單筆分析結果，timestamp 是服務端的 naive datetime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub text: String,
    pub is_hate_speech: bool,
    pub confidence: f64,
    pub category: String,
    pub severity: String,
    pub detected_keywords: Vec<String>,
    pub explanation: String,
    pub timestamp: NaiveDateTime,
    pub processing_time_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAnalyzeResponse {
    pub total_analyzed: u64,
    pub hate_speech_detected: u64,
    pub processing_time_ms: f64,
    pub results: Vec<AnalyzeResponse>,
    pub summary: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentAnalyzeRequest {
    pub text: String,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl ContentAnalyzeRequest {
    pub fn new(text: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            text: text.into(),
            content_type,
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentAnalyzeResponse {
    pub content_type: ContentType,
    pub prediction: String,
    pub probability: f64,
    pub confidence_level: String,
    pub analysis_details: Option<HashMap<String, serde_json::Value>>,
}

/// hate-speech 和 misinformation 兩個路由共用這個請求形狀
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainAnalyzeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl DomainAnalyzeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainAnalyzeResponse {
    pub prediction: String,
    pub probability: f64,
    pub confidence_level: String,
    pub details: Option<HashMap<String, serde_json::Value>>,
}

/// 健康檢查回應，status 以外的欄位各版本不一樣，全部收進 extra
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_requests: u64,
    pub hate_speech_detected: u64,
    pub clean_content: u64,
    pub avg_processing_time_ms: f64,
    pub keyword_triggered_percentage: f64,
    pub ai_only_detections: u64,
    pub uptime: String,
    pub models_loaded: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordsResponse {
    pub total_keywords: u64,
    pub categories: u64,
    pub keyword_categories: HashMap<String, serde_json::Value>,
    pub languages_supported: Vec<String>,
    pub last_updated: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentDetectionsResponse {
    pub total_found: u64,
    pub returned: u64,
    pub time_period_hours: u32,
    pub detections: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&ContentType::HateSpeech).unwrap(),
            "\"hate_speech\""
        );
        let parsed: ContentType = serde_json::from_str("\"misinformation\"").unwrap();
        assert_eq!(parsed, ContentType::Misinformation);
    }

    #[test]
    fn test_analyze_request_omits_empty_options() {
        let request = AnalyzeRequest::new("hello");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["text"], "hello");
        assert_eq!(json["store_result"], true);
        assert!(json.get("user_id").is_none());
        assert!(json.get("platform").is_none());
    }

    #[test]
    fn test_analyze_response_parses_service_timestamp() {
        let json = r#"{
            "text": "hello",
            "is_hate_speech": false,
            "confidence": 0.93,
            "category": "none",
            "severity": "none",
            "detected_keywords": [],
            "explanation": "No hate speech detected",
            "timestamp": "2025-01-15T10:30:00.123456",
            "processing_time_ms": 42.5
        }"#;

        let response: AnalyzeResponse = serde_json::from_str(json).unwrap();
        assert!(!response.is_hate_speech);
        assert_eq!(response.timestamp.format("%Y-%m-%d").to_string(), "2025-01-15");
    }

    #[test]
    fn test_health_response_collects_extra_fields() {
        let json = r#"{"status": "healthy", "components": {"detector": "ok"}, "uptime": "1h"}"#;

        let response: HealthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "healthy");
        assert_eq!(response.extra.len(), 2);
    }
}
