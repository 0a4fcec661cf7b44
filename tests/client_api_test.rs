use analyzer_deploy::client::types::{
    AnalyzeRequest, BatchAnalyzeRequest, ContentAnalyzeRequest, ContentType, DomainAnalyzeRequest,
};
use analyzer_deploy::{AnalyzerClient, DeployError};
use anyhow::Result;
use httpmock::prelude::*;

fn analyze_response_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "text": text,
        "is_hate_speech": false,
        "confidence": 0.88,
        "category": "none",
        "severity": "none",
        "detected_keywords": [],
        "explanation": "No hate speech detected",
        "timestamp": "2025-02-10T09:15:30.500000",
        "processing_time_ms": 18.2
    })
}

#[tokio::test]
async fn test_batch_analyze_roundtrip() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/analyze/batch")
            .json_body_partial(r#"{"texts": ["one", "two"], "store_results": true}"#);
        then.status(200).json_body(serde_json::json!({
            "total_analyzed": 2,
            "hate_speech_detected": 1,
            "processing_time_ms": 40.0,
            "results": [analyze_response_body("one"), analyze_response_body("two")],
            "summary": {
                "hate_speech_rate": 0.5,
                "categories_detected": {"insult": 1}
            }
        }));
    });

    let client = AnalyzerClient::new(server.base_url());
    let request = BatchAnalyzeRequest::new(vec!["one".to_string(), "two".to_string()]);
    let response = client.analyze_batch(&request).await?;

    assert_eq!(response.total_analyzed, 2);
    assert_eq!(response.hate_speech_detected, 1);
    assert_eq!(response.results.len(), 2);
    assert!(response.summary.contains_key("hate_speech_rate"));
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_content_analyze_sends_snake_case_type() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/content/analyze")
            .json_body_partial(r#"{"content_type": "hate_speech"}"#);
        then.status(200).json_body(serde_json::json!({
            "content_type": "hate_speech",
            "prediction": "not_hate",
            "probability": 0.12,
            "confidence_level": "high",
            "analysis_details": {"model": "tfidf-logreg"}
        }));
    });

    let client = AnalyzerClient::new(server.base_url());
    let request = ContentAnalyzeRequest::new("some text", ContentType::HateSpeech);
    let response = client.analyze_content(&request).await?;

    assert_eq!(response.content_type, ContentType::HateSpeech);
    assert_eq!(response.prediction, "not_hate");
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_domain_routers_share_response_shape() -> Result<()> {
    let server = MockServer::start();
    let hate_mock = server.mock(|when, then| {
        when.method(POST).path("/hate-speech/analyze");
        then.status(200).json_body(serde_json::json!({
            "prediction": "hate",
            "probability": 0.91,
            "confidence_level": "high",
            "details": {"detected_keywords": ["bad"]}
        }));
    });
    let misinfo_mock = server.mock(|when, then| {
        when.method(POST).path("/misinformation/analyze");
        then.status(200).json_body(serde_json::json!({
            "prediction": "reliable",
            "probability": 0.23,
            "confidence_level": "medium",
            "details": null
        }));
    });

    let client = AnalyzerClient::new(server.base_url());
    let request = DomainAnalyzeRequest::new("shared shape text");

    let hate = client.analyze_hate_speech(&request).await?;
    assert_eq!(hate.prediction, "hate");
    assert!(hate.details.is_some());

    let misinfo = client.analyze_misinformation(&request).await?;
    assert_eq!(misinfo.prediction, "reliable");
    assert!(misinfo.details.is_none());

    hate_mock.assert();
    misinfo_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_predict_uses_legacy_path() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/predict");
        then.status(200).json_body(analyze_response_body("legacy"));
    });

    let client = AnalyzerClient::new(server.base_url());
    #[allow(deprecated)]
    let response = client.predict(&AnalyzeRequest::new("legacy")).await?;

    assert_eq!(response.text, "legacy");
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_stats_and_keywords_decode() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/stats");
        then.status(200).json_body(serde_json::json!({
            "total_requests": 120,
            "hate_speech_detected": 7,
            "clean_content": 113,
            "avg_processing_time_ms": 150.0,
            "keyword_triggered_percentage": 4.2,
            "ai_only_detections": 3,
            "uptime": "6:12:03",
            "models_loaded": {"keyword_detector": "160+ terms"}
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/keywords");
        then.status(200).json_body(serde_json::json!({
            "total_keywords": 160,
            "categories": 4,
            "keyword_categories": {
                "insult": {"count": 40, "severity": "medium"}
            },
            "languages_supported": ["French", "English", "Pidgin", "Mixed"],
            "last_updated": "2024-12-17"
        }));
    });

    let client = AnalyzerClient::new(server.base_url());

    let stats = client.stats().await?;
    assert_eq!(stats.total_requests, 120);
    assert_eq!(stats.clean_content, 113);

    let keywords = client.keywords().await?;
    assert_eq!(keywords.total_keywords, 160);
    assert_eq!(keywords.languages_supported.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_service_error_detail_reaches_caller() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/analyze");
        then.status(500)
            .json_body(serde_json::json!({"detail": "Analysis failed: model not loaded"}));
    });

    let client = AnalyzerClient::new(server.base_url());
    let error = client
        .analyze(&AnalyzeRequest::new("anything"))
        .await
        .unwrap_err();

    match error {
        DeployError::ApiError {
            endpoint,
            status,
            message,
        } => {
            assert_eq!(endpoint, "/analyze");
            assert_eq!(status, Some(500));
            assert!(message.contains("model not loaded"), "message: {}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_is_api_error() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/stats");
        then.status(200).body("not json at all");
    });

    let client = AnalyzerClient::new(server.base_url());
    let error = client.stats().await.unwrap_err();

    match error {
        DeployError::ApiError { status, message, .. } => {
            assert_eq!(status, Some(200));
            assert!(message.contains("invalid response body"), "message: {}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}
