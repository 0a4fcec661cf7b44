use analyzer_deploy::client::types::{
    AnalyzeRequest, BatchAnalyzeRequest, ContentAnalyzeRequest, ContentType, DomainAnalyzeRequest,
};
use analyzer_deploy::AnalyzerClient;

/// 手動打一輪分析服務的所有端點，只印出回應，不做任何斷言。
/// 失敗的端點印 ❌ 然後繼續打下一個。
#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::fmt::init();

    let base_url = std::env::var("ANALYZER_API_URL")
        .unwrap_or_else(|_| "http://localhost:8000".to_string());

    println!("🚀 分析服務 API 冒煙測試");
    println!("🌐 Base URL: {}", base_url);

    let client = AnalyzerClient::new(&base_url);

    println!("\n🔍 GET /health");
    match client.health().await {
        Ok(response) => print_json(&response),
        Err(e) => println!("❌ {}", e),
    }

    println!("\n📝 POST /analyze");
    let request = AnalyzeRequest::new("This is a friendly test message");
    match client.analyze(&request).await {
        Ok(response) => print_json(&response),
        Err(e) => println!("❌ {}", e),
    }

    println!("\n📚 POST /analyze/batch");
    let request = BatchAnalyzeRequest::new(vec![
        "First test message".to_string(),
        "Second test message".to_string(),
        "Third test message".to_string(),
    ]);
    match client.analyze_batch(&request).await {
        Ok(response) => print_json(&response),
        Err(e) => println!("❌ {}", e),
    }

    println!("\n🔎 POST /content/analyze (hate_speech)");
    let request = ContentAnalyzeRequest::new("Content analysis test text", ContentType::HateSpeech);
    match client.analyze_content(&request).await {
        Ok(response) => print_json(&response),
        Err(e) => println!("❌ {}", e),
    }

    println!("\n🗣️ POST /hate-speech/analyze");
    let request = DomainAnalyzeRequest::new("Domain specific hate speech test text");
    match client.analyze_hate_speech(&request).await {
        Ok(response) => print_json(&response),
        Err(e) => println!("❌ {}", e),
    }

    println!("\n📰 POST /misinformation/analyze");
    let request = DomainAnalyzeRequest::new("Domain specific misinformation test text");
    match client.analyze_misinformation(&request).await {
        Ok(response) => print_json(&response),
        Err(e) => println!("❌ {}", e),
    }

    println!("\n📊 GET /stats");
    match client.stats().await {
        Ok(response) => print_json(&response),
        Err(e) => println!("❌ {}", e),
    }

    println!("\n🔑 GET /keywords");
    match client.keywords().await {
        Ok(response) => print_json(&response),
        Err(e) => println!("❌ {}", e),
    }

    println!("\n🎉 冒煙測試完成！上面的回應請人工檢查。");
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("❌ 無法序列化回應: {}", e),
    }
}
