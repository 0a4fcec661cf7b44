use std::time::Duration;

use crate::utils::error::{DeployError, Result};

/// 對 {base_url}/health 發一次 GET，200 才算健康。
///
/// 刻意不重試也不退避，失敗就讓呼叫端決定下一步。
pub async fn check_health(base_url: &str, timeout: Duration) -> Result<()> {
    let url = health_url(base_url);
    tracing::info!("🔍 Checking health at {}", url);

    let client = reqwest::Client::new();
    let response = client
        .get(&url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| DeployError::HealthCheckError {
            url: url.clone(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    tracing::debug!("Health response status: {}", status);

    if status.as_u16() == 200 {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("Health response body: {}", body);
        tracing::info!("✅ Service is healthy");
        Ok(())
    } else {
        Err(DeployError::HealthCheckError {
            url,
            reason: format!("unexpected status {}", status.as_u16()),
        })
    }
}

fn health_url(base_url: &str) -> String {
    format!("{}/health", base_url.trim_end_matches('/'))
}
