use crate::domain::model::{RegistryCredentials, StepResult, StepStatus};
use crate::utils::error::{DeployError, Result};
use crate::utils::monitor::SystemMonitor;
use std::collections::HashMap;
use std::time::Instant;

/// 步驟執行上下文，用於在步驟間傳遞資料
#[derive(Debug, Clone, Default)]
pub struct StepContext {
    pub execution_id: String,
    pub results: Vec<StepResult>,
    shared_values: HashMap<String, String>,
    credentials: Option<RegistryCredentials>,
}

impl StepContext {
    pub fn new(execution_id: String) -> Self {
        Self {
            execution_id,
            results: Vec::new(),
            shared_values: HashMap::new(),
            credentials: None,
        }
    }

    /// 獲取上一個步驟的結果
    pub fn get_previous_result(&self) -> Option<&StepResult> {
        self.results.last()
    }

    /// 獲取指定名稱的步驟結果
    pub fn get_result_by_name(&self, name: &str) -> Option<&StepResult> {
        self.results.iter().find(|r| r.step_name == name)
    }

    /// 添加共享資料，例如步驟查到的主機名稱
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.shared_values.insert(key.into(), value.into());
    }

    /// 獲取共享資料
    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.shared_values.get(key).map(String::as_str)
    }

    /// Registry 帳號由步驟寫入，後續 docker login 會用到
    pub fn set_credentials(&mut self, credentials: RegistryCredentials) {
        self.credentials = Some(credentials);
    }

    pub fn credentials(&self) -> Option<&RegistryCredentials> {
        self.credentials.as_ref()
    }

    /// 添加結果到上下文
    pub fn add_result(&mut self, result: StepResult) {
        self.results.push(result);
    }
}

/// 帶上下文的佈建步驟介面
#[async_trait::async_trait]
pub trait ProvisionStep: Send + Sync {
    /// 用於標識步驟名稱
    fn name(&self) -> &str;

    /// 根據上下文決定是否執行
    fn should_execute(&self, _context: &StepContext) -> bool {
        true
    }

    /// 資源已存在時整個步驟跳過，重跑同一份配置不會報錯
    async fn check_exists(&self, _context: &StepContext) -> Result<bool> {
        Ok(false)
    }

    async fn execute(&self, context: &mut StepContext) -> Result<StepResult>;
}

/// 步驟序列，負責順序執行多個帶上下文的步驟
pub struct StepSequence {
    steps: Vec<Box<dyn ProvisionStep>>, // 使用 trait object 支持多態
    monitor: Option<SystemMonitor>,
    monitor_enabled: bool,
    execution_id: String,
    dry_run: bool,
}

impl StepSequence {
    pub fn new(execution_id: String) -> Self {
        Self {
            steps: Vec::new(),
            monitor: None,
            monitor_enabled: false,
            execution_id,
            dry_run: false,
        }
    }

    /// 啟用或禁用系統監控
    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor_enabled = enabled;
        if enabled {
            self.monitor = Some(SystemMonitor::new(enabled));
        }
        self
    }

    /// 只列出執行計畫，不碰任何雲端資源
    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// 添加步驟
    pub fn add_step(&mut self, step: Box<dyn ProvisionStep>) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 計畫內容，給 dry-run 顯示用
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// 依序執行所有步驟，任何一步失敗就整個序列停止
    pub async fn execute_all(&mut self) -> Result<Vec<StepResult>> {
        let mut results = Vec::new();
        let mut context = StepContext::new(self.execution_id.clone());

        if self.monitor_enabled {
            if let Some(monitor) = &self.monitor {
                monitor.log_stats("Step sequence started.");
            }
        }

        for step in &self.steps {
            let start_time = Instant::now();

            // 根據上下文決定是否執行
            if !step.should_execute(&context) {
                tracing::info!("⏭️ Skipping step: {} (condition not met)", step.name());
                let result =
                    StepResult::new(step.name(), StepStatus::Skipped, start_time.elapsed());
                context.add_result(result.clone());
                results.push(result);
                continue;
            }

            if self.dry_run {
                tracing::info!("🔍 [dry-run] {}", step.name());
                let result =
                    StepResult::new(step.name(), StepStatus::Skipped, start_time.elapsed())
                        .with_detail("dry run");
                context.add_result(result.clone());
                results.push(result);
                continue;
            }

            match step.check_exists(&context).await {
                Ok(true) => {
                    tracing::info!("✅ Step skipped: {} (already exists)", step.name());
                    let result = StepResult::new(
                        step.name(),
                        StepStatus::AlreadyExists,
                        start_time.elapsed(),
                    );
                    context.add_result(result.clone());
                    results.push(result);
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!("❌ Step failed: {} ({})", step.name(), e);
                    return Err(DeployError::StepFailedError {
                        step: step.name().to_string(),
                        details: format!("existence check failed: {}", e),
                    });
                }
            }

            // 執行單個步驟
            match step.execute(&mut context).await {
                Ok(mut result) => {
                    result.duration = start_time.elapsed();

                    tracing::info!(
                        "✅ Step finished: {} ({}, duration: {:?})",
                        result.step_name,
                        result.status,
                        result.duration
                    );

                    // 將結果添加到上下文
                    context.add_result(result.clone());
                    results.push(result);
                }
                Err(e) => {
                    tracing::error!("❌ Step failed: {} ({})", step.name(), e);
                    return Err(match e {
                        DeployError::StepFailedError { .. } => e,
                        other => DeployError::StepFailedError {
                            step: step.name().to_string(),
                            details: other.to_string(),
                        },
                    });
                }
            }
        }

        if self.monitor_enabled {
            if let Some(monitor) = &self.monitor {
                monitor.log_stats("Step sequence completed.");
            }
        }

        Ok(results)
    }

    /// 獲取執行摘要
    pub fn get_execution_summary(results: &[StepResult]) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        let total_steps = results.len();
        let created = results
            .iter()
            .filter(|r| r.status == StepStatus::Created)
            .count();
        let already_exists = results
            .iter()
            .filter(|r| r.status == StepStatus::AlreadyExists)
            .count();
        let skipped = results
            .iter()
            .filter(|r| r.status == StepStatus::Skipped)
            .count();
        let total_duration: std::time::Duration = results.iter().map(|r| r.duration).sum();

        summary.insert(
            "total_steps".to_string(),
            serde_json::Value::Number(total_steps.into()),
        );
        summary.insert(
            "created".to_string(),
            serde_json::Value::Number(created.into()),
        );
        summary.insert(
            "already_exists".to_string(),
            serde_json::Value::Number(already_exists.into()),
        );
        summary.insert(
            "skipped".to_string(),
            serde_json::Value::Number(skipped.into()),
        );
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::Number((total_duration.as_millis() as u64).into()),
        );

        let step_names: Vec<serde_json::Value> = results
            .iter()
            .filter(|r| r.status != StepStatus::Skipped)
            .map(|r| serde_json::Value::String(r.step_name.clone()))
            .collect();
        summary.insert(
            "executed_steps".to_string(),
            serde_json::Value::Array(step_names),
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct MockStep {
        name: String,
        should_execute: bool,
        exists: bool,
        fail: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockStep {
        fn new(name: &str, calls: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name: name.to_string(),
                should_execute: true,
                exists: false,
                fail: false,
                calls,
            }
        }

        fn with_execution_condition(mut self, should_execute: bool) -> Self {
            self.should_execute = should_execute;
            self
        }

        fn with_exists(mut self, exists: bool) -> Self {
            self.exists = exists;
            self
        }

        fn with_failure(mut self, fail: bool) -> Self {
            self.fail = fail;
            self
        }
    }

    #[async_trait::async_trait]
    impl ProvisionStep for MockStep {
        fn name(&self) -> &str {
            &self.name
        }

        fn should_execute(&self, _context: &StepContext) -> bool {
            self.should_execute
        }

        async fn check_exists(&self, _context: &StepContext) -> Result<bool> {
            Ok(self.exists)
        }

        async fn execute(&self, context: &mut StepContext) -> Result<StepResult> {
            self.calls.lock().unwrap().push(self.name.clone());

            if self.fail {
                return Err(DeployError::CommandFailedError {
                    command: "az group create".to_string(),
                    status: 1,
                    stderr: "boom".to_string(),
                });
            }

            context.set_value(format!("{}_ran", self.name), "yes");
            Ok(StepResult::new(
                &self.name,
                StepStatus::Created,
                Duration::ZERO,
            ))
        }
    }

    #[test]
    fn test_step_context_values() {
        let mut context = StepContext::new("test".to_string());

        context.set_value("registry_server", "myreg.azurecr.io");
        assert_eq!(context.get_value("registry_server"), Some("myreg.azurecr.io"));
        assert!(context.get_value("nonexistent").is_none());

        assert!(context.credentials().is_none());
        context.set_credentials(RegistryCredentials {
            username: "admin".to_string(),
            password: "s3cr3t".to_string(),
        });
        assert_eq!(context.credentials().unwrap().username, "admin");
    }

    #[test]
    fn test_step_context_result_lookup() {
        let mut context = StepContext::new("test".to_string());

        context.add_result(StepResult::new(
            "resource_group",
            StepStatus::Created,
            Duration::from_millis(100),
        ));
        context.add_result(StepResult::new(
            "app_service_plan",
            StepStatus::AlreadyExists,
            Duration::from_millis(50),
        ));

        let retrieved = context.get_result_by_name("resource_group");
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().status, StepStatus::Created);

        let last = context.get_previous_result();
        assert!(last.is_some());
        assert_eq!(last.unwrap().step_name, "app_service_plan");

        assert!(context.get_result_by_name("nonexistent").is_none());
    }

    #[tokio::test]
    async fn test_step_sequence_execution_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut sequence = StepSequence::new("test_sequence".to_string());

        sequence.add_step(Box::new(MockStep::new("step1", calls.clone())));
        sequence.add_step(Box::new(MockStep::new("step2", calls.clone())));

        let results = sequence.execute_all().await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].step_name, "step1");
        assert_eq!(results[1].step_name, "step2");
        assert_eq!(results[0].status, StepStatus::Created);
        assert_eq!(*calls.lock().unwrap(), vec!["step1", "step2"]);
    }

    #[tokio::test]
    async fn test_step_sequence_conditional_execution() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut sequence = StepSequence::new("conditional_test".to_string());

        sequence.add_step(Box::new(MockStep::new("step1", calls.clone())));
        sequence.add_step(Box::new(
            MockStep::new("step2", calls.clone()).with_execution_condition(false),
        ));
        sequence.add_step(Box::new(MockStep::new("step3", calls.clone())));

        let results = sequence.execute_all().await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[1].status, StepStatus::Skipped);
        // step2 不應該被執行
        assert_eq!(*calls.lock().unwrap(), vec!["step1", "step3"]);
    }

    #[tokio::test]
    async fn test_step_sequence_skips_existing_resources() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut sequence = StepSequence::new("exists_test".to_string());

        sequence.add_step(Box::new(
            MockStep::new("resource_group", calls.clone()).with_exists(true),
        ));
        sequence.add_step(Box::new(MockStep::new("webapp", calls.clone())));

        let results = sequence.execute_all().await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, StepStatus::AlreadyExists);
        assert_eq!(results[1].status, StepStatus::Created);
        assert_eq!(*calls.lock().unwrap(), vec!["webapp"]);
    }

    #[tokio::test]
    async fn test_step_sequence_stops_on_failure() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut sequence = StepSequence::new("failure_test".to_string());

        sequence.add_step(Box::new(MockStep::new("step1", calls.clone())));
        sequence.add_step(Box::new(
            MockStep::new("step2", calls.clone()).with_failure(true),
        ));
        sequence.add_step(Box::new(MockStep::new("step3", calls.clone())));

        let error = sequence.execute_all().await.unwrap_err();

        match error {
            DeployError::StepFailedError { step, .. } => assert_eq!(step, "step2"),
            other => panic!("unexpected error: {:?}", other),
        }
        // step3 不應該被執行
        assert_eq!(*calls.lock().unwrap(), vec!["step1", "step2"]);
    }

    #[tokio::test]
    async fn test_step_sequence_dry_run() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut sequence = StepSequence::new("dry_run_test".to_string()).with_dry_run(true);

        sequence.add_step(Box::new(MockStep::new("step1", calls.clone())));
        sequence.add_step(Box::new(MockStep::new("step2", calls.clone())));

        let results = sequence.execute_all().await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.status == StepStatus::Skipped));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_execution_summary() {
        let results = vec![
            StepResult::new("step1", StepStatus::Created, Duration::from_millis(100)),
            StepResult::new(
                "step2",
                StepStatus::AlreadyExists,
                Duration::from_millis(200),
            ),
            StepResult::new("step3", StepStatus::Skipped, Duration::ZERO),
        ];

        let summary = StepSequence::get_execution_summary(&results);

        assert_eq!(
            summary.get("total_steps").unwrap(),
            &serde_json::Value::Number(3.into())
        );
        assert_eq!(
            summary.get("created").unwrap(),
            &serde_json::Value::Number(1.into())
        );
        assert_eq!(
            summary.get("already_exists").unwrap(),
            &serde_json::Value::Number(1.into())
        );
        assert_eq!(
            summary.get("skipped").unwrap(),
            &serde_json::Value::Number(1.into())
        );
        assert_eq!(
            summary.get("total_duration_ms").unwrap(),
            &serde_json::Value::Number(300.into())
        );

        let executed = summary.get("executed_steps").unwrap().as_array().unwrap();
        assert_eq!(executed.len(), 2);
        assert_eq!(executed[0], serde_json::Value::String("step1".to_string()));
    }
}
