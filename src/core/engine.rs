use std::sync::Arc;

use crate::app::azure::AzCli;
use crate::app::docker::DockerCli;
use crate::config::deploy_config::DeployConfig;
use crate::core::plan;
use crate::core::runner::ProcessRunner;
use crate::domain::model::StepResult;
use crate::domain::ports::CommandRunner;
use crate::utils::error::Result;

/// 部署引擎，把配置變成步驟序列並執行
pub struct DeployEngine {
    config: DeployConfig,
    az: AzCli,
    docker: DockerCli,
}

impl DeployEngine {
    pub fn new(config: DeployConfig) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner))
    }

    /// 測試時注入假的命令執行器
    pub fn with_runner(config: DeployConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            az: AzCli::new(runner.clone()),
            docker: DockerCli::new(runner),
            config,
        }
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    fn execution_id(prefix: &str) -> String {
        format!("{}_{}", prefix, chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    }

    pub async fn provision(&self, dry_run: bool) -> Result<Vec<StepResult>> {
        let mut sequence = plan::provision_plan(
            &self.config,
            &self.az,
            &self.docker,
            Self::execution_id("provision"),
        )?
        .with_dry_run(dry_run);

        tracing::info!(
            "🚀 Provisioning '{}' ({}, {} steps)",
            self.config.project.name,
            self.config.project.target,
            sequence.len()
        );
        sequence.execute_all().await
    }

    pub async fn deploy(&self) -> Result<Vec<StepResult>> {
        let mut sequence = plan::deploy_plan(
            &self.config,
            &self.az,
            &self.docker,
            Self::execution_id("deploy"),
        )?;

        tracing::info!(
            "🚀 Deploying '{}' ({}, {} steps)",
            self.config.project.name,
            self.config.project.target,
            sequence.len()
        );
        sequence.execute_all().await
    }

    pub async fn teardown(&self) -> Result<Vec<StepResult>> {
        let mut sequence =
            plan::teardown_plan(&self.config, &self.az, Self::execution_id("teardown"))?;

        tracing::info!("🧹 Tearing down '{}'", self.config.azure.resource_group);
        sequence.execute_all().await
    }
}
