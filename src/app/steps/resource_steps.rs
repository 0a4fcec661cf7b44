use std::time::Duration;

use crate::app::azure::AzCli;
use crate::core::step_sequence::{ProvisionStep, StepContext};
use crate::domain::model::{StepResult, StepStatus};
use crate::utils::error::Result;

/// 建立 resource group，其他資源都掛在底下
pub struct ResourceGroupStep {
    az: AzCli,
    name: String,
    location: String,
}

impl ResourceGroupStep {
    pub fn new(az: AzCli, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            az,
            name: name.into(),
            location: location.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for ResourceGroupStep {
    fn name(&self) -> &str {
        "resource_group"
    }

    async fn check_exists(&self, _context: &StepContext) -> Result<bool> {
        self.az.group_exists(&self.name).await
    }

    async fn execute(&self, _context: &mut StepContext) -> Result<StepResult> {
        self.az.create_group(&self.name, &self.location).await?;
        Ok(
            StepResult::new(self.name(), StepStatus::Created, Duration::ZERO)
                .with_detail(format!("{} ({})", self.name, self.location)),
        )
    }
}

pub struct AppServicePlanStep {
    az: AzCli,
    group: String,
    name: String,
    sku: String,
    linux: bool,
}

impl AppServicePlanStep {
    pub fn new(
        az: AzCli,
        group: impl Into<String>,
        name: impl Into<String>,
        sku: impl Into<String>,
        linux: bool,
    ) -> Self {
        Self {
            az,
            group: group.into(),
            name: name.into(),
            sku: sku.into(),
            linux,
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for AppServicePlanStep {
    fn name(&self) -> &str {
        "app_service_plan"
    }

    async fn check_exists(&self, _context: &StepContext) -> Result<bool> {
        self.az.plan_exists(&self.group, &self.name).await
    }

    async fn execute(&self, _context: &mut StepContext) -> Result<StepResult> {
        self.az
            .create_plan(&self.group, &self.name, &self.sku, self.linux)
            .await?;
        Ok(
            StepResult::new(self.name(), StepStatus::Created, Duration::ZERO)
                .with_detail(format!("{} ({})", self.name, self.sku)),
        )
    }
}

/// Web App 建立，code 部署帶 runtime，容器部署指向 registry 裡的映像
pub enum WebAppKind {
    Code { runtime: String },
    Container { image_name: String, image_tag: String },
}

pub struct WebAppStep {
    az: AzCli,
    group: String,
    plan: String,
    name: String,
    kind: WebAppKind,
}

impl WebAppStep {
    pub fn new(
        az: AzCli,
        group: impl Into<String>,
        plan: impl Into<String>,
        name: impl Into<String>,
        kind: WebAppKind,
    ) -> Self {
        Self {
            az,
            group: group.into(),
            plan: plan.into(),
            name: name.into(),
            kind,
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for WebAppStep {
    fn name(&self) -> &str {
        "webapp"
    }

    async fn check_exists(&self, _context: &StepContext) -> Result<bool> {
        self.az.webapp_exists(&self.group, &self.name).await
    }

    async fn execute(&self, context: &mut StepContext) -> Result<StepResult> {
        match &self.kind {
            WebAppKind::Code { runtime } => {
                self.az
                    .create_webapp_code(&self.group, &self.plan, &self.name, runtime)
                    .await?;
            }
            WebAppKind::Container {
                image_name,
                image_tag,
            } => {
                let server = require_registry_server(self.name(), context)?;
                let image = super::image_ref(&server, image_name, image_tag);
                self.az
                    .create_webapp_container(&self.group, &self.plan, &self.name, &image)
                    .await?;
            }
        }
        Ok(
            StepResult::new(self.name(), StepStatus::Created, Duration::ZERO)
                .with_detail(self.name.clone()),
        )
    }
}

/// 把 Web App 指向私有 registry，憑證從上下文拿
pub struct ContainerConfigStep {
    az: AzCli,
    group: String,
    webapp: String,
    image_name: String,
    image_tag: String,
}

impl ContainerConfigStep {
    pub fn new(
        az: AzCli,
        group: impl Into<String>,
        webapp: impl Into<String>,
        image_name: impl Into<String>,
        image_tag: impl Into<String>,
    ) -> Self {
        Self {
            az,
            group: group.into(),
            webapp: webapp.into(),
            image_name: image_name.into(),
            image_tag: image_tag.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for ContainerConfigStep {
    fn name(&self) -> &str {
        "container_config"
    }

    async fn execute(&self, context: &mut StepContext) -> Result<StepResult> {
        let server = require_registry_server(self.name(), context)?;
        let credentials = require_credentials(self.name(), context)?;
        let image = super::image_ref(&server, &self.image_name, &self.image_tag);

        self.az
            .configure_container(&self.group, &self.webapp, &image, &server, &credentials)
            .await?;
        Ok(StepResult::new(self.name(), StepStatus::Done, Duration::ZERO).with_detail(image))
    }
}

pub struct AppSettingsStep {
    az: AzCli,
    group: String,
    webapp: String,
    settings: Vec<(String, String)>,
}

impl AppSettingsStep {
    pub fn new(
        az: AzCli,
        group: impl Into<String>,
        webapp: impl Into<String>,
        settings: Vec<(String, String)>,
    ) -> Self {
        Self {
            az,
            group: group.into(),
            webapp: webapp.into(),
            settings,
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for AppSettingsStep {
    fn name(&self) -> &str {
        "app_settings"
    }

    async fn execute(&self, _context: &mut StepContext) -> Result<StepResult> {
        self.az
            .configure_appsettings(&self.group, &self.webapp, &self.settings)
            .await?;
        Ok(
            StepResult::new(self.name(), StepStatus::Done, Duration::ZERO)
                .with_detail(format!("{} settings", self.settings.len())),
        )
    }
}

pub struct StartupFileStep {
    az: AzCli,
    group: String,
    webapp: String,
    command: String,
}

impl StartupFileStep {
    pub fn new(
        az: AzCli,
        group: impl Into<String>,
        webapp: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            az,
            group: group.into(),
            webapp: webapp.into(),
            command: command.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for StartupFileStep {
    fn name(&self) -> &str {
        "startup_command"
    }

    async fn execute(&self, _context: &mut StepContext) -> Result<StepResult> {
        self.az
            .set_startup_file(&self.group, &self.webapp, &self.command)
            .await?;
        Ok(
            StepResult::new(self.name(), StepStatus::Done, Duration::ZERO)
                .with_detail(self.command.clone()),
        )
    }
}

/// 拆除整個 resource group，群組不存在時跳過
pub struct DeleteGroupStep {
    az: AzCli,
    name: String,
}

impl DeleteGroupStep {
    pub fn new(az: AzCli, name: impl Into<String>) -> Self {
        Self {
            az,
            name: name.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvisionStep for DeleteGroupStep {
    fn name(&self) -> &str {
        "delete_resource_group"
    }

    async fn execute(&self, _context: &mut StepContext) -> Result<StepResult> {
        if !self.az.group_exists(&self.name).await? {
            return Ok(
                StepResult::new(self.name(), StepStatus::Skipped, Duration::ZERO)
                    .with_detail(format!("resource group {} not found", self.name)),
            );
        }
        self.az.delete_group(&self.name).await?;
        Ok(
            StepResult::new(self.name(), StepStatus::Done, Duration::ZERO)
                .with_detail(self.name.clone()),
        )
    }
}

/// 上下文裡找不到 registry 資訊表示步驟順序被排錯
pub(super) fn require_registry_server(step: &str, context: &StepContext) -> Result<String> {
    context
        .get_value(super::REGISTRY_SERVER_KEY)
        .map(str::to_string)
        .ok_or_else(|| crate::utils::error::DeployError::StepFailedError {
            step: step.to_string(),
            details: "registry login server missing from context (credentials step must run first)"
                .to_string(),
        })
}

pub(super) fn require_credentials(
    step: &str,
    context: &StepContext,
) -> Result<crate::domain::model::RegistryCredentials> {
    context
        .credentials()
        .cloned()
        .ok_or_else(|| crate::utils::error::DeployError::StepFailedError {
            step: step.to_string(),
            details: "registry credentials missing from context (credentials step must run first)"
                .to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::azure::tests::MockRunner;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_resource_group_step_reports_existing() {
        let runner = Arc::new(MockRunner::new());
        runner.push_success("true\n");
        let step = ResourceGroupStep::new(AzCli::new(runner), "analyzer-rg", "eastus");

        let context = StepContext::new("test".to_string());
        assert!(step.check_exists(&context).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_group_step_skips_missing_group() {
        let runner = Arc::new(MockRunner::new());
        runner.push_success("false\n");
        let step = DeleteGroupStep::new(AzCli::new(runner.clone()), "analyzer-rg");

        let mut context = StepContext::new("test".to_string());
        let result = step.execute(&mut context).await.unwrap();

        assert_eq!(result.status, StepStatus::Skipped);
        // 只有 exists 檢查被執行，沒有 delete
        assert_eq!(runner.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_container_config_requires_context_credentials() {
        let runner = Arc::new(MockRunner::new());
        let step = ContainerConfigStep::new(
            AzCli::new(runner),
            "analyzer-rg",
            "analyzer-api",
            "analyzer",
            "latest",
        );

        let mut context = StepContext::new("test".to_string());
        context.set_value(crate::app::steps::REGISTRY_SERVER_KEY, "reg.azurecr.io");

        let error = step.execute(&mut context).await.unwrap_err();
        assert!(error.to_string().contains("credentials"));
    }
}
